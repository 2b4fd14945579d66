//! Process-wide application context: owns the cache, store, settings,
//! metrics and tool client, with explicit init and teardown.

use std::sync::{Mutex, PoisonError};

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use adjutant_agents::llm::LlmConfig;
use adjutant_agents::router::SpecialistRouter;
use adjutant_agents::specialist::AgentContext;
use adjutant_core::{ExtractorConfig, MetricsCollector, ResponseCache, TaskStore, UserSettings};
use adjutant_tools::client::ToolClient;
use adjutant_tools::docs::DocsClient;
use adjutant_tools::registry::ToolRegistry;
use adjutant_tools::transport::{DirectTransport, StdioTransport, ToolTransport};

use crate::config::Config;

pub struct AppContext {
    pub cache: ResponseCache,
    pub store: Mutex<TaskStore>,
    pub settings: Mutex<UserSettings>,
    pub metrics: MetricsCollector,
    pub client: ToolClient<ToolTransport>,
    pub router: SpecialistRouter,
    pub extractor: ExtractorConfig,
    pub llm: LlmConfig,
    pub default_tz: Tz,
}

impl AppContext {
    /// Build every component from configuration. No ambient globals: the
    /// pieces live here and are handed to specialists by reference.
    pub fn init(config: &Config, started: DateTime<Utc>) -> Result<Self> {
        let default_tz: Tz = config
            .default_timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid default_timezone: {}", config.default_timezone))?;

        let transport = match config.tools.transport.as_str() {
            "direct" => {
                let docs = DocsClient::new(config.docs.clone())?;
                ToolTransport::Direct(DirectTransport::new(ToolRegistry::new(docs)))
            }
            "stdio" => ToolTransport::Stdio(StdioTransport::new(config.tools.server_cmd.clone())),
            other => bail!("unknown tools.transport '{other}' (expected 'direct' or 'stdio')"),
        };

        let client = ToolClient::new(transport, config.retry.policy())
            .with_dry_run(config.tools.dry_run);

        Ok(Self {
            cache: ResponseCache::builtin(),
            store: Mutex::new(TaskStore::new()),
            settings: Mutex::new(UserSettings::new()),
            metrics: MetricsCollector::new(started),
            client,
            router: SpecialistRouter::new(),
            extractor: config.extractor.clone(),
            llm: config.llm.clone(),
            default_tz,
        })
    }

    /// Per-request view for the specialists, with the request time injected.
    pub fn agent_ctx(&self, user_id: u64, now: DateTime<Utc>) -> AgentContext<'_, ToolTransport> {
        let tz = self
            .settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .timezone_or(user_id, self.default_tz);

        AgentContext {
            user_id,
            now,
            tz,
            client: &self.client,
            cache: &self.cache,
            store: &self.store,
            settings: &self.settings,
            metrics: &self.metrics,
            extractor: &self.extractor,
            llm: &self.llm,
        }
    }

    /// Explicit teardown: stops the tool server child if one is running.
    pub async fn shutdown(&self) {
        self.client.transport().shutdown().await;
    }
}
