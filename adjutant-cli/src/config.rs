use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use adjutant_agents::llm::LlmConfig;
use adjutant_core::extract::ExtractorConfig;
use adjutant_tools::client::RetryPolicy;
use adjutant_tools::docs::DocsConfig;

use crate::state::ensure_adjutant_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub default_timezone: String,
    pub tools: ToolsSection,
    pub retry: RetrySection,
    pub llm: LlmConfig,
    pub docs: DocsConfig,
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsSection {
    /// "direct" runs the tool registry in-process; "stdio" spawns server_cmd
    /// and speaks the line protocol over its pipes.
    pub transport: String,
    pub server_cmd: String,
    /// When true, outbound tool calls are replaced by a description of the
    /// call that would have been made.
    pub dry_run: bool,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            transport: "direct".to_string(),
            server_cmd: "adjutant serve".to_string(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub jitter: bool,
    pub call_timeout_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            jitter: true,
            call_timeout_secs: 30,
        }
    }
}

impl RetrySection {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            jitter: self.jitter,
            call_timeout: Duration::from_secs(self.call_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_timezone: "America/Chicago".to_string(),
            tools: ToolsSection::default(),
            retry: RetrySection::default(),
            llm: LlmConfig::default(),
            docs: DocsConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_adjutant_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
