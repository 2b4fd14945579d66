use std::sync::Mutex;

use chrono::{DateTime, TimeZone as _, Utc};

use adjutant_agents::llm::LlmConfig;
use adjutant_agents::router::SpecialistRouter;
use adjutant_agents::specialist::AgentContext;
use adjutant_core::{
    ExtractorConfig, MetricsCollector, ResponseCache, TaskStore, UserSettings, classify,
};
use adjutant_tools::client::{RetryPolicy, ToolClient};
use adjutant_tools::docs::{DocsClient, DocsConfig};
use adjutant_tools::registry::ToolRegistry;
use adjutant_tools::transport::DirectTransport;

fn fixed_now() -> DateTime<Utc> {
    // 2024-01-01 was a Monday.
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

struct Fixture {
    client: ToolClient<DirectTransport>,
    cache: ResponseCache,
    store: Mutex<TaskStore>,
    settings: Mutex<UserSettings>,
    metrics: MetricsCollector,
    extractor: ExtractorConfig,
    llm: LlmConfig,
}

impl Fixture {
    fn new(dry_run: bool) -> Self {
        let registry = ToolRegistry::new(DocsClient::new(DocsConfig::default()).unwrap());
        let client = ToolClient::new(DirectTransport::new(registry), RetryPolicy::default())
            .with_dry_run(dry_run);
        Self {
            client,
            cache: ResponseCache::builtin(),
            store: Mutex::new(TaskStore::new()),
            settings: Mutex::new(UserSettings::new()),
            metrics: MetricsCollector::new(fixed_now()),
            extractor: ExtractorConfig::default(),
            llm: LlmConfig::default(),
        }
    }

    fn ctx(&self) -> AgentContext<'_, DirectTransport> {
        AgentContext {
            user_id: 1,
            now: fixed_now(),
            tz: chrono_tz::UTC,
            client: &self.client,
            cache: &self.cache,
            store: &self.store,
            settings: &self.settings,
            metrics: &self.metrics,
            extractor: &self.extractor,
            llm: &self.llm,
        }
    }
}

async fn send(router: &SpecialistRouter, fixture: &Fixture, line: &str) -> String {
    match router.dispatch(&classify(line), &fixture.ctx()).await {
        Ok(reply) => reply,
        Err(e) => adjutant_agents::router::user_message(&e),
    }
}

#[tokio::test]
async fn task_create_list_complete_flow() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let created = send(&router, &fixture, "/task Buy groceries tomorrow at 5pm").await;
    assert!(created.contains("Task #1 created: Buy Groceries"));
    assert!(created.contains("2024-01-02 17:00"));
    assert!(created.contains("Priority: medium"));

    let listed = send(&router, &fixture, "/tasks").await;
    assert!(listed.contains("#1 Buy Groceries"));

    let completed = send(&router, &fixture, "/complete 1").await;
    assert!(completed.contains("Task #1 completed"));

    let empty = send(&router, &fixture, "/tasks").await;
    assert!(empty.contains("No pending tasks found."));
}

#[tokio::test]
async fn urgent_task_keeps_tags_out_of_the_title() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let created = send(
        &router,
        &fixture,
        "/task Urgent: Fix server issue #work #critical",
    )
    .await;
    assert!(created.contains("Fix Server Issue"));
    assert!(created.contains("Priority: urgent"));
    assert!(created.contains("critical, work"));
}

#[tokio::test]
async fn help_cache_hit_answers_without_any_tool_call() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let answer = send(&router, &fixture, "/help grep").await;
    assert!(answer.contains("Search lines that match a pattern"));
}

#[tokio::test]
async fn ask_without_a_time_gets_a_clarification_question() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let reply = send(&router, &fixture, "/ask plan dinner with Sam").await;
    assert!(reply.contains("What time should I schedule it?"));
}

#[tokio::test]
async fn ask_in_dry_run_describes_the_event_call() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(true);

    let reply = send(&router, &fixture, "/ask Team sync tomorrow 3pm for 45m").await;
    assert!(reply.starts_with("[dry-run]"));
    assert!(reply.contains("create_event"));
    assert!(reply.contains("Team Sync"));
}

#[tokio::test]
async fn scheduling_creates_an_event_through_the_registry() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let reply = send(&router, &fixture, "/ask Team sync tomorrow 3pm for 45m").await;
    assert!(reply.contains("Event created: event://1/"));
}

#[tokio::test]
async fn empty_agenda_reads_cleanly() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let reply = send(&router, &fixture, "/ask what's on my agenda").await;
    assert_eq!(reply, "No events today.");
}

#[tokio::test]
async fn unknown_command_falls_back_to_help_with_a_clarification() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(true);

    let reply = send(&router, &fixture, "/frobnicate the widget").await;
    assert!(reply.starts_with("I don't recognize that command"));
}

#[tokio::test]
async fn set_timezone_validates_iana_names() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    let ok = send(&router, &fixture, "/set_timezone Asia/Ho_Chi_Minh").await;
    assert!(ok.contains("Timezone set to Asia/Ho_Chi_Minh"));

    let bad = send(&router, &fixture, "/set_timezone Nowhere/Null").await;
    assert!(bad.contains("Invalid timezone"));
}

#[tokio::test]
async fn stats_reflect_the_task_store() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);

    send(&router, &fixture, "/task Clean desk #organization").await;
    let stats = send(&router, &fixture, "/stats").await;
    assert!(stats.contains("Tasks: 1 total (1 pending"));
}

#[tokio::test]
async fn system_stats_report_uptime_and_totals() {
    let router = SpecialistRouter::new();
    let fixture = Fixture::new(false);
    fixture.metrics.record("help", 1, 12, true, fixed_now());

    let report = send(&router, &fixture, "/system").await;
    assert!(report.contains("Commands: 1"));
}
