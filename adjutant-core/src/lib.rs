//! adjutant-core: task model, field extraction, response cache and routing
//! for the assistant bot.

pub mod cache;
pub mod extract;
pub mod intent;
pub mod metrics;
pub mod settings;
pub mod store;
pub mod task;
pub mod timeparse;

pub use cache::ResponseCache;
pub use extract::{ExtractorConfig, TaskFields, extract_fields};
pub use intent::{Classified, HandlerKind, Intent, classify};
pub use metrics::{CommandStats, MetricsCollector, SystemStats, UserStats};
pub use settings::UserSettings;
pub use store::{TaskStore, TaskSummary};
pub use task::{Priority, Task, TaskStatus};
pub use timeparse::{clock_time, contains_clock_time, detect_due, duration_minutes};
