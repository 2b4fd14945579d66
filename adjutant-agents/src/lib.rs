//! adjutant-agents: specialists and the router that dispatches inbound
//! intents onto them.

pub mod analytics;
pub mod command;
pub mod llm;
pub mod personal;
pub mod router;
pub mod specialist;
pub mod tasks;

pub use analytics::AnalyticsSpecialist;
pub use command::CommandSpecialist;
pub use llm::LlmConfig;
pub use personal::PersonalSpecialist;
pub use router::{SpecialistRouter, user_message};
pub use specialist::{AgentContext, invoke_allowed};
pub use tasks::TaskSpecialist;
