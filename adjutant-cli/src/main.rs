use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adjutant_agents::router::user_message;
use adjutant_tools::docs::DocsClient;
use adjutant_tools::registry::ToolRegistry;

mod config;
mod context;
mod state;

#[derive(Parser, Debug)]
#[command(name = "adjutant", version, about = "Adjutant assistant bot CLI")]
struct Cli {
    /// Acting user id (platform-agnostic stand-in for the chat identity)
    #[arg(long, default_value_t = 1)]
    user: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task from free text
    Task {
        description: Vec<String>,
    },

    /// List tasks, optionally filtered by status
    Tasks {
        /// pending, in_progress, completed or cancelled (default: pending)
        #[arg(long)]
        status: Option<String>,
    },

    /// Mark a task as completed
    Complete {
        id: u64,
    },

    /// Ask the personal assistant to schedule or plan
    Ask {
        text: Vec<String>,
    },

    /// Set your timezone, e.g. Asia/Ho_Chi_Minh
    SetTimezone {
        tz: String,
    },

    /// Get help with a command or tool
    Help {
        query: Vec<String>,
    },

    /// Your usage statistics
    Stats,

    /// Whole-process statistics
    System,

    /// Route a raw platform message, e.g. "/task buy milk tomorrow"
    Send {
        line: Vec<String>,
    },

    /// Run the tool server on stdio
    Serve,

    /// Config management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;

    match cli.command {
        Command::Serve => {
            let registry = ToolRegistry::new(DocsClient::new(cfg.docs.clone())?);
            adjutant_tools::serve_stdio(registry).await
        }
        Command::Config {
            command: ConfigCommand::Init,
        } => config::init_config(),
        other => {
            let line = command_line(other);
            run_line(&cfg, cli.user, &line).await
        }
    }
}

/// Render a subcommand back into the platform message form so every surface
/// goes through the same classifier.
fn command_line(command: Command) -> String {
    match command {
        Command::Task { description } => format!("/task {}", description.join(" ")),
        Command::Tasks { status } => match status {
            Some(s) => format!("/tasks {s}"),
            None => "/tasks".to_string(),
        },
        Command::Complete { id } => format!("/complete {id}"),
        Command::Ask { text } => format!("/ask {}", text.join(" ")),
        Command::SetTimezone { tz } => format!("/set_timezone {tz}"),
        Command::Help { query } => format!("/help {}", query.join(" ")),
        Command::Stats => "/stats".to_string(),
        Command::System => "/system".to_string(),
        Command::Send { line } => line.join(" "),
        Command::Serve | Command::Config { .. } => String::new(),
    }
}

async fn run_line(cfg: &config::Config, user: u64, line: &str) -> Result<()> {
    let app = context::AppContext::init(cfg, Utc::now())?;

    let classified = adjutant_core::classify(line);
    let started = std::time::Instant::now();
    let result = app
        .router
        .dispatch(&classified, &app.agent_ctx(user, Utc::now()))
        .await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    let (reply, ok) = match result {
        Ok(text) => (text, true),
        Err(e) => (user_message(&e), false),
    };
    app.metrics
        .record(classified.intent.name(), user, elapsed_ms, ok, Utc::now());

    println!("{reply}");
    app.shutdown().await;
    Ok(())
}
