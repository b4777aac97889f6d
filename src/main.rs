mod client;
mod controller;
mod feedback;
mod poller;
mod protocol;
mod session;
#[cfg(test)]
mod testing;
mod timer;
mod ui;

use clap::Parser;
use client::{ClientConfig, InterviewClient};
use controller::SessionController;
use poller::PollSettings;
use session::{InterviewConfig, MAX_QUESTIONS, MIN_QUESTIONS};
use std::error::Error;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Terminal client for the AI mock interview service.
#[derive(Parser, Debug)]
#[command(name = "coach", version)]
struct Cli {
    /// Base URL of the interview backend
    #[arg(long, env = "COACH_BASE_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// Job role prefilled in the setup form
    #[arg(long, env = "COACH_JOB_ROLE", default_value = "Software Engineer")]
    role: String,

    /// Experience level prefilled in the setup form
    #[arg(long, env = "COACH_EXPERIENCE_LEVEL", default_value = "Mid-Level")]
    level: String,

    /// Number of questions prefilled in the setup form
    #[arg(
        long,
        env = "COACH_QUESTION_COUNT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(MIN_QUESTIONS as i64..=MAX_QUESTIONS as i64)
    )]
    questions: u32,

    /// Delay between question readiness checks
    #[arg(long, env = "COACH_POLL_INTERVAL_MS", default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Give up waiting for questions after this many checks (default: never)
    #[arg(long, env = "COACH_MAX_POLL_ATTEMPTS", value_parser = clap::value_parser!(u32).range(1..))]
    max_poll_attempts: Option<u32>,

    /// Per-request timeout; answer scoring can take a while
    #[arg(long, env = "COACH_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    request_timeout_secs: u64,

    /// Log file (stdout belongs to the terminal UI)
    #[arg(long, env = "COACH_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.log_file.clone().unwrap_or_else(default_log_path))?;

    let client = InterviewClient::new(ClientConfig {
        base_url: cli.base_url,
        request_timeout: Duration::from_secs(cli.request_timeout_secs),
    })?;
    info!(base_url = client.base_url(), "coach starting");

    let controller = SessionController::new(
        client,
        PollSettings {
            interval: Duration::from_millis(cli.poll_interval_ms),
            max_attempts: cli.max_poll_attempts,
        },
    );
    let defaults = InterviewConfig {
        job_role: cli.role,
        experience_level: cli.level,
        question_count: cli.questions,
    };

    ui::run_tui(controller, defaults)
}

fn init_logging(path: PathBuf) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coach=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn default_log_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        return PathBuf::from(home).join(".coach").join("coach.log");
    }

    PathBuf::from("coach.log")
}
