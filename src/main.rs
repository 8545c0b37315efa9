use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use incident_reopener::config::AppConfig;
use incident_reopener::server::{create_router, AppState};
use incident_reopener::shutdown::wait_for_shutdown;
use incident_reopener::trigger;
use incident_reopener::workflow;

#[derive(Parser)]
#[command(
    name = "incident-reopener",
    about = "Reopens Sentinel incidents closed as Undetermined with nobody assigned"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single remediation pass, print the report, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.once {
        return run_once(config).await;
    }

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        workspace = %config.sentinel.workspace,
        "Starting incident-reopener server"
    );

    let state = Arc::new(AppState::new(config.clone())?);

    // Start the schedule-triggered loop alongside the HTTP trigger
    if config.schedule.enabled {
        let timer_state = Arc::clone(&state);
        tokio::spawn(async move {
            trigger::timer::run_schedule(timer_state).await;
        });
    }

    let app = create_router(Arc::clone(&state))?;

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        config.server.host, config.server.port
    ))
    .await?;

    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    Ok(())
}

/// One remediation pass from the command line: the runbook form of the
/// schedule trigger.
async fn run_once(config: AppConfig) -> anyhow::Result<()> {
    config.sentinel.validate()?;

    let state = AppState::new(config)?;

    let summary = workflow::run::run_remediation(
        &state.store,
        &state.config.sentinel.workspace,
        state.config.sentinel.window_hours,
    )
    .await?;

    let report = trigger::http::ReopenResponse::from_summary(summary);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
