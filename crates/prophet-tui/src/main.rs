// Stat Prophet entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the gateway client
// 4. Create mpsc channels and the application state
// 5. Spawn the app logic task
// 6. Run the TUI until the user quits
// 7. Wait for the app task to wind down

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use directories::ProjectDirs;
use tokio::sync::mpsc;
use tracing::{error, info};

use prophet_app::app;
use prophet_core::config;
use prophet_gateway::GatewayClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_path = init_tracing()?;
    info!("Stat Prophet starting up (log: {})", log_path.display());

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: endpoint={}, sports={:?}, {} featured players",
        config.api.endpoint,
        config.wizard.sports,
        config.roster.featured.len()
    );

    let client = GatewayClient::from_config(&config.api).context("failed to build HTTP client")?;

    let (gateway_tx, gateway_rx) = mpsc::channel(64);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(config, Arc::new(client), gateway_tx);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(gateway_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {:#}", e);
        }
    });

    if let Err(e) = stat_prophet::run(ui_rx, cmd_tx).await {
        error!("TUI error: {:#}", e);
    }

    let _ = tokio::time::timeout(Duration::from_secs(5), app_handle).await;

    info!("Stat Prophet shut down cleanly");
    Ok(())
}

/// Log to a file under the platform data directory, falling back to
/// `./logs`. The terminal belongs to the TUI.
fn init_tracing() -> anyhow::Result<PathBuf> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = match ProjectDirs::from("", "", "stat-prophet") {
        Some(dirs) => dirs.data_dir().join("logs"),
        None => std::env::current_dir()?.join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_path = log_dir.join("stat-prophet.log");
    let log_file = std::fs::File::create(&log_path)
        .with_context(|| format!("failed to create {}", log_path.display()))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("stat_prophet=info,prophet_app=info,prophet_gateway=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(log_path)
}
