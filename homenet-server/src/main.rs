//! homenet - household media tracker web server
//!
//! Loads `<config_dir>/homenet/config.json` (written with defaults on first
//! run), opens the SQLite store and serves the boards until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Parser;
use homenet_common::{config, logging, Config};
use homenet_server::{build_router, db::Store, AppState};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "homenet")]
#[command(about = "Household movie and TV show tracker")]
#[command(version)]
struct Args {
    /// Configuration file (default: <config_dir>/homenet/config.json)
    #[arg(short, long, env = "HOMENET_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on, overriding the config file
    #[arg(short, long, env = "PORT")]
    port: Option<String>,

    /// Log level (DEBUG, INFO, WARN, ERROR), overriding the config file
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

fn load_config(args: &Args) -> Result<Config> {
    let path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };

    let mut config = Config::load_or_create(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_overrides(args.port.as_deref(), args.log_level.as_deref());
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // The log level lives in the config file, so tracing starts after it loads
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            logging::init_tracing("INFO");
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_tracing(&config.logging.level);

    info!(
        "Starting homenet v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let store = Store::open(&config.database.data_dir, &config.database.db_name).await?;
    info!("✓ Database initialized");

    let addr = config.bind_address();
    let state = AppState::new(store.clone(), config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("homenet listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
