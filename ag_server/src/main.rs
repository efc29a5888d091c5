//! Attendance gate server.
//!
//! Opens the worksheet store, builds the authenticator and serves the gated
//! pages until Ctrl+C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ag_server::{
    api,
    config::ServerConfig,
    logging, metrics, purge,
};
use anyhow::{Context, Error};
use attendance_gate::{Authenticator, FileRowStore, SheetRecordRepository};
use pico_args::Arguments;
use tracing::{info, warn};

const HELP: &str = "\
Run the attendance gate server

USAGE:
  ag_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8501]
  --store-dir  PATH        Worksheet directory         [default: env STORE_DIR or ./data]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  ENCRYPTION_KEY                Secret protecting the password and session tokens
  DEFAULT_PASSWORD              Password accepted until one is stored
  SESSION_DAYS                  Session/fingerprint lifetime in days (default 30)
  STORE_TIMEOUT_SECS            Per-operation store timeout (default 5)
  SESSION_PURGE_INTERVAL_SECS   Expired record purge period, 0 = off (default 0)
  METRICS_BIND                  Prometheus exporter address (optional)
  (A .env file in the working directory is loaded if present)
";

struct Args {
    bind: Option<SocketAddr>,
    store_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        store_dir: pargs.opt_value_from_str("--store-dir")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.store_dir)?;
    config.validate()?;
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics at http://{}/metrics", addr);
    }

    info!("Opening worksheet store at {}", config.store.data_dir.display());
    let store = FileRowStore::open(&config.store)
        .await
        .with_context(|| format!("Failed to open store at {}", config.store.data_dir.display()))?;
    let repository = SheetRecordRepository::new(Arc::new(store), config.store.operation_timeout());
    let authenticator = Arc::new(Authenticator::new(Arc::new(repository), config.auth.clone()));

    if let Err(e) = authenticator.health_check().await {
        warn!("Record store is not reachable yet: {}", e);
    }

    let purge_task = (config.purge_interval_secs > 0).then(|| {
        purge::spawn(
            authenticator.clone(),
            Duration::from_secs(config.purge_interval_secs),
        )
    });

    let app = api::create_router(api::AppState { authenticator });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(task) = purge_task {
        task.abort();
    }
    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
