use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use bastion::{router::init_router, state::AppState};
use bastion_config::{AppConfig, ServerMode, load_env_files, resolve_mode};
use bastion_core::errors::{REGISTRY, ensure_unique_codes};
use bastion_db::{PgUserRepository, init_db_pool};
use bastion_observability::{init_logging, init_metrics};

#[derive(Debug, Parser)]
#[command(name = "bastion", version, about = "Bastion API server")]
struct Cli {
    /// Selects `.env.<mode>` and the console log format. Falls back to
    /// `APP_MODE` in `.env`, then `dev`.
    #[arg(long, env = "APP_MODE", value_enum)]
    mode: Option<ServerMode>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mode = resolve_mode(cli.mode);

    load_env_files(mode);
    let config = AppConfig::from_env(mode);
    config.validate().context("invalid configuration")?;
    ensure_unique_codes(REGISTRY).context("exception code table is inconsistent")?;

    let _log_guard = init_logging(&config.log, config.mode).context("failed to set up logging")?;

    let metrics = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder not installed, /metrics disabled");
            None
        }
    };

    let pool = init_db_pool(&config.database)
        .await
        .context("failed to connect to database")?;
    let cache = bastion_cache::connect(&config.cache)
        .await
        .context("failed to connect to cache")?;
    let store = Arc::new(PgUserRepository::new(pool.clone()));

    let addr = config.server.addr();
    let mode = config.mode;
    let state = AppState::new(config, store, cache);
    let app = init_router(state, metrics);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, %mode, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
