// src/main.rs
// Negentropy Engine - agent runtime server

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use negentropy_engine::config::CONFIG;
use negentropy_engine::state::ServerState;
use negentropy_engine::{db, http, metrics};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    CONFIG.validate()?;
    info!(env = %CONFIG.env, "starting negentropy engine");

    let pool = db::connect(&CONFIG.database).await?;
    db::migrate(&pool).await?;
    info!("database connected and migrated");

    metrics::init_metrics();

    let state = Arc::new(ServerState::new(&CONFIG, pool).await?);

    if CONFIG.tracing.enable_db_export {
        let exporter = state.span_exporter.clone();
        let batch_size = CONFIG.tracing.batch_size;
        let flush_interval = std::time::Duration::from_secs(CONFIG.tracing.flush_interval_secs);
        tokio::spawn(async move { exporter.run(batch_size, flush_interval).await });
        info!("span exporter flush loop started");
    }

    let app = http::router(state, &CONFIG);
    let addr = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&CONFIG.logging.level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if CONFIG.logging.is_json() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
