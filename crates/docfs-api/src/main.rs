//! # docfs-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the docfs catalog.
//! Binds to the configured port (default 8080).

use docfs_api::config::{AppConfig, LogFormat};
use docfs_api::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration decides the log format, so it is read first. A bad
    // config still gets logged through the default text subscriber.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Invalid configuration: {e}");
            return Err(e.into());
        }
    };
    init_tracing(config.log_format);

    if config.credentials.is_none() {
        tracing::warn!(
            "DOCFS_USERNAME/DOCFS_PASSWORD not set, write routes are open to everyone"
        );
    }
    tracing::debug!(?config, "configuration loaded");

    let port = config.port;
    let state = AppState::connect(config).await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    let app = docfs_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("docfs API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber with an `info` default filter.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
