use anyhow::Result;
use axum::serve;
use imdg_msds_analyzer::{create_app, AppState};
use imdg_utils::{init_logging, AppConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        let mut config = AppConfig::default();
        config.apply_api_key_env();
        config
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting IMDG MSDS Analyzer");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState::from_config(config).await?;

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "Expired idle sessions");
            } else {
                debug!("No idle sessions to expire");
            }
        }
    });

    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("MSDS Analyzer listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}
