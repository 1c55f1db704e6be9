//! Vizboard Web Server
//!
//! Run with: cargo run -p vizboard-web

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vizboard_config::Config;
use vizboard_web::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vizboard=debug,info")),
        )
        .init();

    info!("Starting Vizboard Web Server...");

    let config = Config::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    let addr = config.bind_addr()?;

    match &config.dataset.default_path {
        Some(path) => info!(path = %path.display(), "Default dataset configured"),
        None => info!("No default dataset configured; uploads required"),
    }

    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
