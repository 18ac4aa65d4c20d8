mod board;
mod config;
mod errors;
mod jobs_client;
mod models;
mod reporter;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::board::service::BoardService;
use crate::config::Config;
use crate::jobs_client::HttpJobStatusApi;
use crate::reporter::TracingReporter;
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job tracker v{}", env!("CARGO_PKG_VERSION"));

    let api = HttpJobStatusApi::new(
        &config.jobs_api_url,
        config.jobs_api_token.clone(),
        Duration::from_secs(config.jobs_api_timeout_secs),
    )?;
    info!("Jobs API client initialized ({})", config.jobs_api_url);

    let board = Arc::new(BoardService::new(
        Arc::new(api),
        Arc::new(TracingReporter),
        config.page_size,
    ));

    // A failed first load leaves an empty board; clients retry via /refresh.
    match board.refresh().await {
        Ok(cards) => info!("Board ready with {cards} cards"),
        Err(e) => warn!("Initial board load failed: {e}"),
    }

    let app = build_router(AppState { board })
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
