mod autosave;
mod config;
mod cv;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv::store::{DraftStore, MemoryDraftStore, PgDraftStore};
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV Studio API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn DraftStore> = match &config.database_url {
        Some(url) => Arc::new(PgDraftStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set, drafts are kept in memory and lost on restart");
            Arc::new(MemoryDraftStore::new())
        }
    };

    info!(
        "Autosave: {:?} quiet period, {:?} completion",
        config.autosave_quiet_period, config.autosave_mode
    );

    let state = AppState::new(store, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the editor frontend once it has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
