mod config;
mod diagnosis;
mod errors;
mod generation;
mod intake;
mod llm_client;
mod models;
mod retrieval;
mod routes;
mod session;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::retrieval::{CaseRetriever, DEFAULT_TOP_K};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::store::{ResourceLocator, Resources};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing API credential)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coach API v{}", env!("CARGO_PKG_VERSION"));

    // Load codebook, cases and template skeletons (fatal if any is missing)
    let locator = ResourceLocator::new(config.resource_root.clone());
    let resources = Resources::load(&locator).context("Failed to load startup resources")?;

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), config.openai_base_url.clone())
        .context("Failed to build HTTP client")?;
    info!("LLM client initialized (chat model: {})", llm_client::CHAT_MODEL);

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        resources: Arc::new(resources),
        retriever: Arc::new(CaseRetriever::new(DEFAULT_TOP_K)),
        sessions: SessionStore::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
