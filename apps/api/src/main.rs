mod assessment;
mod config;
mod dashboard;
mod errors;
mod llm_client;
mod models;
mod profile;
mod recommendations;
mod routes;
mod session;
mod state;
mod workbook;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::assessment::generator::GeminiQuestionGenerator;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::profile::matcher::OccupationMatcher;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::workbook::reference::ReferenceData;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; a missing GEMINI_API_KEY aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting DTP API v{}", env!("CARGO_PKG_VERSION"));

    // Load the reference workbook
    let reference = ReferenceData::load(&config)?;

    // Fit the occupation matcher over the PON TIK table
    let matcher = OccupationMatcher::fit(&reference.occupations)?;
    info!("Occupation matcher ready ({} occupations)", reference.occupations.len());

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let question_generator = Arc::new(GeminiQuestionGenerator::new(llm.clone()));

    // Build app state
    let state = AppState {
        reference: Arc::new(reference),
        matcher: Arc::new(matcher),
        sessions: SessionStore::new(),
        question_generator,
        llm,
        config: config.clone(),
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
