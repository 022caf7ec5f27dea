mod analysis;
mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;
mod storage;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::Analyzer;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::scorer::{KeywordMatchScorer, LlmMatchScorer, MatchScorer};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::files::open_file_store;
use crate::storage::open_store;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a malformed value aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResuMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Record store: Postgres, or JSON files under STORAGE_DIR
    let store = open_store(config.database_url.as_deref(), &config.records_dir()).await?;
    info!("Record store: {}", store.backend());

    // Document store: S3 / MinIO when a bucket is configured
    let files = open_file_store(config.s3.as_ref(), &config.files_dir()).await;
    info!("Document store: {}", files.backend());

    // LLM client (optional)
    let llm = match &config.openrouter {
        Some(openrouter) => match LlmClient::new(openrouter) {
            Ok(client) => {
                info!("LLM client initialized (model: {})", client.model());
                Some(client)
            }
            Err(e) => {
                warn!("Could not build LLM client: {e}. Using regex analysis.");
                None
            }
        },
        None => {
            info!("OPENROUTER_API_KEY not set. Using regex analysis.");
            None
        }
    };

    let analyzer = Analyzer::new(config.analyzer_mode, llm);
    info!("Analyzer mode: {}", analyzer.mode());

    // Match scorer: LLM when the analyzer may use it, keyword otherwise
    let matcher: Arc<dyn MatchScorer> = match analyzer.active_llm() {
        Some(llm) => Arc::new(LlmMatchScorer(llm.clone())),
        None => Arc::new(KeywordMatchScorer),
    };

    let cors = cors_layer(&config.cors_allowed_origins)?;

    // Build app state
    let state = AppState {
        store,
        files,
        analyzer,
        matcher,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive when no origins are configured, an allow-list otherwise.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    if origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let allowed = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any))
}
