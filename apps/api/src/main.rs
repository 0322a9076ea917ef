mod config;
mod draft;
mod errors;
mod export;
mod extractors;
mod llm_client;
mod models;
mod pages;
mod review;
mod routes;
mod session;
mod state;
mod suggest;
mod upload;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{CompletionBackend, LlmClient};
use crate::routes::build_router;
use crate::session::FileSessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Studio v{}", env!("CARGO_PKG_VERSION"));

    // Initialize session store
    let sessions = FileSessionStore::open(
        &config.session_dir,
        chrono::Duration::hours(config.session_ttl_hours),
    )
    .await
    .with_context(|| format!("Cannot open session directory {}", config.session_dir.display()))?;
    info!(
        "Session store at {} (ttl {}h)",
        sessions.dir().display(),
        config.session_ttl_hours
    );

    // Initialize LLM client; without a key the AI endpoints answer 503
    let llm: Option<Arc<dyn CompletionBackend>> = match &config.openai_api_key {
        Some(key) => {
            let client = LlmClient::new(
                key.clone(),
                &config.openai_base_url,
                config.openai_model.clone(),
                Duration::from_secs(config.llm_timeout_secs),
            )
            .context("Failed to build LLM HTTP client")?;
            info!("LLM client initialized (model: {})", config.openai_model);
            Some(Arc::new(client) as Arc<dyn CompletionBackend>)
        }
        None => {
            warn!("OPENAI_API_KEY is not set; AI suggestions and reviews are disabled");
            None
        }
    };

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        sessions: Arc::new(sessions),
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
