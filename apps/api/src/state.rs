use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::CompletionBackend;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no API key is configured; AI endpoints then answer 503.
    pub llm: Option<Arc<dyn CompletionBackend>>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn llm(&self) -> Result<&dyn CompletionBackend, AppError> {
        self.llm.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable(
                "AI features are not configured on this server".to_string(),
            )
        })
    }
}
