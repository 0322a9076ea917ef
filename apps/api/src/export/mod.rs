// PDF export: resume drafts and stored analysis reports.
// Rendering is CPU-bound and runs inside tokio::task::spawn_blocking.

use thiserror::Error;

use crate::errors::AppError;

pub mod font_metrics;
pub mod handlers;
pub mod pdf;
pub mod report;
pub mod resume;
pub mod style;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::Internal(anyhow::Error::new(e))
    }
}
