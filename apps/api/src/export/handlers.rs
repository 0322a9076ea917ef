//! Axum route handlers for PDF export.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::export::pdf::RenderedPdf;
use crate::export::report::{render_report_pdf, REPORT_FILENAME};
use crate::export::resume::render_resume_pdf;
use crate::export::ExportError;
use crate::models::resume::DraftInput;
use crate::session::cookie::session_id;
use crate::state::AppState;

/// POST /export_pdf
///
/// Renders the draft posted in the body. Nothing is stored.
pub async fn handle_export_posted(
    AppJson(input): AppJson<DraftInput>,
) -> Result<Response, AppError> {
    let draft = input.normalize()?;
    draft.validate()?;

    let filename = draft.download_filename();
    let pdf = render_blocking(move || render_resume_pdf(&draft)).await?;
    info!("Exported posted draft ({} pages)", pdf.pages);
    Ok(pdf_response(pdf, &filename))
}

/// GET /api/export/resume
///
/// Renders the draft stored in the caller's session.
pub async fn handle_export_saved(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AppError> {
    let (jar, id) = session_id(jar);
    let draft = state
        .sessions
        .load(id)
        .await?
        .and_then(|record| record.draft)
        .ok_or_else(|| AppError::NotFound("No saved resume in this session".to_string()))?;
    draft.validate()?;

    let filename = draft.download_filename();
    let pdf = render_blocking(move || render_resume_pdf(&draft)).await?;
    info!("Exported saved draft for session {id} ({} pages)", pdf.pages);
    Ok((jar, pdf_response(pdf, &filename)))
}

/// GET /api/export/report
///
/// Renders the last analysis report stored in the caller's session.
pub async fn handle_export_report(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AppError> {
    let (jar, id) = session_id(jar);
    let report = state
        .sessions
        .load(id)
        .await?
        .and_then(|record| record.report)
        .ok_or_else(|| AppError::NotFound("No analysis report in this session".to_string()))?;

    let pdf = render_blocking(move || render_report_pdf(&report)).await?;
    info!("Exported analysis report for session {id}");
    Ok((jar, pdf_response(pdf, REPORT_FILENAME)))
}

async fn render_blocking<F>(render: F) -> Result<RenderedPdf, AppError>
where
    F: FnOnce() -> Result<RenderedPdf, ExportError> + Send + 'static,
{
    let pdf = tokio::task::spawn_blocking(render)
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(pdf)
}

fn pdf_response(pdf: RenderedPdf, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf.bytes,
    )
        .into_response()
}
