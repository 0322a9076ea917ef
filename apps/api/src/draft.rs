//! Axum route handlers for the session-backed resume draft.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extractors::AppJson;
use crate::models::resume::{DraftInput, ResumeDraft};
use crate::session::cookie::session_id;
use crate::session::load_or_new;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaveDraftResponse {
    pub status: &'static str,
    pub resume: ResumeDraft,
}

#[derive(Debug, Serialize)]
pub struct GetDraftResponse {
    pub resume: ResumeDraft,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub status: &'static str,
}

/// POST /api/resume (also POST /builder)
///
/// Normalizes and validates the draft, then overwrites the session copy.
pub async fn handle_save_draft(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<DraftInput>,
) -> Result<(CookieJar, Json<SaveDraftResponse>), AppError> {
    let draft = input.normalize()?;
    draft.validate()?;

    let (jar, id) = session_id(jar);
    let mut record = load_or_new(state.sessions.as_ref(), id).await?;
    record.draft = Some(draft.clone());
    state.sessions.save(&mut record).await?;

    info!("Saved draft for session {id}");
    Ok((
        jar,
        Json(SaveDraftResponse {
            status: "saved",
            resume: draft,
        }),
    ))
}

/// GET /api/resume
pub async fn handle_get_draft(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<GetDraftResponse>), AppError> {
    let (jar, id) = session_id(jar);
    let resume = state
        .sessions
        .load(id)
        .await?
        .and_then(|record| record.draft)
        .ok_or_else(|| AppError::NotFound("No saved resume in this session".to_string()))?;
    Ok((jar, Json(GetDraftResponse { resume })))
}

/// DELETE /api/resume
///
/// Explicit reset: drops the draft and any stored analysis report.
pub async fn handle_clear_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ClearResponse>), AppError> {
    let (jar, id) = session_id(jar);
    state.sessions.clear(id).await?;
    info!("Cleared session {id}");
    Ok((jar, Json(ClearResponse { status: "cleared" })))
}
