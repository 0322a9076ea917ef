use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::extract::{extract_text, DocumentFormat, ExtractError};

/// Multipart field names accepted for the uploaded file.
const FILE_FIELDS: &[&str] = &["file", "resume"];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub format: DocumentFormat,
    pub text: String,
    pub characters: usize,
    pub words: usize,
}

/// POST /api/upload
///
/// Validates extension and size before doing any parsing work.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let max_bytes = state.config.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !field.name().is_some_and(|name| FILE_FIELDS.contains(&name)) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().trim().to_string();
        if filename.is_empty() {
            return Err(AppError::Validation("No file was selected".to_string()));
        }
        let format = DocumentFormat::from_filename(&filename).ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "'{filename}' is not a supported file type; upload a PDF, DOC, or DOCX"
            ))
        })?;

        let data: Bytes = field.bytes().await.map_err(multipart_error)?;
        if data.len() > max_bytes {
            return Err(too_large(max_bytes));
        }
        if data.is_empty() {
            return Err(AppError::Validation(format!("'{filename}' is empty")));
        }

        let size = data.len();
        let text = tokio::task::spawn_blocking(move || extract_text(format, &data))
            .await
            .map_err(|e| {
                // pdf-extract panics on some malformed inputs.
                warn!("Text extraction task failed: {e}");
                AppError::Processing(format!("Could not read '{filename}'"))
            })?
            .map_err(|e| match e {
                ExtractError::Empty => {
                    AppError::Processing(format!("No readable text found in '{filename}'"))
                }
                other => {
                    warn!("Extraction failed for {filename}: {other}");
                    AppError::Processing(format!("Could not read '{filename}': {other}"))
                }
            })?;

        info!("Extracted {} chars from {filename} ({size} bytes)", text.len());
        return Ok(Json(UploadResponse {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            filename,
            format,
            text,
        }));
    }

    Err(AppError::Validation(
        "Request must include a 'file' field".to_string(),
    ))
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File exceeds the {} KB upload limit",
        max_bytes / 1024
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the request size limit".to_string())
    } else {
        AppError::Validation(e.body_text())
    }
}
