//! Request extractors whose rejections go through `AppError`, so malformed
//! bodies get the same `{"error":{code,message}}` shape as every other failure.

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::errors::AppError;

/// `axum::Json` with an `AppError` rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
