use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failures that escape a handler. Expected conditions (duplicates, bad
/// uploads) never get here; they become redirects with a message instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Upload error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Multipart(e) => e.status(),
            AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!(%status, "Request failed: {}", self);
        (status, self.to_string()).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
