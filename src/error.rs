// src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the web layer.
///
/// Extraction itself never fails; a document that can't be read just
/// contributes an empty record.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("spreadsheet export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("nothing has been extracted yet")]
    NoExport,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Multipart(e) => e.status(),
            AppError::NoExport => StatusCode::NOT_FOUND,
            AppError::Export(_) | AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
