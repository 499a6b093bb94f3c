use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractError;
use crate::llm_client::LlmError;

pub const MISSING_DOCUMENT_MESSAGE: &str = "Please upload your resume to proceed.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No resume was uploaded")]
    MissingDocument,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Upload exceeds the configured body limit")]
    PayloadTooLarge,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM call exceeded {0}s")]
    TimedOut(u64),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MissingInput => AppError::MissingDocument,
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingDocument | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Cancelled => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::MissingDocument => "MISSING_DOCUMENT",
            AppError::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            AppError::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Extraction(_) => "EXTRACTION_FAILED",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::TimedOut(_) => "LLM_TIMEOUT",
            AppError::Cancelled => "CANCELLED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The message shown to the user. Upstream details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingDocument => MISSING_DOCUMENT_MESSAGE.to_string(),
            AppError::UnsupportedFileType(_) => "Only PDF resumes are supported.".to_string(),
            AppError::PayloadTooLarge => "The resume exceeds the upload limit.".to_string(),
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Extraction(_) => "The resume could not be read as a PDF.".to_string(),
            AppError::Llm(_) => "The analysis service failed to respond.".to_string(),
            AppError::TimedOut(_) => "The analysis took too long and was abandoned.".to_string(),
            AppError::Cancelled => "The analysis was cancelled.".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    /// Warnings end the interaction without being treated as failures.
    pub fn is_warning(&self) -> bool {
        matches!(self, AppError::MissingDocument)
    }

    pub(crate) fn log(&self) {
        match self {
            AppError::Extraction(msg) => tracing::warn!("Extraction error: {msg}"),
            AppError::Llm(e) => tracing::error!("LLM error: {e}"),
            AppError::TimedOut(secs) => tracing::error!("LLM call timed out after {secs}s"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.user_message()
            }
        }));

        (self.status(), body).into_response()
    }
}
