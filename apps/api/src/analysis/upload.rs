//! Multipart form reading and the PDF type gate.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use uuid::Uuid;

use crate::analysis::AnalysisKind;
use crate::errors::AppError;

/// Content types a browser may declare for a PDF upload.
const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/pdf", "application/octet-stream"];

/// A resume held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Everything the form submitted. Nothing here is validated yet.
#[derive(Debug, Default)]
pub struct AnalysisForm {
    pub job_description: String,
    pub document: Option<UploadedDocument>,
    pub kind: Option<AnalysisKind>,
    pub request_id: Option<Uuid>,
}

/// Drains the multipart stream into an `AnalysisForm`.
///
/// Fields:
/// - `job_description`: free text
/// - `resume`: the file part; an empty, unnamed part means nothing was chosen
/// - `action`: `evaluate` | `match`, last occurrence wins
/// - `request_id`: optional UUID used to cancel the analysis
pub async fn read_form(mut multipart: Multipart) -> Result<AnalysisForm, AppError> {
    let mut form = AnalysisForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Malformed multipart body"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_description" => {
                form.job_description = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "Invalid job_description"))?;
            }
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Invalid resume upload"))?;

                form.document = if file_name.is_empty() && bytes.is_empty() {
                    None
                } else {
                    Some(UploadedDocument {
                        file_name,
                        content_type,
                        bytes,
                    })
                };
            }
            "action" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "Invalid action"))?;
                let kind = AnalysisKind::parse(&value).ok_or_else(|| {
                    AppError::Validation(format!(
                        "Unknown action '{value}'. Expected 'evaluate' or 'match'"
                    ))
                })?;
                form.kind = Some(kind);
            }
            "request_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, "Invalid request_id"))?;
                if !value.trim().is_empty() {
                    form.request_id = Some(parse_request_id(&value)?);
                }
            }
            other => {
                tracing::debug!("Ignoring unknown form field '{other}'");
            }
        }
    }

    Ok(form)
}

/// Body-limit rejections keep their meaning; anything else is a bad form.
fn multipart_error(err: MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

pub fn parse_request_id(value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("request_id '{value}' is not a UUID")))
}

/// Rejects anything that is not declared as a PDF. Runs before extraction.
pub fn ensure_pdf(document: &UploadedDocument) -> Result<(), AppError> {
    let has_pdf_extension = document.file_name.to_ascii_lowercase().ends_with(".pdf");
    if !has_pdf_extension {
        return Err(AppError::UnsupportedFileType(document.file_name.clone()));
    }

    if let Some(content_type) = &document.content_type {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
            return Err(AppError::UnsupportedFileType(content_type.clone()));
        }
    }

    Ok(())
}
