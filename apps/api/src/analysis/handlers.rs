//! Axum route handlers for the Analysis API and the HTML page.

use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::orchestrator::{run_analysis, AnalysisRequest, AnalysisResult};
use crate::analysis::page::IndexPage;
use crate::analysis::upload::{parse_request_id, read_form, AnalysisForm};
use crate::errors::AppError;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub request_id: Uuid,
    pub status: &'static str,
}

/// GET /
pub async fn handle_index() -> Result<Html<String>, AppError> {
    render(IndexPage::empty())
}

/// POST /analyze
///
/// Form target of the HTML page. Always answers with the page; failures
/// become a warning or error banner.
pub async fn handle_analyze_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(err) => return page_for_error(String::new(), err),
    };
    let job_description = form.job_description.clone();

    let outcome = match into_request(form, None) {
        Ok(request) => run_analysis(&state, request).await,
        Err(err) => Err(err),
    };

    match outcome {
        Ok(result) => match render(IndexPage::with_result(job_description, &result)) {
            Ok(page) => page.into_response(),
            Err(err) => err.into_response(),
        },
        Err(err) => page_for_error(job_description, err),
    }
}

/// POST /api/v1/analyze
///
/// Multipart in, JSON out. The request id may come from the form or the
/// `x-request-id` header; the form wins.
pub async fn handle_analyze_api(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let header_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(parse_request_id)
        .transpose()?;

    let form = read_form(multipart).await?;
    let request = into_request(form, header_id)?;

    let result = run_analysis(&state, request).await?;
    Ok(Json(result))
}

/// POST /api/v1/analyses/:request_id/cancel
pub async fn handle_cancel(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<CancelResponse>, AppError> {
    if !state.in_flight.cancel(request_id) {
        return Err(AppError::NotFound(format!(
            "No running analysis with request_id {request_id}"
        )));
    }

    Ok(Json(CancelResponse {
        request_id,
        status: "cancelling",
    }))
}

fn into_request(form: AnalysisForm, fallback_id: Option<Uuid>) -> Result<AnalysisRequest, AppError> {
    let kind = form.kind.ok_or_else(|| {
        AppError::Validation("Choose an action: 'evaluate' or 'match'".to_string())
    })?;

    Ok(AnalysisRequest {
        request_id: form
            .request_id
            .or(fallback_id)
            .unwrap_or_else(Uuid::new_v4),
        kind,
        job_description: form.job_description,
        document: form.document,
    })
}

fn page_for_error(job_description: String, err: AppError) -> Response {
    err.log();
    let status = if err.is_warning() {
        StatusCode::OK
    } else {
        err.status()
    };

    match render(IndexPage::with_error(job_description, &err)) {
        Ok(page) => (status, page).into_response(),
        Err(render_err) => render_err.into_response(),
    }
}

fn render(page: IndexPage) -> Result<Html<String>, AppError> {
    page.render()
        .map(Html)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to render page: {e}")))
}
