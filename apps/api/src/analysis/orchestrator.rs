//! Analysis orchestration.
//!
//! Flow: document present? → PDF type gate → extract (blocking pool) →
//!       model call (timeout + cancellation) → result.
//!
//! Nothing is stored. The upload and the answer live only for this call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::upload::{ensure_pdf, UploadedDocument};
use crate::analysis::AnalysisKind;
use crate::errors::AppError;
use crate::state::AppState;

/// One triggered analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub request_id: Uuid,
    pub kind: AnalysisKind,
    pub job_description: String,
    pub document: Option<UploadedDocument>,
}

/// What the user sees: the model's text under a heading.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub request_id: Uuid,
    pub kind: AnalysisKind,
    pub heading: String,
    /// Model output verbatim (markdown). Never parsed.
    pub analysis: String,
    pub page_count: usize,
    pub extracted_chars: usize,
    pub completed_at: DateTime<Utc>,
}

/// Runs one analysis end to end.
///
/// Steps:
/// 1. No document → `MissingDocument`; neither the extractor nor the requester runs
/// 2. `ensure_pdf()` rejects non-PDF uploads before extraction
/// 3. Register the request id so it can be cancelled
/// 4. Extract text on the blocking pool
/// 5. Call the requester with (instruction, resume text, job description)
pub async fn run_analysis(
    state: &AppState,
    request: AnalysisRequest,
) -> Result<AnalysisResult, AppError> {
    let AnalysisRequest {
        request_id,
        kind,
        job_description,
        document,
    } = request;

    // Step 1: Short-circuit on missing input
    let Some(document) = document else {
        warn!("Analysis {request_id} triggered without a resume");
        return Err(AppError::MissingDocument);
    };

    // Step 2: Type gate
    ensure_pdf(&document)?;

    // Step 3: Cancellation handle, removed when this function returns or is dropped
    let guard = state.in_flight.register(request_id)?;
    let token = guard.token().clone();

    info!(
        "Analysis {request_id} started: kind={kind:?}, file={:?}, bytes={}",
        document.file_name,
        document.bytes.len()
    );

    // Step 4: Extraction
    let extractor = state.extractor.clone();
    let bytes = document.bytes;
    let extracted = tokio::select! {
        _ = token.cancelled() => return Err(AppError::Cancelled),
        joined = tokio::task::spawn_blocking(move || extractor.extract(Some(&bytes))) => {
            joined.map_err(|e| AppError::Extraction(format!("extractor aborted: {e}")))??
        }
    };
    let extracted_chars = extracted.text.chars().count();
    info!(
        "Analysis {request_id}: extracted {extracted_chars} chars from {} pages",
        extracted.page_count
    );

    // Step 5: Model call
    let timeout = state.config.llm_timeout();
    let parts = [kind.instruction(), extracted.text.as_str(), job_description.as_str()];
    let analysis = tokio::select! {
        _ = token.cancelled() => {
            info!("Analysis {request_id} cancelled by user");
            return Err(AppError::Cancelled);
        }
        outcome = tokio::time::timeout(timeout, state.requester.generate(&parts)) => {
            outcome.map_err(|_| AppError::TimedOut(timeout.as_secs()))??
        }
    };

    info!(
        "Analysis {request_id} completed: {} chars returned",
        analysis.len()
    );

    Ok(AnalysisResult {
        request_id,
        kind,
        heading: kind.heading().to_string(),
        analysis,
        page_count: extracted.page_count,
        extracted_chars,
        completed_at: Utc::now(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;

    use super::test_support::*;
    use super::*;
    use crate::llm_client::prompts::{EVALUATION_PROMPT, MATCH_PROMPT};

    fn pdf_upload() -> UploadedDocument {
        UploadedDocument {
            file_name: "resume.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.4 stub"),
        }
    }

    fn request(kind: AnalysisKind, document: Option<UploadedDocument>) -> AnalysisRequest {
        AnalysisRequest {
            request_id: Uuid::new_v4(),
            kind,
            job_description: "Backend engineer, Rust and Postgres".to_string(),
            document,
        }
    }

    #[tokio::test]
    async fn test_missing_document_short_circuits() {
        for kind in [AnalysisKind::Evaluate, AnalysisKind::Match] {
            let extractor = stub_extractor("resume text");
            let requester = Arc::new(EchoRequester::new(Duration::ZERO));
            let state = state_with(extractor.clone(), requester.clone());

            let err = run_analysis(&state, request(kind, None)).await.unwrap_err();

            assert!(matches!(err, AppError::MissingDocument));
            assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
            assert_eq!(requester.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected_before_extraction() {
        let extractor = stub_extractor("resume text");
        let requester = Arc::new(EchoRequester::new(Duration::ZERO));
        let state = state_with(extractor.clone(), requester.clone());

        let document = UploadedDocument {
            file_name: "resume.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: Bytes::from_static(b"plain text"),
        };
        let err = run_analysis(&state, request(AnalysisKind::Evaluate, Some(document)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType(_)));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(requester.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_evaluate_result_is_echo_of_instruction_document_and_job() {
        let state = state_with(
            stub_extractor("Jane Doe. Seven years of Rust."),
            Arc::new(EchoRequester::new(Duration::ZERO)),
        );

        let result = run_analysis(&state, request(AnalysisKind::Evaluate, Some(pdf_upload())))
            .await
            .unwrap();

        assert_eq!(
            result.analysis,
            format!(
                "{EVALUATION_PROMPT}|Jane Doe. Seven years of Rust.|Backend engineer, Rust and Postgres"
            )
        );
        assert_eq!(result.heading, "Evaluation Result");
        assert_eq!(result.kind, AnalysisKind::Evaluate);
    }

    #[tokio::test]
    async fn test_match_sends_match_instruction_first() {
        let requester = Arc::new(EchoRequester::new(Duration::ZERO));
        let state = state_with(stub_extractor("resume"), requester.clone());

        let result = run_analysis(&state, request(AnalysisKind::Match, Some(pdf_upload())))
            .await
            .unwrap();

        let seen = requester.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0], MATCH_PROMPT);
        assert!(seen[0][0].contains("Percentage Match"));
        assert!(seen[0][0].contains("Missing Keywords"));
        assert!(seen[0][0].contains("Final Thoughts"));
        assert_eq!(result.heading, "Match Analysis");
    }

    #[tokio::test]
    async fn test_extraction_failure_is_distinct_from_remote_failure() {
        let state = state_with(
            Arc::new(FailingExtractor),
            Arc::new(EchoRequester::new(Duration::ZERO)),
        );
        let err = run_analysis(&state, request(AnalysisKind::Evaluate, Some(pdf_upload())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));

        let state = state_with(stub_extractor("resume"), Arc::new(RejectingRequester));
        let err = run_analysis(&state, request(AnalysisKind::Evaluate, Some(pdf_upload())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_remote_call_times_out() {
        let state = state_with(
            stub_extractor("resume"),
            Arc::new(EchoRequester::new(Duration::from_secs(3600))),
        );

        let err = run_analysis(&state, request(AnalysisKind::Match, Some(pdf_upload())))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TimedOut(5)));
    }

    #[tokio::test]
    async fn test_cancel_abandons_running_analysis() {
        let state = state_with(
            stub_extractor("resume"),
            Arc::new(EchoRequester::new(Duration::from_secs(3600))),
        );
        let req = request(AnalysisKind::Evaluate, Some(pdf_upload()));
        let request_id = req.request_id;

        let task_state = state.clone();
        let task = tokio::spawn(async move { run_analysis(&task_state, req).await });

        while !state.in_flight.is_running(request_id) {
            tokio::task::yield_now().await;
        }
        assert!(state.in_flight.cancel(request_id));

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        assert!(!state.in_flight.is_running(request_id));
    }

    #[tokio::test]
    async fn test_cancel_during_extraction_stops_waiting() {
        let (extractor, release) = BlockingExtractor::new();
        let requester = Arc::new(EchoRequester::new(Duration::ZERO));
        let state = state_with(extractor.clone(), requester.clone());
        let req = request(AnalysisKind::Evaluate, Some(pdf_upload()));
        let request_id = req.request_id;

        let task_state = state.clone();
        let task = tokio::spawn(async move { run_analysis(&task_state, req).await });

        while !extractor.started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(state.in_flight.cancel(request_id));

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
        assert!(!state.in_flight.is_running(request_id));
        assert_eq!(requester.calls.load(Ordering::SeqCst), 0);

        // The pool thread is still parked in the extractor; let it finish.
        release.send(()).unwrap();
    }
}
