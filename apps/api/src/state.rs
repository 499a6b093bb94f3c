use std::sync::Arc;

use crate::analysis::in_flight::InFlightRegistry;
use crate::config::Config;
use crate::extraction::TextExtractor;
use crate::llm_client::AnalysisRequester;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Default: `PdfTextExtractor`. Tests swap in stubs.
    pub extractor: Arc<dyn TextExtractor>,
    /// Default: `GeminiClient`. Tests swap in stubs.
    pub requester: Arc<dyn AnalysisRequester>,
    pub in_flight: InFlightRegistry,
}
