// Resume analysis: one upload, one instruction variant, one model call.
// The HTML page and the JSON API share `orchestrator::run_analysis`.

pub mod handlers;
pub mod in_flight;
pub mod orchestrator;
pub mod page;
pub mod upload;

use serde::Serialize;

use crate::llm_client::prompts::{EVALUATION_PROMPT, MATCH_PROMPT};

/// Which trigger the user pressed. Selects the instruction variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Evaluate,
    Match,
}

impl AnalysisKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "evaluate" => Some(AnalysisKind::Evaluate),
            "match" => Some(AnalysisKind::Match),
            _ => None,
        }
    }

    pub fn instruction(self) -> &'static str {
        match self {
            AnalysisKind::Evaluate => EVALUATION_PROMPT,
            AnalysisKind::Match => MATCH_PROMPT,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            AnalysisKind::Evaluate => "Evaluation Result",
            AnalysisKind::Match => "Match Analysis",
        }
    }
}
