//! Post-processing of raw model text
//!
//! Models are asked for bare JSON or bare diagram text but sometimes wrap
//! it in a markdown code fence. These parsers strip the fence and split on
//! the explanation marker, nothing more lenient than that.

use crate::analysis::{FlowchartResult, StructuredAnalysis};
use lexaid_common::EXPLANATION_MARKER;
use lexaid_common::search::MAX_RANKED_IDS;
use serde_json::Value;
use tracing::warn;

/// Remove a leading ```lang fence line and a trailing ``` fence, if present
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        // An info string ("json", "mermaid", ...) only ends at a newline
        body = match rest.find('\n') {
            Some(pos) => &rest[pos + 1..],
            None => rest,
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

/// Split a flowchart response on the explanation marker.
///
/// Without the marker the whole response is the diagram and the
/// explanation is empty.
pub fn split_flowchart(text: &str) -> FlowchartResult {
    match text.split_once(EXPLANATION_MARKER) {
        Some((diagram, explanation)) => FlowchartResult {
            diagram: strip_code_fences(diagram).to_string(),
            explanation: explanation.trim().to_string(),
        },
        None => FlowchartResult {
            diagram: strip_code_fences(text).to_string(),
            explanation: String::new(),
        },
    }
}

/// Parse a judgment analysis. `None` when the text is not a JSON object.
pub fn parse_structured_analysis(text: &str) -> Option<StructuredAnalysis> {
    let value = match serde_json::from_str::<Value>(strip_code_fences(text)) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => {
            warn!("Judgment analysis was JSON but not an object");
            return None;
        }
        Err(e) => {
            warn!("Judgment analysis was not valid JSON: {}", e);
            return None;
        }
    };
    match serde_json::from_value::<StructuredAnalysis>(value) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            warn!("Judgment analysis had an unusable shape: {}", e);
            None
        }
    }
}

/// Parse a ranked id list, keeping at most the first twenty entries
pub fn parse_ranked_ids(text: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Vec<String>>(strip_code_fences(text)) {
        Ok(mut ids) => {
            ids.truncate(MAX_RANKED_IDS);
            Some(ids)
        }
        Err(e) => {
            warn!("Ranked id list was not a JSON string array: {}", e);
            None
        }
    }
}
