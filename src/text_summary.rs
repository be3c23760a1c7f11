//! Text and JSON renderings of a finished analysis.
//!
//! This module formats human-readable lines for text mode and the report
//! object printed in JSON mode.

use crate::model::{AnalysisResult, FileSummary, SessionSnapshot};
use crate::session::{AnalysisState, StateLabel};
use crate::verdict::{self, DerivedView};
use serde::Serialize;

const BAR_CELLS: usize = 30;

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Fixed-width confidence bar, e.g. `[#########.....]`.
pub(crate) fn confidence_bar(fraction: f64, cells: usize) -> String {
    let filled = ((fraction * cells as f64).round() as usize).min(cells);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(cells - filled))
}

fn result_lines(result: &AnalysisResult, lines: &mut Vec<String>) {
    let view = DerivedView::from_result(result);
    lines.push("Detection Result".to_string());
    lines.push(format!(
        "Verdict:    {} ({})",
        view.label,
        verdict::display_percentage(result)
    ));
    lines.push(format!(
        "Confidence: {} {}",
        confidence_bar(view.bar_fraction, BAR_CELLS),
        view.percentage
    ));
    if let Some(rows) = view.details {
        lines.push("Detailed Probabilities:".to_string());
        lines.push(format!("  AI-Generated: {}", rows.ai_generated));
        lines.push(format!("  Real Image:   {}", rows.real_image));
    }
    lines.push(view.advisory.to_string());
}

/// Build the text summary for a snapshot.
pub(crate) fn build_text_summary(snapshot: &SessionSnapshot) -> TextSummary {
    let mut lines = Vec::new();

    if let Some(file) = snapshot.file.as_ref() {
        lines.push(format!(
            "File: {} ({}, {} bytes)",
            file.name,
            file.media_type.as_mime(),
            file.size
        ));
    }

    match &snapshot.state {
        AnalysisState::Idle => lines.push("No analysis yet".to_string()),
        AnalysisState::Running => lines.push("Analyzing...".to_string()),
        AnalysisState::Succeeded(result) => result_lines(result, &mut lines),
        AnalysisState::Failed(err) => lines.push(format!("Error: {}", err.user_message())),
    }

    TextSummary { lines }
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

/// Machine-readable report printed by `--json`.
#[derive(Debug, Serialize)]
pub(crate) struct JsonReport {
    pub analyzed_at: String,
    pub base_url: String,
    pub file: Option<FileSummary>,
    pub state: StateLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derived: Option<DerivedView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

pub(crate) fn build_json_report(snapshot: &SessionSnapshot, base_url: &str) -> JsonReport {
    let result = snapshot.state.result().cloned();
    JsonReport {
        analyzed_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        base_url: base_url.to_string(),
        file: snapshot.file.clone(),
        state: snapshot.state.label(),
        derived: result.as_ref().map(DerivedView::from_result),
        result,
        error: snapshot.state.error().map(|e| ErrorReport {
            kind: e.kind(),
            message: e.user_message(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::model::{MediaType, ProbabilityDetails};
    use crate::verdict::AI_ADVISORY;

    fn snapshot(state: AnalysisState) -> SessionSnapshot {
        SessionSnapshot {
            file: Some(FileSummary {
                name: "dog.png".into(),
                media_type: MediaType::Png,
                size: 1024,
            }),
            preview: None,
            state,
        }
    }

    fn ai_result() -> AnalysisResult {
        AnalysisResult {
            success: true,
            prediction: "AI-Generated Images".into(),
            confidence: Some(0.5),
            percentage: Some("50.00%".into()),
            raw_probability: None,
            details: Some(ProbabilityDetails {
                ai_generated_probability: Some(0.5),
                real_image_probability: Some(0.5),
            }),
        }
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(confidence_bar(0.0, 4), "[....]");
        assert_eq!(confidence_bar(0.5, 4), "[##..]");
        assert_eq!(confidence_bar(1.0, 4), "[####]");
    }

    #[test]
    fn success_summary_lists_verdict_details_and_advisory() {
        let summary = build_text_summary(&snapshot(AnalysisState::Succeeded(ai_result())));
        assert_eq!(summary.lines[0], "File: dog.png (image/png, 1024 bytes)");
        assert!(summary.lines.contains(&"Verdict:    AI-Generated (50.00%)".to_string()));
        assert!(summary.lines.contains(&"  AI-Generated: 50.00%".to_string()));
        assert_eq!(summary.lines.last().unwrap(), AI_ADVISORY);
    }

    #[test]
    fn failure_summary_shows_user_message_only() {
        let summary = build_text_summary(&snapshot(AnalysisState::Failed(
            AnalysisError::Transport("dns error".into()),
        )));
        let last = summary.lines.last().unwrap();
        assert!(last.starts_with("Error: Failed to connect to server"));
        assert!(!last.contains("dns"));
    }

    #[test]
    fn json_report_has_exactly_one_branch() {
        let ok = build_json_report(&snapshot(AnalysisState::Succeeded(ai_result())), "http://x");
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["state"], "succeeded");
        assert_eq!(v["derived"]["verdict"], "ai_generated");
        assert!(v.get("error").is_none());

        let failed = build_json_report(
            &snapshot(AnalysisState::Failed(AnalysisError::Server(None))),
            "http://x",
        );
        let v = serde_json::to_value(&failed).unwrap();
        assert_eq!(v["state"], "failed");
        assert_eq!(v["error"]["kind"], "server_reported");
        assert_eq!(v["error"]["message"], "Failed to process image");
        assert!(v.get("result").is_none());
    }
}
