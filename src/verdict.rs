//! Display values derived from an [`AnalysisResult`].
//!
//! Every optional field of the response has an explicit default here, so the
//! rendering layers never need to inspect raw `Option`s.

use crate::model::{AnalysisResult, AI_GENERATED_LABEL};
use serde::Serialize;

pub const AI_ADVISORY: &str =
    "This image appears to be generated by AI. It may not represent real events or people.";
pub const REAL_ADVISORY: &str = "This image appears to be authentic and not AI-generated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AiGenerated,
    Real,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::AiGenerated => "AI-Generated",
            Verdict::Real => "Real Image",
        }
    }
}

/// Any prediction other than the AI label counts as real.
pub fn is_ai_generated(result: &AnalysisResult) -> bool {
    result.prediction == AI_GENERATED_LABEL
}

pub fn verdict(result: &AnalysisResult) -> Verdict {
    if is_ai_generated(result) {
        Verdict::AiGenerated
    } else {
        Verdict::Real
    }
}

pub fn display_percentage(result: &AnalysisResult) -> String {
    match result.percentage.as_deref() {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => "0%".to_string(),
    }
}

/// Confidence as a bar width ratio in `[0, 1]`.
pub fn progress_bar_fraction(result: &AnalysisResult) -> f64 {
    let c = result.confidence.unwrap_or(0.0);
    if c.is_nan() {
        return 0.0;
    }
    c.clamp(0.0, 1.0)
}

pub fn detail_row(probability: Option<f64>) -> String {
    let p = probability.filter(|p| !p.is_nan()).unwrap_or(0.0);
    format!("{:.2}%", p * 100.0)
}

pub fn advisory_text(result: &AnalysisResult) -> &'static str {
    match verdict(result) {
        Verdict::AiGenerated => AI_ADVISORY,
        Verdict::Real => REAL_ADVISORY,
    }
}

/// Formatted per-class rows, present only when the response carried `details`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRows {
    pub ai_generated: String,
    pub real_image: String,
}

pub fn detail_rows(result: &AnalysisResult) -> Option<DetailRows> {
    result.details.as_ref().map(|d| DetailRows {
        ai_generated: detail_row(d.ai_generated_probability),
        real_image: detail_row(d.real_image_probability),
    })
}

/// All derived values at once, for output formats that want a flat view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedView {
    pub verdict: Verdict,
    pub label: &'static str,
    pub percentage: String,
    pub bar_fraction: f64,
    pub details: Option<DetailRows>,
    pub advisory: &'static str,
}

impl DerivedView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let v = verdict(result);
        Self {
            verdict: v,
            label: v.label(),
            percentage: display_percentage(result),
            bar_fraction: progress_bar_fraction(result),
            details: detail_rows(result),
            advisory: advisory_text(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProbabilityDetails;

    fn result(prediction: &str) -> AnalysisResult {
        AnalysisResult {
            success: true,
            prediction: prediction.to_string(),
            confidence: None,
            percentage: None,
            raw_probability: None,
            details: None,
        }
    }

    #[test]
    fn only_the_ai_label_is_ai_generated() {
        assert!(is_ai_generated(&result("AI-Generated Images")));
        assert!(!is_ai_generated(&result("Real Images")));
        assert!(!is_ai_generated(&result("ai-generated images")));
        assert!(!is_ai_generated(&result("Something New")));
        assert_eq!(advisory_text(&result("Something New")), REAL_ADVISORY);
        assert_eq!(advisory_text(&result("AI-Generated Images")), AI_ADVISORY);
    }

    #[test]
    fn percentage_defaults_when_absent_or_empty() {
        let mut r = result("Real Images");
        assert_eq!(display_percentage(&r), "0%");
        r.percentage = Some(String::new());
        assert_eq!(display_percentage(&r), "0%");
        r.percentage = Some("87.30%".into());
        assert_eq!(display_percentage(&r), "87.30%");
    }

    #[test]
    fn bar_fraction_is_clamped() {
        let mut r = result("Real Images");
        assert_eq!(progress_bar_fraction(&r), 0.0);
        r.confidence = Some(-0.2);
        assert_eq!(progress_bar_fraction(&r), 0.0);
        r.confidence = Some(1.4);
        assert_eq!(progress_bar_fraction(&r), 1.0);
        r.confidence = Some(0.55);
        assert_eq!(progress_bar_fraction(&r), 0.55);
        r.confidence = Some(f64::NAN);
        assert_eq!(progress_bar_fraction(&r), 0.0);
    }

    #[test]
    fn detail_rows_format_two_decimals_with_zero_default() {
        assert_eq!(detail_row(Some(0.8734)), "87.34%");
        assert_eq!(detail_row(None), "0.00%");

        let mut r = result("Real Images");
        assert!(detail_rows(&r).is_none());
        r.details = Some(ProbabilityDetails {
            ai_generated_probability: Some(0.1),
            real_image_probability: None,
        });
        let rows = detail_rows(&r).unwrap();
        assert_eq!(rows.ai_generated, "10.00%");
        assert_eq!(rows.real_image, "0.00%");
    }
}
