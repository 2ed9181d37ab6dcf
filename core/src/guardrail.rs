//! Post-generation validation of a candidate report. Rules run in a fixed
//! order and the first failure wins; the outcome is a value, not an error,
//! so the orchestrator can drive its single-retry escalation from it.

use crate::report::Report;

/// Minimum meaningful field length after trimming whitespace
const MIN_FIELD_LEN: usize = 10;

/// Phrases signaling the model expressing explicit low confidence or
/// fabrication awareness. Matched as lowercase substrings in any field.
const FORBIDDEN_PHRASES: &[&str] = &[
    "hallucinated",
    "not sure of anything",
    "i could be drastically wrong",
];

/// Outcome of a guardrail pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardrailVerdict {
    Accepted,
    Rejected { reason: String },
}

impl GuardrailVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GuardrailVerdict::Accepted)
    }

    /// The rejection reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            GuardrailVerdict::Accepted => None,
            GuardrailVerdict::Rejected { reason } => Some(reason),
        }
    }
}

/// Validates a candidate report.
///
/// Order, first failure wins:
/// 1. each of Findings, Impression, Recommendations present and at least
///    10 characters after trimming, with a field-naming reason on failure;
/// 2. no forbidden low-confidence phrase in any field (lowercased);
/// 3. Findings asserting "normal" while Impression asserts "severe
///    pathology" is rejected as internally inconsistent. This is a literal
///    phrase heuristic, not clinical reasoning.
pub fn validate_report(report: &Report) -> GuardrailVerdict {
    for (name, value) in report.fields() {
        match value {
            None => {
                return GuardrailVerdict::Rejected {
                    reason: format!("Missing required field: {}", name),
                }
            }
            Some(text) if text.trim().len() < MIN_FIELD_LEN => {
                return GuardrailVerdict::Rejected {
                    reason: format!("Field '{}' is too short or invalid.", name),
                }
            }
            Some(_) => {}
        }
    }

    for (_, value) in report.fields() {
        let lowered = value.unwrap_or_default().to_lowercase();
        for phrase in FORBIDDEN_PHRASES {
            if lowered.contains(phrase) {
                return GuardrailVerdict::Rejected {
                    reason: format!(
                        "Report contains forbidden terms indicating high uncertainty: {}",
                        phrase
                    ),
                };
            }
        }
    }

    let findings = report.findings.as_deref().unwrap_or_default().to_lowercase();
    let impression = report
        .impression
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    if findings.contains("normal") && impression.contains("severe pathology") {
        return GuardrailVerdict::Rejected {
            reason: "Internal inconsistency detected between Findings and Impression."
                .to_string(),
        };
    }

    GuardrailVerdict::Accepted
}
