pub mod generator;
pub mod model;
pub mod prompt;

use serde::{Deserialize, Serialize};

pub use generator::{generate_report, GeneratedReport, RetryPolicy};
pub use model::{GroqClient, ModelResponse, VisionModel};

/// A structured diagnostic report produced by the vision model.
///
/// The three fields are required for an accepted report, but are optional
/// here so that presence checking belongs to the guardrail validator rather
/// than the deserializer: a response missing a field still parses, then
/// fails validation with a field-specific reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "Findings", default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,

    #[serde(rename = "Impression", default, skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,

    #[serde(
        rename = "Recommendations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recommendations: Option<String>,
}

impl Report {
    /// The three required fields with their wire names, in validation order
    pub fn fields(&self) -> [(&'static str, Option<&str>); 3] {
        [
            ("Findings", self.findings.as_deref()),
            ("Impression", self.impression.as_deref()),
            ("Recommendations", self.recommendations.as_deref()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_deserializes_with_missing_fields() {
        let report: Report = serde_json::from_str(r#"{"Findings": "Clear lungs."}"#).unwrap();
        assert_eq!(report.findings.as_deref(), Some("Clear lungs."));
        assert!(report.impression.is_none());
        assert!(report.recommendations.is_none());
    }

    #[test]
    fn test_report_serializes_with_wire_names() {
        let report = Report {
            findings: Some("f".to_string()),
            impression: Some("i".to_string()),
            recommendations: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["Findings"], "f");
        assert_eq!(json["Impression"], "i");
        assert!(json.get("Recommendations").is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let report: Report =
            serde_json::from_str(r#"{"Findings": "x", "Confidence": 0.3}"#).unwrap();
        assert_eq!(report.findings.as_deref(), Some("x"));
    }
}
