use crate::orchestrator::AnalysisOutcome;
use std::fmt;

/// Text report formatter for an analysis outcome
pub struct TextReport<'a> {
    outcome: &'a AnalysisOutcome,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(outcome: &'a AnalysisOutcome) -> Self {
        Self { outcome }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Result")?;
        writeln!(f, "===============")?;
        writeln!(f)?;
        writeln!(f, "Status:     {}", self.outcome.status)?;
        writeln!(f, "Model:      {}", self.outcome.model_version)?;
        writeln!(f, "Latency:    {} ms", self.outcome.latency_ms)?;
        writeln!(f, "Record:     #{}", self.outcome.record_id)?;
        if let Some(warning) = &self.outcome.warning {
            writeln!(f, "Warning:    {}", warning)?;
        }
        writeln!(f)?;

        writeln!(f, "Study Attributes")?;
        writeln!(f, "----------------")?;
        if self.outcome.metadata.is_empty() {
            writeln!(f, "(none present)")?;
        } else {
            for (name, value) in self.outcome.metadata.iter() {
                writeln!(f, "{}: {}", name, value)?;
            }
        }
        writeln!(f)?;

        for (name, value) in self.outcome.report.fields() {
            writeln!(f, "{}", name)?;
            writeln!(f, "{}", "-".repeat(name.len()))?;
            writeln!(f, "{}", value.unwrap_or("(not provided)"))?;
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{extract_safe_metadata, tags::MODALITY};
    use crate::orchestrator::AnalysisStatus;
    use crate::report::Report;
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_object::InMemDicomObject;

    #[test]
    fn test_text_report_format() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            MODALITY,
            VR::CS,
            PrimitiveValue::from("CT"),
        ));

        let outcome = AnalysisOutcome {
            record_id: 7,
            status: AnalysisStatus::Completed,
            metadata: extract_safe_metadata(&dcm),
            report: Report {
                findings: Some("Lungs are clear.".to_string()),
                impression: Some("No acute disease.".to_string()),
                recommendations: None,
            },
            image_base64: "QUJD".to_string(),
            warning: None,
            latency_ms: 850,
            model_version: "test-model".to_string(),
        };

        let output = format!("{}", TextReport::new(&outcome));

        assert!(output.contains("Analysis Result"));
        assert!(output.contains("Status:     completed"));
        assert!(output.contains("Latency:    850 ms"));
        assert!(output.contains("Record:     #7"));
        assert!(output.contains("Modality: CT"));
        assert!(output.contains("Lungs are clear."));
        assert!(output.contains("(not provided)"));
        assert!(!output.contains("Warning:"));
    }

    #[test]
    fn test_text_report_includes_warning() {
        let outcome = AnalysisOutcome {
            record_id: 1,
            status: AnalysisStatus::NeedsHumanReview,
            metadata: Default::default(),
            report: Report::default(),
            image_base64: String::new(),
            warning: Some("Guardrail validation failed after retry".to_string()),
            latency_ms: 10,
            model_version: "m".to_string(),
        };

        let output = format!("{}", TextReport::new(&outcome));
        assert!(output.contains("Status:     needs_human_review"));
        assert!(output.contains("Warning:    Guardrail validation failed after retry"));
    }
}
