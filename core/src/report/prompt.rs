use crate::extraction::SafeMetadata;
use std::fmt::Write as _;

/// Base instruction sent with every report request. The attached image and
/// the delimited attribute block carry the study-specific content.
const SYSTEM_INSTRUCTION: &str = "\
You are an expert radiologist. Analyze the attached medical image together \
with the de-identified study attributes below.";

const FORMAT_INSTRUCTION: &str = "\
Produce a medical report as a single JSON object with exactly these three string fields:
- \"Findings\": detailed observations from the image and attributes
- \"Impression\": the final diagnostic impression
- \"Recommendations\": clinical follow-up recommendations

Use precise medical terminology and do not state anything the image or \
attributes cannot support.";

/// Builds the report-generation prompt.
///
/// The metadata is embedded as a delimited key/value block in stable order.
/// The optional reinforcement text is appended only on the guardrail-driven
/// regeneration pass and embeds the rejection reason.
pub fn build_prompt(metadata: &SafeMetadata, reinforcement: Option<&str>) -> String {
    let mut prompt = String::new();
    prompt.push_str(SYSTEM_INSTRUCTION);
    prompt.push_str("\n\nStudy attributes:\n---\n");
    for (name, value) in metadata.iter() {
        let _ = writeln!(prompt, "{}: {}", name, value);
    }
    prompt.push_str("---\n\n");
    prompt.push_str(FORMAT_INSTRUCTION);

    if let Some(reason) = reinforcement {
        let _ = write!(
            prompt,
            "\n\nYour previous report was rejected: {}\n\
             Regenerate the report and make sure every one of the three \
             fields is present with substantive clinical content.",
            reason
        );
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::extract_safe_metadata;
    use crate::extraction::tags::{BODY_PART_EXAMINED, MODALITY};
    use dicom_core::{DataElement, PrimitiveValue, VR};
    use dicom_object::InMemDicomObject;

    fn sample_metadata() -> SafeMetadata {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            MODALITY,
            VR::CS,
            PrimitiveValue::from("CT"),
        ));
        dcm.put(DataElement::new(
            BODY_PART_EXAMINED,
            VR::CS,
            PrimitiveValue::from("CHEST"),
        ));
        extract_safe_metadata(&dcm)
    }

    #[test]
    fn test_prompt_embeds_metadata_block() {
        let prompt = build_prompt(&sample_metadata(), None);
        assert!(prompt.contains("Modality: CT"));
        assert!(prompt.contains("BodyPartExamined: CHEST"));
        assert!(prompt.contains("---\n"));
    }

    #[test]
    fn test_prompt_names_all_three_fields() {
        let prompt = build_prompt(&sample_metadata(), None);
        assert!(prompt.contains("\"Findings\""));
        assert!(prompt.contains("\"Impression\""));
        assert!(prompt.contains("\"Recommendations\""));
        assert!(prompt.contains("single JSON object"));
    }

    #[test]
    fn test_reinforcement_appended_only_when_present() {
        let base = build_prompt(&sample_metadata(), None);
        assert!(!base.contains("rejected"));

        let reinforced = build_prompt(
            &sample_metadata(),
            Some("Missing required field: Recommendations"),
        );
        assert!(reinforced.contains("Missing required field: Recommendations"));
        assert!(reinforced.starts_with(&base));
    }
}
