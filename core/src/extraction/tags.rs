use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use regex::Regex;
use std::sync::OnceLock;

// Core Image Tags
pub const MODALITY: Tag = Tag(0x0008, 0x0060);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);

// Image Geometry Tags
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
pub const PIXEL_REPRESENTATION: Tag = Tag(0x0028, 0x0103);

// Pixel Transform Tags
pub const RESCALE_INTERCEPT: Tag = Tag(0x0028, 0x1052);
pub const RESCALE_SLOPE: Tag = Tag(0x0028, 0x1053);
pub const WINDOW_CENTER: Tag = Tag(0x0028, 0x1050);
pub const WINDOW_WIDTH: Tag = Tag(0x0028, 0x1051);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

// Anatomical Tags
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);

// Device/Manufacturer Tags
pub const MANUFACTURER: Tag = Tag(0x0008, 0x0070);

// Study/Series Tags
pub const STUDY_DATE: Tag = Tag(0x0008, 0x0020);
pub const SERIES_DESCRIPTION: Tag = Tag(0x0008, 0x103E);

// Patient Tags: identifying attributes that must never be copied out.
// Defined here so tests can assert they are excluded by construction.
pub const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);
pub const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
pub const PATIENT_BIRTH_DATE: Tag = Tag(0x0010, 0x0030);

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

/// Helper to get u16 value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u16
pub fn get_u16_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u16> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u16>().ok())
}

/// Helper to get the first numeric value of a possibly multi-valued tag
///
/// DICOM decimal string fields (rescale slope/intercept, window center/width)
/// may carry several backslash-separated values. The normalization rule is
/// explicit: the first value wins. Accepts plain, backslash-separated, and
/// exponential-notation renderings.
///
/// Returns `None` if the tag is not present or no number can be found.
pub fn get_first_decimal(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
    });

    let raw = get_string_value(dcm, tag)?;
    re.find(&raw).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_core::{DataElement, PrimitiveValue, VR};

    #[test]
    fn test_tag_values() {
        // Just ensure tags are correctly defined
        assert_eq!(MODALITY, Tag(0x0008, 0x0060));
        assert_eq!(PHOTOMETRIC_INTERPRETATION, Tag(0x0028, 0x0004));
        assert_eq!(RESCALE_SLOPE, Tag(0x0028, 0x1053));
        assert_eq!(WINDOW_CENTER, Tag(0x0028, 0x1050));
        assert_eq!(PIXEL_DATA, Tag(0x7FE0, 0x0010));
        assert_eq!(PATIENT_NAME, Tag(0x0010, 0x0010));
    }

    #[test]
    fn test_get_first_decimal_single_value() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            RESCALE_SLOPE,
            VR::DS,
            PrimitiveValue::from("1.5"),
        ));
        assert_eq!(get_first_decimal(&dcm, RESCALE_SLOPE), Some(1.5));
    }

    #[test]
    fn test_get_first_decimal_multi_value_takes_first() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from("40\\400"),
        ));
        assert_eq!(get_first_decimal(&dcm, WINDOW_CENTER), Some(40.0));
    }

    #[test]
    fn test_get_first_decimal_exponential_notation() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            RESCALE_INTERCEPT,
            VR::DS,
            PrimitiveValue::from("-1.024e3"),
        ));
        assert_eq!(get_first_decimal(&dcm, RESCALE_INTERCEPT), Some(-1024.0));
    }

    #[test]
    fn test_get_first_decimal_absent_tag() {
        let dcm = InMemDicomObject::new_empty();
        assert_eq!(get_first_decimal(&dcm, WINDOW_WIDTH), None);
    }

    #[test]
    fn test_get_string_value_trims() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(
            MODALITY,
            VR::CS,
            PrimitiveValue::from("CT "),
        ));
        assert_eq!(get_string_value(&dcm, MODALITY), Some("CT".to_string()));
    }
}
