use std::collections::BTreeMap;

use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use serde::{Deserialize, Serialize};

use super::tags::{
    get_string_value, BITS_ALLOCATED, BITS_STORED, BODY_PART_EXAMINED, COLUMNS, MANUFACTURER,
    MODALITY, PHOTOMETRIC_INTERPRETATION, PIXEL_REPRESENTATION, RESCALE_INTERCEPT, RESCALE_SLOPE,
    ROWS, SERIES_DESCRIPTION, STUDY_DATE, WINDOW_CENTER, WINDOW_WIDTH,
};

/// The fixed safelist of attributes allowed out of a dataset.
///
/// De-identification is allowlist-based: nothing outside this table is ever
/// read into the output, so new identifying tags upstream cannot leak.
pub const SAFE_TAGS: &[(&str, Tag)] = &[
    ("Modality", MODALITY),
    ("BodyPartExamined", BODY_PART_EXAMINED),
    ("StudyDate", STUDY_DATE),
    ("SeriesDescription", SERIES_DESCRIPTION),
    ("Manufacturer", MANUFACTURER),
    ("RescaleSlope", RESCALE_SLOPE),
    ("RescaleIntercept", RESCALE_INTERCEPT),
    ("WindowCenter", WINDOW_CENTER),
    ("WindowWidth", WINDOW_WIDTH),
    ("PhotometricInterpretation", PHOTOMETRIC_INTERPRETATION),
    ("Rows", ROWS),
    ("Columns", COLUMNS),
    ("BitsAllocated", BITS_ALLOCATED),
    ("BitsStored", BITS_STORED),
    ("PixelRepresentation", PIXEL_REPRESENTATION),
];

/// De-identified attribute set extracted from a dataset.
///
/// Maps safelisted tag names to their stringified values. Absent tags are
/// omitted rather than null-filled; callers treat absence as "unknown".
/// Immutable once built, and included verbatim in the returned result and
/// the persisted record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SafeMetadata(BTreeMap<String, String>);

impl SafeMetadata {
    /// Looks up a safelisted attribute by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the attribute was present in the source dataset
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of attributes captured
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no safelisted attribute was present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates attributes in stable (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Reduces a parsed dataset to its safelisted, non-identifying attributes.
///
/// Pure function over the dataset: for each safelisted tag that is present,
/// the value is stringified and copied; absent tags are skipped. Values that
/// fail string conversion are treated as absent.
pub fn extract_safe_metadata(dcm: &InMemDicomObject) -> SafeMetadata {
    let mut out = BTreeMap::new();
    for &(name, tag) in SAFE_TAGS {
        if let Some(value) = get_string_value(dcm, tag) {
            out.insert(name.to_string(), value);
        }
    }
    SafeMetadata(out)
}
