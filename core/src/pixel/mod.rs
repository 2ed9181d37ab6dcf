//! Pixel normalization pipeline: decode the first frame, apply the modality
//! rescale, photometric inversion and optional display window, map to 8-bit,
//! and encode as a base64 JPEG preview.

pub mod decode;
pub mod encode;
pub mod normalize;

use dicom_object::InMemDicomObject;

use crate::error::Result;
use crate::extraction::tags::{
    get_first_decimal, get_string_value, PHOTOMETRIC_INTERPRETATION, RESCALE_INTERCEPT,
    RESCALE_SLOPE, WINDOW_CENTER, WINDOW_WIDTH,
};

/// An 8-bit single-channel preview rendered from a dataset's pixel data.
///
/// Pixel values are bounded to [0, 255] by construction.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    /// Lossy-compressed single-frame image
    pub jpeg: Vec<u8>,
    /// Base64 text encoding of `jpeg`
    pub base64: String,
}

/// Runs the full normalization pipeline over a parsed dataset.
///
/// Steps, in order: first-frame decode, rescale (slope default 1.0,
/// intercept 0.0), MONOCHROME1 inversion, windowing (only when both center
/// and width are present; first value wins on multi-valued fields), linear
/// 8-bit mapping, JPEG + base64 encode.
///
/// Synchronous and CPU-bound; callers run it off the request task.
pub fn render_preview(dcm: &InMemDicomObject) -> Result<NormalizedImage> {
    let frame = decode::first_frame(dcm)?;
    let mut samples = frame.samples;

    let slope = get_first_decimal(dcm, RESCALE_SLOPE).unwrap_or(1.0);
    let intercept = get_first_decimal(dcm, RESCALE_INTERCEPT).unwrap_or(0.0);
    normalize::apply_rescale(&mut samples, slope as f32, intercept as f32);

    let photometric = get_string_value(dcm, PHOTOMETRIC_INTERPRETATION);
    if normalize::is_inverted_grayscale(photometric.as_deref()) {
        normalize::invert(&mut samples);
    }

    let center = get_first_decimal(dcm, WINDOW_CENTER);
    let width = get_first_decimal(dcm, WINDOW_WIDTH);
    if let (Some(c), Some(w)) = (center, width) {
        normalize::apply_window(&mut samples, c as f32, w as f32);
    }

    let gray = normalize::to_eight_bit(&samples);
    let jpeg = encode::encode_jpeg(&gray, frame.width, frame.height)?;
    let base64 = encode::to_base64(&jpeg);

    Ok(NormalizedImage {
        width: frame.width,
        height: frame.height,
        jpeg,
        base64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::tags::{BITS_ALLOCATED, COLUMNS, PIXEL_DATA, ROWS};
    use dicom_core::{DataElement, PrimitiveValue, VR};

    fn dataset_with_pixels(values: Vec<u16>, rows: u16, cols: u16) -> InMemDicomObject {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(ROWS, VR::US, PrimitiveValue::from(rows)));
        dcm.put(DataElement::new(COLUMNS, VR::US, PrimitiveValue::from(cols)));
        dcm.put(DataElement::new(
            BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(16u16),
        ));
        dcm.put(DataElement::new(
            PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(values.into()),
        ));
        dcm
    }

    #[test]
    fn test_render_preview_produces_base64_jpeg() {
        let dcm = dataset_with_pixels(vec![0, 1000, 2000, 4000], 2, 2);
        let image = render_preview(&dcm).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        assert_eq!(&image.jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(image.base64, encode::to_base64(&image.jpeg));
    }

    #[test]
    fn test_render_preview_constant_image_is_valid() {
        // Degenerate pixel range must not error; the preview is all zeros
        let dcm = dataset_with_pixels(vec![500; 4], 2, 2);
        let image = render_preview(&dcm).unwrap();
        assert_eq!(&image.jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_render_preview_missing_pixels_fails_fast() {
        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(DataElement::new(ROWS, VR::US, PrimitiveValue::from(2u16)));
        dcm.put(DataElement::new(COLUMNS, VR::US, PrimitiveValue::from(2u16)));
        let err = render_preview(&dcm).unwrap_err();
        assert!(err.to_string().contains("no pixel data"));
    }

    #[test]
    fn test_window_applied_only_when_both_values_present() {
        // Center without width: the window step is skipped, so the full
        // range maps to [0, 255] and the maximum sample stays at 255.
        let mut dcm = dataset_with_pixels(vec![0, 100, 200, 4000], 2, 2);
        dcm.put(DataElement::new(
            WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from("100"),
        ));
        let skipped = render_preview(&dcm).unwrap();

        dcm.put(DataElement::new(
            WINDOW_WIDTH,
            VR::DS,
            PrimitiveValue::from("200"),
        ));
        let windowed = render_preview(&dcm).unwrap();

        // With the window [0, 200] applied, the outlier at 4000 is clipped
        // to the same display value as 200, changing the encoded image.
        assert_ne!(skipped.jpeg, windowed.jpeg);
    }

    #[test]
    fn test_rescale_values_from_multi_valued_fields() {
        let mut dcm = dataset_with_pixels(vec![0, 10, 20, 30], 2, 2);
        dcm.put(DataElement::new(
            RESCALE_SLOPE,
            VR::DS,
            PrimitiveValue::from("2.0\\9.0"),
        ));
        // First value wins; pipeline must not error on the second
        let image = render_preview(&dcm).unwrap();
        assert_eq!(&image.jpeg[..2], &[0xFF, 0xD8]);
    }
}
