use dicom_core::value::PrimitiveValue;
use dicom_object::InMemDicomObject;

use crate::error::InputError;
use crate::extraction::tags::{
    get_u16_value, BITS_ALLOCATED, COLUMNS, PIXEL_DATA, PIXEL_REPRESENTATION, ROWS,
};

/// One decoded frame of raw pixel samples, widened to f32 for the
/// normalization steps that follow.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<f32>,
}

/// Decodes the first frame of native pixel data from a dataset.
///
/// Multi-frame pixel data is handled by taking the leading `Rows * Columns`
/// samples (frame 0); trailing frames are ignored. Only native
/// (non-encapsulated) layouts with 8- or 16-bit samples are decoded; 16-bit
/// samples may arrive as raw little-endian byte pairs or as typed words, and
/// `PixelRepresentation == 1` reinterprets them as signed.
///
/// # Errors
///
/// - `MissingPixelData` when the dataset has no pixel data element
/// - `UnsupportedPixelFormat` for encapsulated data, missing geometry,
///   or bit depths other than 8/16
/// - `UnreadableDataset` when fewer samples than one frame are present
pub fn first_frame(dcm: &InMemDicomObject) -> Result<RawFrame, InputError> {
    let elem = dcm
        .element(PIXEL_DATA)
        .map_err(|_| InputError::MissingPixelData)?;

    let rows = get_u16_value(dcm, ROWS)
        .ok_or_else(|| InputError::UnsupportedPixelFormat("missing Rows".to_string()))?;
    let cols = get_u16_value(dcm, COLUMNS)
        .ok_or_else(|| InputError::UnsupportedPixelFormat("missing Columns".to_string()))?;
    let frame_len = rows as usize * cols as usize;
    if frame_len == 0 {
        return Err(InputError::UnsupportedPixelFormat(
            "zero-sized image geometry".to_string(),
        ));
    }

    let bits_allocated = get_u16_value(dcm, BITS_ALLOCATED).unwrap_or(16);
    let signed = get_u16_value(dcm, PIXEL_REPRESENTATION) == Some(1);

    let prim = elem.value().primitive().ok_or_else(|| {
        InputError::UnsupportedPixelFormat("encapsulated or non-native pixel data".to_string())
    })?;

    let mut samples: Vec<f32> = match prim {
        PrimitiveValue::U8(bytes) => match bits_allocated {
            8 if signed => bytes.iter().map(|&b| (b as i8) as f32).collect(),
            8 => bytes.iter().map(|&b| b as f32).collect(),
            16 => {
                if bytes.len() % 2 != 0 {
                    return Err(InputError::UnreadableDataset(
                        "odd byte count for 16-bit pixel samples".to_string(),
                    ));
                }
                bytes
                    .chunks_exact(2)
                    .map(|pair| {
                        let word = u16::from_le_bytes([pair[0], pair[1]]);
                        if signed {
                            (word as i16) as f32
                        } else {
                            word as f32
                        }
                    })
                    .collect()
            }
            other => {
                return Err(InputError::UnsupportedPixelFormat(format!(
                    "{} bits allocated",
                    other
                )))
            }
        },
        PrimitiveValue::U16(words) => words
            .iter()
            .map(|&w| if signed { (w as i16) as f32 } else { w as f32 })
            .collect(),
        PrimitiveValue::I16(words) => words.iter().map(|&w| w as f32).collect(),
        _ => {
            return Err(InputError::UnsupportedPixelFormat(
                "unexpected pixel data value type".to_string(),
            ))
        }
    };

    if samples.len() < frame_len {
        return Err(InputError::UnreadableDataset(format!(
            "pixel data holds {} samples, expected at least {} for one frame",
            samples.len(),
            frame_len
        )));
    }
    samples.truncate(frame_len);

    Ok(RawFrame {
        width: cols as u32,
        height: rows as u32,
        samples,
    })
}
