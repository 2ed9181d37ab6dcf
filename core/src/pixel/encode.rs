use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

/// Quality used for the lossy preview encoding
pub const JPEG_QUALITY: u8 = 85;

/// Encodes an 8-bit grayscale raster as a JPEG byte stream.
///
/// # Errors
///
/// Returns an error if the buffer length does not match the stated
/// dimensions.
pub fn encode_jpeg(gray: &[u8], width: u32, height: u32) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.write_image(gray, width, height, ExtendedColorType::L8)?;
    Ok(out)
}

/// Standard base64 text encoding of an encoded image
pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
