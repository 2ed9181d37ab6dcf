//! Normalization steps applied to a decoded frame, in pipeline order:
//! rescale, photometric inversion, optional windowing, 8-bit mapping.
//! Each step is total, with defined behavior on empty and degenerate input.

/// Applies the modality rescale transform `v' = v * slope + intercept`.
///
/// Callers default slope to 1.0 and intercept to 0.0 when the tags are
/// absent.
pub fn apply_rescale(samples: &mut [f32], slope: f32, intercept: f32) {
    for v in samples.iter_mut() {
        *v = *v * slope + intercept;
    }
}

/// Whether the photometric interpretation is the inverted grayscale
/// convention (MONOCHROME1), matched case-insensitively.
pub fn is_inverted_grayscale(photometric: Option<&str>) -> bool {
    photometric
        .map(|p| p.trim().eq_ignore_ascii_case("MONOCHROME1"))
        .unwrap_or(false)
}

/// Inverts sample values against the global maximum: `v' = max - v`.
///
/// No-op on an empty frame.
pub fn invert(samples: &mut [f32]) {
    let Some(max) = fold_max(samples) else {
        return;
    };
    for v in samples.iter_mut() {
        *v = max - *v;
    }
}

/// Clips sample values to the display window `[c - w/2, c + w/2]`.
///
/// Callers skip this step entirely when either center or width is absent;
/// no default window is invented.
pub fn apply_window(samples: &mut [f32], center: f32, width: f32) {
    let lo = center - width / 2.0;
    let hi = center + width / 2.0;
    for v in samples.iter_mut() {
        *v = v.max(lo).min(hi);
    }
}

/// Linearly maps the sample value range onto [0, 255].
///
/// A degenerate range (max == min, including a constant or single-pixel
/// image) produces all zeros rather than dividing by zero.
pub fn to_eight_bit(samples: &[f32]) -> Vec<u8> {
    let (Some(min), Some(max)) = (fold_min(samples), fold_max(samples)) else {
        return Vec::new();
    };
    let range = max - min;
    if range <= 0.0 {
        return vec![0u8; samples.len()];
    }
    samples
        .iter()
        .map(|&v| ((v - min) / range * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn fold_min(samples: &[f32]) -> Option<f32> {
    samples.iter().copied().reduce(f32::min)
}

fn fold_max(samples: &[f32]) -> Option<f32> {
    samples.iter().copied().reduce(f32::max)
}
