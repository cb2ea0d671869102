//! Global min/max normalization and the contrast/brightness transform.
//!
//! All functions are pure: the image side is always re-normalized from the
//! raw value map, never from a previously normalized one.

/// Rescale every value of every vector onto [0, 1] using the single global
/// minimum and maximum of the whole set.
///
/// A set whose maximum is zero, or whose values are all equal, is returned
/// unchanged.
pub fn normalize(vectors: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let (min, max) = vectors
        .iter()
        .flatten()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if max <= 0.0 || min == max {
        return vectors.to_vec();
    }

    let range = max - min;
    vectors
        .iter()
        .map(|v| v.iter().map(|&x| (x - min) / range).collect())
        .collect()
}

/// `(contrast + 1) * (v - 0.5) + 0.5 + brightness`, left unclamped.
pub fn adjust_tone(vectors: &[Vec<f32>], contrast: f32, brightness: f32) -> Vec<Vec<f32>> {
    let gain = contrast + 1.0;
    vectors
        .iter()
        .map(|v| v.iter().map(|&x| gain * (x - 0.5) + 0.5 + brightness).collect())
        .collect()
}

/// Image-side normalization: global rescale followed by the tone transform.
pub fn normalize_values(values: &[Vec<f32>], contrast: f32, brightness: f32) -> Vec<Vec<f32>> {
    adjust_tone(&normalize(values), contrast, brightness)
}
