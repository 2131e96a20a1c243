//! Per-unknown scaling and scaled norms.

use nalgebra::DVector;

pub const MIN_SCALE: f64 = 1e-7;
pub const MAX_SCALE: f64 = 1e7;

/// `clamp(1/(|y| + band), 1e-7, 1e7)` for every component.
pub fn value_scaling(y: &DVector<f64>, band: f64) -> DVector<f64> {
    y.map(|v| (1.0 / (v.abs() + band)).clamp(MIN_SCALE, MAX_SCALE))
}

/// `max |scale_i·v_i|`.
pub fn scaled_max_norm(v: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    v.iter()
        .zip(scale.iter())
        .map(|(x, s)| (x * s).abs())
        .fold(0.0, f64::max)
}

/// `0.5·Σ (scale_i·v_i)²`, the merit function of the line search.
pub fn scaled_merit(v: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    0.5 * v
        .iter()
        .zip(scale.iter())
        .map(|(x, s)| (x * s).powi(2))
        .sum::<f64>()
}
