//! Utility functions for numeric conversion and image handling.

pub mod image_ops;
pub mod safe_cast;

/// Round `value` to `decimals` decimal places, half away from zero
#[must_use]
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
