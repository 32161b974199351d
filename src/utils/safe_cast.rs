//! Numeric conversions between percentage space and pixel space

/// Truncate toward zero into an `i64` pixel coordinate
///
/// NaN maps to 0 and out-of-range values saturate.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Truncation toward zero is the contract
pub fn f64_to_i64_trunc(value: f64) -> i64 {
    value as i64
}

/// Clamp an `i64` into `u32` range
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped before the cast
pub fn i64_to_u32_clamp(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// Clamp and truncate an `f64` into `[min, max]`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamping ensures safe truncation
pub fn f64_to_u32_clamp(value: f64, min: u32, max: u32) -> u32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    (value.clamp(f64::from(min), f64::from(max)) as u32).clamp(min, max)
}

/// Clamp an `i64` into `i32` range
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamped before the cast
pub fn i64_to_i32_clamp(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
