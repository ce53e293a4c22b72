//! Fixed-point math utilities for deterministic simulation.
//!
//! Every amount, rate and multiplier in the economy is fixed-point so a
//! tick produces bit-identical results on every platform. Floats only
//! appear at the data boundary, where catalog and config files are
//! converted once at load time.

use fixed::types::I32F32;

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Convert a decimal literal from a data file into fixed-point.
///
/// Returns `None` for NaN, infinities and values outside the `Fixed` range.
#[must_use]
pub fn from_decimal(value: f64) -> Option<Fixed> {
    if value.is_finite() {
        Fixed::checked_from_num(value)
    } else {
        None
    }
}

/// Convert a fixed-point value to `f64` for display and reports.
#[must_use]
pub fn to_decimal(value: Fixed) -> f64 {
    value.to_num::<f64>()
}

/// Scale `value` by a percentage (e.g. 15 for +15%).
#[must_use]
pub fn percent_of(value: Fixed, percent: i32) -> Fixed {
    value.saturating_mul(Fixed::from_num(percent)) / Fixed::from_num(100)
}

/// Ratio `numerator / denominator` clamped to `[0, 1]`.
///
/// A non-positive denominator yields one: nothing is required, so nothing
/// is throttled.
#[must_use]
pub fn unit_ratio(numerator: Fixed, denominator: Fixed) -> Fixed {
    if denominator <= Fixed::ZERO {
        return Fixed::ONE;
    }
    numerator
        .checked_div(denominator)
        .unwrap_or(Fixed::ONE)
        .clamp(Fixed::ZERO, Fixed::ONE)
}
