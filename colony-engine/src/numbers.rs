//! Numeric helpers centralizing guarded ratios and safe casts.
//!
//! Every division in the breeding/mortality math routes through these so a
//! zero denominator yields a defined neutral value instead of a NaN that
//! propagates through the history.

use num_traits::cast::cast;

/// Divide `numerator` by `denominator`, returning 0.0 when the denominator
/// is zero or either operand is non-finite.
#[must_use]
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// Convert a percentage in [0, 100] to a fraction clamped to [0, 1].
#[must_use]
pub fn pct_to_fraction(pct: f64) -> f64 {
    if !pct.is_finite() {
        return 0.0;
    }
    (pct / 100.0).clamp(0.0, 1.0)
}

/// Floor a fractional index into a usize, returning 0 for negative or
/// non-finite values.
#[must_use]
pub fn floor_to_index(value: f64) -> usize {
    if !value.is_finite() || value < 0.0 {
        return 0;
    }
    cast::<f64, usize>(value.floor()).unwrap_or(usize::MAX)
}
