//! Canonical quantization of monetary and rate values
//!
//! Every consumer of the engine sees values at the same precision:
//! money at 2 decimal places, monthly IRR at 6, annual IRR at 4.
//! Rounding is half away from zero after a machine-epsilon nudge, so
//! binary representation error on values like 1.005 does not flip the result.

/// Round a monetary amount to cents
pub fn round_money(value: f64) -> f64 {
    round_to_scale(value, 100.0)
}

/// Round a periodic (monthly) rate to 6 decimal places
pub fn round_irr_monthly(value: f64) -> f64 {
    round_to_scale(value, 1e6)
}

/// Round an annualized rate to 4 decimal places
pub fn round_irr_annual(value: f64) -> f64 {
    round_to_scale(value, 1e4)
}

#[inline]
fn round_to_scale(value: f64, scale: f64) -> f64 {
    ((value + f64::EPSILON) * scale).round() / scale
}
