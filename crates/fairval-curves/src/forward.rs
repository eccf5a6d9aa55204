//! Forward-rate derivation and spread application.

use crate::error::{CurveError, CurveResult};

/// Implied forward rate between two zero rates.
///
/// Given `r1` at `t1` years and `r2` at `t2` years (`t2 > t1`):
///
/// ```text
/// f = ((1 + r2)^t2 / (1 + r1)^t1)^(1 / (t2 - t1)) - 1
/// ```
///
/// # Errors
///
/// Returns `CurveError::InvalidForwardInterval` when `t2 <= t1`.
pub fn forward_rate(r1: f64, t1: f64, r2: f64, t2: f64) -> CurveResult<f64> {
    if t2 <= t1 {
        return Err(CurveError::InvalidForwardInterval { t1, t2 });
    }
    let growth = (1.0 + r2).powf(t2) / (1.0 + r1).powf(t1);
    Ok(growth.powf(1.0 / (t2 - t1)) - 1.0)
}

/// Adds a basis-point spread to a decimal rate.
#[must_use]
pub fn apply_spread_bps(rate: f64, spread_bps: f64) -> f64 {
    rate + spread_bps / 10_000.0
}
