//! Duration and convexity over emitted discount steps.

use fairval_core::types::DiscountStepData;

/// Macaulay duration: PV-weighted average time to cash flow, in years.
///
/// Returns 0 when the total present value is 0.
#[must_use]
pub fn macaulay_duration(steps: &[DiscountStepData]) -> f64 {
    let pv: f64 = steps.iter().map(|s| s.present_value).sum();
    if pv == 0.0 {
        return 0.0;
    }
    let weighted: f64 = steps.iter().map(|s| s.years * s.present_value).sum();
    weighted / pv
}

/// Convexity proxy: `sum(pv * years * (years + 1)) / PV`.
///
/// Returns 0 when the total present value is 0.
#[must_use]
pub fn convexity(steps: &[DiscountStepData]) -> f64 {
    let pv: f64 = steps.iter().map(|s| s.present_value).sum();
    if pv == 0.0 {
        return 0.0;
    }
    let weighted: f64 = steps
        .iter()
        .map(|s| s.present_value * s.years * (s.years + 1.0))
        .sum();
    weighted / pv
}
