//! Floating-rate bond engine.
//!
//! Coupons are approximated from the latest stored reference-rate fixing
//! plus the contractual spread; forward projection from the composite curve
//! is a policy decision left to a replacement engine behind the same
//! dispatch seam.

use fairval_core::schedule::coupon_dates;
use fairval_core::types::{Date, FlowType, ProjectedCashFlow, Security};

/// Projects the flows of a floating-rate bond.
///
/// Each coupon uses `(reference_rate_snapshot + spread) / 100` over the
/// notional, divided by the frequency, with the floor and cap clamping the
/// effective rate when present. The final coupon date also emits a
/// redemption of face value. A missing snapshot falls back to the stored
/// coupon rate.
#[must_use]
pub fn project(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    let dates = coupon_dates(
        security.issue_date,
        security.first_coupon_date,
        security.maturity_date,
        security.frequency,
    );

    let snapshot = security
        .reference_rate_snapshot
        .unwrap_or(security.coupon_rate);
    let mut effective = snapshot + security.reference_spread.unwrap_or(0.0);
    if let Some(floor) = security.rate_floor {
        effective = effective.max(floor);
    }
    if let Some(cap) = security.rate_cap {
        effective = effective.min(cap);
    }

    let periods = f64::from(security.frequency.periods_per_year().max(1));
    let coupon = security.face_value * effective / 100.0 / periods;

    let mut flows: Vec<ProjectedCashFlow> = dates
        .iter()
        .map(|date| {
            ProjectedCashFlow::projected(
                security.id.clone(),
                *date,
                coupon,
                FlowType::Coupon,
                valuation_date,
            )
        })
        .collect();

    flows.push(ProjectedCashFlow::projected(
        security.id.clone(),
        security.maturity_date,
        security.face_value,
        FlowType::Redemption,
        valuation_date,
    ));

    flows.sort_by_key(|f| f.flow_date);
    flows
}
