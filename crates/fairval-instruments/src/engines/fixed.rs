//! Fixed-coupon bond engine.

use fairval_core::schedule::coupon_dates;
use fairval_core::types::{Date, FlowType, ProjectedCashFlow, Security};

use super::zero;

/// Projects the flows of a fixed-coupon bond.
///
/// Periodic coupon = `coupon * face / (100 * frequency)` on each generated
/// coupon date, plus a separate redemption of face value at maturity.
/// Zero-frequency or zero-coupon securities delegate to the zero-coupon
/// engine.
#[must_use]
pub fn project(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    if security.frequency.is_zero() || security.coupon_rate == 0.0 {
        return zero::project(security, valuation_date);
    }

    let dates = coupon_dates(
        security.issue_date,
        security.first_coupon_date,
        security.maturity_date,
        security.frequency,
    );
    let coupon = security.coupon_rate * security.face_value
        / (100.0 * f64::from(security.frequency.periods_per_year()));

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
