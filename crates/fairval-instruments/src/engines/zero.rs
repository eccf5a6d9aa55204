//! Zero-coupon bond engine.

use fairval_core::types::{Date, FlowType, ProjectedCashFlow, Security};

/// Projects the single redemption flow of a zero-coupon bond.
#[must_use]
pub fn project(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    vec![ProjectedCashFlow::projected(
        security.id.clone(),
        security.maturity_date,
        security.face_value,
        FlowType::Redemption,
        valuation_date,
    )]
}
