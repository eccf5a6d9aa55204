//! Inflation-linked bond engine.

use fairval_core::schedule::coupon_dates;
use fairval_core::types::{Date, FlowType, ProjectedCashFlow, Security};

/// Projects the flows of an inflation-linked bond.
///
/// For each coupon date the notional is scaled by the most recent stored
/// index ratio at or before the date (default 1.0); the coupon is
/// `scaled_notional * coupon_rate / 100 / frequency`. The final date also
/// emits a redemption of the scaled notional.
#[must_use]
pub fn project(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    let dates = coupon_dates(
        security.issue_date,
        security.first_coupon_date,
        security.maturity_date,
        security.frequency,
    );
    let periods = f64::from(security.frequency.periods_per_year().max(1));

    let mut flows = Vec::with_capacity(dates.len() + 1);
    for date in &dates {
        let scaled_notional = security.face_value * security.index_ratio_at(*date);
        let coupon = scaled_notional * security.coupon_rate / 100.0 / periods;
        flows.push(ProjectedCashFlow::projected(
            security.id.clone(),
            *date,
            coupon,
            FlowType::Coupon,
            valuation_date,
        ));
    }

    let final_notional = security.face_value * security.index_ratio_at(security.maturity_date);
    flows.push(ProjectedCashFlow::projected(
        security.id.clone(),
        security.maturity_date,
        final_notional,
        FlowType::Redemption,
        valuation_date,
    ));

    flows.sort_by_key(|f| f.flow_date);
    flows
}
