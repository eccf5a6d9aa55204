//! Loan engine.
//!
//! Term, amortizing, and revolving loans are projected identically: the
//! explicit amortization schedule wins when present, otherwise an
//! equal-principal schedule is synthesised at the coupon frequency.

use fairval_core::schedule::coupon_dates;
use fairval_core::types::{Date, FlowType, ProjectedCashFlow, Security};

/// Projects the flows of a loan.
///
/// With an amortization schedule: one flow per row, `amount = principal +
/// interest`, typed `principal` when the row repays principal and
/// `interest` otherwise.
///
/// Without one: payment dates are generated at the coupon frequency and
/// each date carries an equal principal slice (`face / N`) plus an equal
/// interest slice (`face * coupon / 100 / N`), emitted as two flows.
#[must_use]
pub fn project(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    let mut flows = if security.amortization_schedule.is_empty() {
        synthesised(security, valuation_date)
    } else {
        scheduled(security, valuation_date)
    };
    flows.sort_by_key(|f| f.flow_date);
    flows
}

fn scheduled(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    security
        .amortization_schedule
        .iter()
        .map(|row| {
            let flow_type = if row.principal != 0.0 {
                FlowType::Principal
            } else {
                FlowType::Interest
            };
            ProjectedCashFlow::projected(
                security.id.clone(),
                row.date,
                row.principal + row.interest,
                flow_type,
                valuation_date,
            )
        })
        .collect()
}

fn synthesised(security: &Security, valuation_date: Date) -> Vec<ProjectedCashFlow> {
    let dates = coupon_dates(
        security.issue_date,
        security.first_coupon_date,
        security.maturity_date,
        security.frequency,
    );
    if dates.is_empty() {
        // Zero frequency: single principal repayment at maturity.
        return vec![ProjectedCashFlow::projected(
            security.id.clone(),
            security.maturity_date,
            security.face_value,
            FlowType::Principal,
            valuation_date,
        )];
    }

    let n = dates.len() as f64;
    let principal_slice = security.face_value / n;
    let interest_slice = security.face_value * security.coupon_rate / 100.0 / n;

    let mut flows = Vec::with_capacity(dates.len() * 2);
    for date in &dates {
        flows.push(ProjectedCashFlow::projected(
            security.id.clone(),
            *date,
            principal_slice,
            FlowType::Principal,
            valuation_date,
        ));
        flows.push(ProjectedCashFlow::projected(
            security.id.clone(),
            *date,
            interest_slice,
            FlowType::Interest,
            valuation_date,
        ));
    }
    flows
}
