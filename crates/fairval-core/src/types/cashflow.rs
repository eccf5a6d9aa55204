//! Projected and realized cash flows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Date, SecurityId};

/// Type of cash flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    /// Periodic coupon payment
    Coupon,
    /// Scheduled principal repayment (amortizing)
    Principal,
    /// Interest portion of a loan payment
    Interest,
    /// Final redemption of face value
    Redemption,
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowType::Coupon => "coupon",
            FlowType::Principal => "principal",
            FlowType::Interest => "interest",
            FlowType::Redemption => "redemption",
        };
        write!(f, "{name}")
    }
}

/// Payment status of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Expected future payment.
    #[default]
    Projected,
    /// Payment received.
    Paid,
    /// Payment missed; issuer defaulted.
    Defaulted,
    /// Partial recovery received after default.
    Recovered,
}

/// A single future or realized payment.
///
/// Realized/defaulted status is persisted; projected flows are reproducible
/// from the security, so generated flows never overwrite stored ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCashFlow {
    /// Security the flow belongs to.
    pub security_id: SecurityId,
    /// Payment date.
    pub flow_date: Date,
    /// Payment amount.
    pub amount: f64,
    /// Flow type.
    pub flow_type: FlowType,
    /// Whether the flow date is on or before the valuation date.
    pub is_realized: bool,
    /// Whether the payment defaulted.
    pub is_defaulted: bool,
    /// Date of default, when defaulted.
    pub default_date: Option<Date>,
    /// Amount recovered after default, if any.
    pub recovery_amount: Option<f64>,
    /// Payment status.
    pub payment_status: PaymentStatus,
}

impl ProjectedCashFlow {
    /// Creates a projected flow, marking it realized (and `Paid`) when the
    /// flow date is on or before `valuation_date`.
    #[must_use]
    pub fn projected(
        security_id: SecurityId,
        flow_date: Date,
        amount: f64,
        flow_type: FlowType,
        valuation_date: Date,
    ) -> Self {
        let is_realized = flow_date <= valuation_date;
        Self {
            security_id,
            flow_date,
            amount,
            flow_type,
            is_realized,
            is_defaulted: false,
            default_date: None,
            recovery_amount: None,
            payment_status: if is_realized {
                PaymentStatus::Paid
            } else {
                PaymentStatus::Projected
            },
        }
    }

    /// True when this flow matches `other` on the `(date, type, amount)`
    /// merge key. Amounts compare within 1e-9 absolute.
    #[must_use]
    pub fn same_payment(&self, other: &ProjectedCashFlow) -> bool {
        self.flow_date == other.flow_date
            && self.flow_type == other.flow_type
            && (self.amount - other.amount).abs() <= 1e-9
    }
}

/// Summary of a projected flow list, computed by the projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    /// Total number of flows.
    pub total: usize,
    /// Flows on or before the valuation date.
    pub past: usize,
    /// Flows after the valuation date.
    pub future: usize,
    /// Defaulted flows.
    pub defaulted: usize,
    /// Realized flows.
    pub realized: usize,
    /// Date of the next future payment, if any.
    pub next_payment: Option<Date>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_projected_realization() {
        let id = SecurityId::new("S");
        let past = ProjectedCashFlow::projected(
            id.clone(),
            d(2023, 1, 1),
            2.5,
            FlowType::Coupon,
            d(2023, 6, 1),
        );
        assert!(past.is_realized);
        assert_eq!(past.payment_status, PaymentStatus::Paid);

        let future =
            ProjectedCashFlow::projected(id, d(2024, 1, 1), 2.5, FlowType::Coupon, d(2023, 6, 1));
        assert!(!future.is_realized);
        assert_eq!(future.payment_status, PaymentStatus::Projected);
    }

    #[test]
    fn test_same_payment_key() {
        let id = SecurityId::new("S");
        let a = ProjectedCashFlow::projected(
            id.clone(),
            d(2024, 1, 1),
            2.5,
            FlowType::Coupon,
            d(2023, 1, 1),
        );
        let mut b = a.clone();
        assert!(a.same_payment(&b));
        b.amount = 2.6;
        assert!(!a.same_payment(&b));
        b.amount = 2.5;
        b.flow_type = FlowType::Redemption;
        assert!(!a.same_payment(&b));
    }
}
