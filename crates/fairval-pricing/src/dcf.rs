//! Discounted cash-flow fair-value engine.
//!
//! Takes a security, its merged flow list, and a composite curve; emits one
//! auditable discount step per future flow plus the headline numbers
//! (present value, accrued, dirty value, unrealized G/L) and risk metrics.

use serde::{Deserialize, Serialize};
use tracing::debug;

use fairval_core::schedule;
use fairval_core::types::{Date, DiscountStepData, ProjectedCashFlow, Security};
use fairval_curves::composite::{CompositeCurve, CurveSetup};

use crate::metrics;
use crate::ytm;

/// Inputs to a single-security valuation.
#[derive(Debug, Clone, Copy)]
pub struct ValuationInput<'a> {
    /// The security being valued.
    pub security: &'a Security,
    /// Merged flow list, sorted chronologically.
    pub flows: &'a [ProjectedCashFlow],
    /// Composite discount curve.
    pub curve: &'a CompositeCurve,
    /// Valuation date.
    pub valuation_date: Date,
    /// Book value, when known.
    pub book_value: Option<f64>,
    /// Whether to compute accrued interest.
    pub include_accrued: bool,
}

/// Risk metrics of a valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationMetrics {
    /// Macaulay duration in years.
    pub duration: f64,
    /// Convexity proxy.
    pub convexity: f64,
    /// Yield to maturity, when solvable.
    pub ytm: Option<f64>,
}

/// Output of a single-security valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationOutput {
    /// Sum of discounted future flows.
    pub present_value: f64,
    /// Accrued interest at the valuation date.
    pub accrued_interest: f64,
    /// Present value plus accrued.
    pub dirty_value: f64,
    /// Dirty value minus book value (0 when book unknown).
    pub unrealized_gain_loss: f64,
    /// Duration, convexity, and YTM.
    pub metrics: ValuationMetrics,
    /// One discount step per future flow, in flow order.
    pub steps: Vec<DiscountStepData>,
    /// Snapshot of the curves the valuation used.
    pub curve_setup: CurveSetup,
}

/// Discount factor for a rate and year fraction: `1 / (1 + rate)^years`,
/// with `years <= 0` mapping to 1.
#[must_use]
pub fn discount_factor(rate: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return 1.0;
    }
    1.0 / (1.0 + rate).powf(years)
}

/// Values a security against a composite curve.
///
/// Only flows with `years > 0` under ACT/365 participate in the present
/// value; past flows feed nothing here but remain visible to accrued
/// interest through the coupon schedule. Accrued applies to coupon-bearing
/// bond families only.
#[must_use]
pub fn value(input: &ValuationInput<'_>) -> ValuationOutput {
    let mut steps = Vec::new();

    for flow in input.flows {
        let resolved = input.curve.resolve(input.valuation_date, flow.flow_date);
        if resolved.years <= 0.0 {
            continue;
        }
        let df = discount_factor(resolved.rate, resolved.years);
        steps.push(DiscountStepData {
            flow_date: flow.flow_date,
            tenor: resolved.tenor,
            years: resolved.years,
            cash_flow: flow.amount,
            benchmark_rate: resolved.benchmark_rate,
            spread_rate: resolved.spread_rate,
            discount_rate: resolved.rate,
            discount_factor: df,
            present_value: flow.amount * df,
        });
    }

    let present_value: f64 = steps.iter().map(|s| s.present_value).sum();

    let accrued_interest = if input.include_accrued && input.security.instrument_type.is_bond() {
        schedule::accrued_interest(input.security, input.valuation_date)
    } else {
        0.0
    };

    let dirty_value = present_value + accrued_interest;
    let unrealized_gain_loss = input.book_value.map_or(0.0, |book| dirty_value - book);

    let metrics = ValuationMetrics {
        duration: metrics::macaulay_duration(&steps),
        convexity: metrics::convexity(&steps),
        ytm: ytm::yield_to_maturity(input.security, present_value, input.valuation_date),
    };

    debug!(
        security = %input.security.id,
        pv = present_value,
        accrued = accrued_interest,
        steps = steps.len(),
        "valued security"
    );

    ValuationOutput {
        present_value,
        accrued_interest,
        dirty_value,
        unrealized_gain_loss,
        metrics,
        steps,
        curve_setup: input.curve.setup.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::collections::BTreeMap;

    use fairval_core::daycounts::DayCountConvention;
    use fairval_core::types::{
        Currency, Curve, CurvePoint, CurveSource, CurveType, Frequency, InstrumentType,
    };
    use fairval_instruments::engines::{fixed, zero};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn flat_curve(rate: f64) -> CompositeCurve {
        let curve = Curve {
            name: "FLAT".into(),
            curve_date: d(2023, 1, 15),
            source: CurveSource::Manual,
            currency: Currency::USD,
            curve_type: CurveType::Zero,
            points: vec![CurvePoint::from_years(10.0, rate)],
        };
        CompositeCurve::build(&curve, None, &BTreeMap::new()).unwrap()
    }

    /// Fixed semi-annual 5% bond, face 100, 2020-01-15 to 2025-01-15.
    fn fixed_bond() -> Security {
        Security::new(
            "S1",
            "5% 2025",
            InstrumentType::BondFixed,
            Currency::USD,
            DayCountConvention::Thirty360US,
            5.0,
            Frequency::SemiAnnual,
            d(2020, 1, 15),
            d(2025, 1, 15),
            100.0,
        )
    }

    #[test]
    fn test_fixed_bond_flat_curve() {
        let security = fixed_bond();
        let valuation_date = d(2023, 1, 15);
        let flows = fixed::project(&security, valuation_date);
        let curve = flat_curve(0.05);

        let output = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: true,
        });

        // Four future coupons of 2.50 plus the redemption.
        assert_eq!(output.steps.len(), 5);
        let expected: f64 = output
            .steps
            .iter()
            .map(|s| s.cash_flow * discount_factor(0.05, s.years))
            .sum();
        assert_relative_eq!(output.present_value, expected, epsilon = 1e-9);
        // Flat 5% against a 5% coupon on a coupon date prices near par.
        assert_abs_diff_eq!(output.present_value, 100.0, epsilon = 0.25);

        // On a coupon date accrued is zero.
        assert_relative_eq!(output.accrued_interest, 0.0);
        assert_relative_eq!(output.dirty_value, output.present_value);

        assert_abs_diff_eq!(output.metrics.duration, 1.93, epsilon = 0.02);
        let ytm = output.metrics.ytm.unwrap();
        assert_abs_diff_eq!(ytm, 0.05, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_coupon_closed_form() {
        let mut security = fixed_bond();
        security.id = "S2".into();
        security.instrument_type = InstrumentType::BondZero;
        security.coupon_rate = 0.0;
        security.frequency = Frequency::Zero;
        security.issue_date = d(2020, 1, 1);
        security.maturity_date = d(2030, 1, 1);
        security.face_value = 1000.0;

        let valuation_date = d(2025, 1, 1);
        let flows = zero::project(&security, valuation_date);
        let mut curve = flat_curve(0.04);
        curve.setup.benchmark_date = valuation_date;

        let output = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: true,
        });

        let years = valuation_date.days_between(&d(2030, 1, 1)) as f64 / 365.0;
        let expected = 1000.0 / (1.04_f64).powf(years);
        assert_relative_eq!(output.present_value, expected, epsilon = 1e-6);
        // Against the 5-year closed form (integer years) within 15bp of face.
        assert_abs_diff_eq!(output.present_value, 821.9271, epsilon = 0.15);

        assert_relative_eq!(output.accrued_interest, 0.0);
        // Single flow: duration equals its year fraction.
        assert_relative_eq!(output.metrics.duration, years, epsilon = 1e-12);
    }

    #[test]
    fn test_matured_security_values_to_zero() {
        let security = fixed_bond();
        let valuation_date = d(2026, 6, 1); // past maturity
        let flows = fixed::project(&security, valuation_date);
        let curve = flat_curve(0.05);

        let output = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: true,
        });

        assert_eq!(output.steps.len(), 0);
        assert_relative_eq!(output.present_value, 0.0);
        assert_relative_eq!(output.accrued_interest, 0.0);
        assert_relative_eq!(output.metrics.duration, 0.0);
        assert!(output.metrics.ytm.is_none());
    }

    #[test]
    fn test_step_count_matches_future_flows() {
        let security = fixed_bond();
        let valuation_date = d(2022, 3, 1);
        let flows = fixed::project(&security, valuation_date);
        let curve = flat_curve(0.05);

        let output = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: false,
        });

        let future = flows
            .iter()
            .filter(|f| valuation_date.days_between(&f.flow_date) > 0)
            .count();
        assert_eq!(output.steps.len(), future);
    }

    #[test]
    fn test_unrealized_gain_loss_against_book() {
        let security = fixed_bond();
        let valuation_date = d(2023, 1, 15);
        let flows = fixed::project(&security, valuation_date);
        let curve = flat_curve(0.05);

        let with_book = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: Some(95.0),
            include_accrued: true,
        });
        assert_relative_eq!(
            with_book.unrealized_gain_loss,
            with_book.dirty_value - 95.0,
            epsilon = 1e-12
        );

        let without_book = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: true,
        });
        assert_relative_eq!(without_book.unrealized_gain_loss, 0.0);
    }

    #[test]
    fn test_accrued_mid_period_and_excluded_for_loans() {
        let security = fixed_bond();
        let valuation_date = d(2023, 4, 15);
        let flows = fixed::project(&security, valuation_date);
        let curve = flat_curve(0.05);

        let output = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: true,
        });
        assert_relative_eq!(output.accrued_interest, 1.25, epsilon = 1e-9);
        assert_relative_eq!(
            output.dirty_value,
            output.present_value + 1.25,
            epsilon = 1e-9
        );

        let mut loan = security;
        loan.instrument_type = InstrumentType::LoanTerm;
        let loan_output = value(&ValuationInput {
            security: &loan,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: true,
        });
        assert_relative_eq!(loan_output.accrued_interest, 0.0);
    }

    #[test]
    fn test_discount_factor_clamps_past() {
        assert_relative_eq!(discount_factor(0.05, 0.0), 1.0);
        assert_relative_eq!(discount_factor(0.05, -1.0), 1.0);
        assert_relative_eq!(discount_factor(0.05, 1.0), 1.0 / 1.05);
    }

    #[test]
    fn test_steps_carry_rate_components() {
        let security = fixed_bond();
        let valuation_date = d(2023, 1, 15);
        let flows = fixed::project(&security, valuation_date);
        let curve = flat_curve(0.05);

        let output = value(&ValuationInput {
            security: &security,
            flows: &flows,
            curve: &curve,
            valuation_date,
            book_value: None,
            include_accrued: false,
        });
        for step in &output.steps {
            assert_relative_eq!(
                step.discount_rate,
                step.benchmark_rate + step.spread_rate,
                epsilon = 1e-15
            );
            assert!(step.years > 0.0);
        }
    }
}
