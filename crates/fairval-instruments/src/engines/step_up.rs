//! Step-up bond engine.

use fairval_core::schedule::coupon_dates;
use fairval_core::types::{Date, FlowType, ProjectedCashFlow, Security};

/// Projects the flows of a step-up bond.
///
/// Each coupon accrues at the rate in effect at the start of its period:
/// the step entry with the greatest effective date at or before the period
/// start, defaulting to the base coupon. Redemption of face value at
/// maturity as in the fixed engine.
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
    let mut period_start = security.issue_date;
    for date in &dates {
        let annual = security.coupon_at(period_start);
        let coupon = annual * security.face_value / (100.0 * periods);
        flows.push(ProjectedCashFlow::projected(
            security.id.clone(),
            *date,
            coupon,
            FlowType::Coupon,
            valuation_date,
        ));
        period_start = *date;
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fairval_core::daycounts::DayCountConvention;
    use fairval_core::types::{Currency, Frequency, InstrumentType, StepEntry};

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    /// The step-up scenario: 3% from 2022, 5% from 2024, semi-annual,
    /// maturing 2026-01-01.
    fn stepper() -> Security {
        let mut s = Security::new(
            "STEP-1",
            "3/5 stepper",
            InstrumentType::BondStepUp,
            Currency::USD,
            DayCountConvention::Act365,
            3.0,
            Frequency::SemiAnnual,
            d(2021, 7, 1),
            d(2026, 1, 1),
            100.0,
        );
        s.step_schedule = vec![
            StepEntry {
                effective_date: d(2022, 1, 1),
                new_coupon: 3.0,
            },
            StepEntry {
                effective_date: d(2024, 1, 1),
                new_coupon: 5.0,
            },
        ];
        s
    }

    #[test]
    fn test_coupon_steps_at_period_start() {
        let flows = project(&stepper(), d(2023, 6, 30));
        let coupon = |date: Date| {
            flows
                .iter()
                .find(|f| f.flow_date == date && f.flow_type == FlowType::Coupon)
                .map(|f| f.amount)
                .unwrap()
        };

        // Periods starting before 2024-01-01 accrue at 3%.
        assert_relative_eq!(coupon(d(2023, 7, 1)), 1.5);
        assert_relative_eq!(coupon(d(2024, 1, 1)), 1.5);
        // Periods starting on or after 2024-01-01 accrue at 5%.
        assert_relative_eq!(coupon(d(2024, 7, 1)), 2.5);
        assert_relative_eq!(coupon(d(2025, 1, 1)), 2.5);
        assert_relative_eq!(coupon(d(2025, 7, 1)), 2.5);
        assert_relative_eq!(coupon(d(2026, 1, 1)), 2.5);
    }

    #[test]
    fn test_redemption_present() {
        let flows = project(&stepper(), d(2023, 6, 30));
        let redemption = flows
            .iter()
            .find(|f| f.flow_type == FlowType::Redemption)
            .unwrap();
        assert_eq!(redemption.flow_date, d(2026, 1, 1));
        assert_relative_eq!(redemption.amount, 100.0);
    }

    #[test]
    fn test_base_coupon_before_first_step() {
        let mut s = stepper();
        s.coupon_rate = 2.0;
        s.issue_date = d(2021, 1, 1);
        s.step_schedule.remove(0); // only the 2024 step remains
        let flows = project(&s, d(2021, 6, 1));
        let first = flows
            .iter()
            .find(|f| f.flow_type == FlowType::Coupon)
            .unwrap();
        assert_relative_eq!(first.amount, 1.0);
    }
}
