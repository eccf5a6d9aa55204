//! Actual/Actual day count conventions.

use super::DayCount;
use crate::types::{Date, Frequency};

/// Actual/Actual ISDA.
///
/// The interval is split at each year boundary; each sub-interval contributes
/// `days / (366 if leap year else 365)` and the fractions are summed. This
/// makes year fractions exactly additive across intermediate dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActActIsda;

impl DayCount for ActActIsda {
    fn name(&self) -> &'static str {
        "ACT/ACT"
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        if start == end {
            return 0.0;
        }
        if end < start {
            return -self.year_fraction(end, start);
        }

        if start.year() == end.year() {
            return start.days_between(&end) as f64 / f64::from(start.days_in_year());
        }

        let start_year_end = Date::from_ymd(start.year() + 1, 1, 1)
            .unwrap_or_else(|_| start.add_days(start.days_in_year() as i64));
        let end_year_start = end.start_of_year();

        let head = start.days_between(&start_year_end) as f64 / f64::from(start.days_in_year());
        let whole_years = (end.year() - start.year() - 1) as f64;
        let tail = end_year_start.days_between(&end) as f64 / f64::from(end.days_in_year());

        head + whole_years + tail
    }
}

/// Actual/Actual ICMA, period-based.
///
/// Fraction = actual days / nominal coupon period days, where the nominal
/// period is 365 / frequency. The value is a fraction of the coupon period;
/// accrual ratios divide two of these so the basis cancels. Zero-frequency
/// instruments fall back to a 365-day basis.
#[derive(Debug, Clone, Copy)]
pub struct ActActIcma {
    frequency: Frequency,
}

impl ActActIcma {
    /// Creates the convention for a coupon frequency.
    #[must_use]
    pub fn new(frequency: Frequency) -> Self {
        Self { frequency }
    }
}

impl DayCount for ActActIcma {
    fn name(&self) -> &'static str {
        "ACT/ACT ICMA"
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        let periods = self.frequency.periods_per_year().max(1);
        let period_days = 365.0 / f64::from(periods);
        start.days_between(&end) as f64 / period_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_isda_within_year() {
        assert_relative_eq!(
            ActActIsda.year_fraction(d(2025, 1, 1), d(2025, 7, 1)),
            181.0 / 365.0
        );
    }

    #[test]
    fn test_isda_leap_year_split() {
        // 2023-07-01 to 2024-07-01 spans a non-leap tail and a leap head.
        let yf = ActActIsda.year_fraction(d(2023, 7, 1), d(2024, 7, 1));
        let expected = 184.0 / 365.0 + 182.0 / 366.0;
        assert_relative_eq!(yf, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_isda_additivity() {
        let a = d(2022, 3, 10);
        let b = d(2023, 11, 2);
        let c = d(2026, 6, 30);
        let direct = ActActIsda.year_fraction(a, c);
        let split = ActActIsda.year_fraction(a, b) + ActActIsda.year_fraction(b, c);
        assert_relative_eq!(direct, split, epsilon = 1e-9);
    }

    #[test]
    fn test_isda_antisymmetric() {
        let a = d(2023, 2, 1);
        let b = d(2024, 8, 15);
        assert_relative_eq!(
            ActActIsda.year_fraction(a, b),
            -ActActIsda.year_fraction(b, a),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_icma_semi_annual_period() {
        let dc = ActActIcma::new(Frequency::SemiAnnual);
        let start = d(2025, 1, 1);
        let end = start.add_days(182);
        assert_relative_eq!(dc.year_fraction(start, end), 182.0 / 182.5, epsilon = 1e-12);
    }
}
