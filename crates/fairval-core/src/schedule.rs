//! Coupon schedule generation and accrued interest.
//!
//! Schedules step by the coupon frequency from the first coupon date (or
//! issue date plus one interval) until maturity; the final date is clamped
//! to the maturity date. Generated dates are the contractual ones and are
//! NOT business-day adjusted: valuation prices the contractual schedule
//! even when a coupon date falls on a weekend, and accrual periods run
//! between contractual dates. The weekend-forward shift exists as
//! [`Date::next_business_day`] for settlement-facing callers that need pay
//! dates; holiday calendars are out of scope.

use crate::types::{Date, Frequency, Security};

/// Generates the coupon dates for a schedule.
///
/// Zero frequency yields an empty list. The maturity date is always the
/// final entry (the last stepped date is clamped to it).
#[must_use]
pub fn coupon_dates(
    issue_date: Date,
    first_coupon_date: Option<Date>,
    maturity_date: Date,
    frequency: Frequency,
) -> Vec<Date> {
    if frequency.is_zero() {
        return Vec::new();
    }
    let step = frequency.months_per_period() as i32;

    let mut dates = Vec::new();
    let mut current = first_coupon_date.unwrap_or_else(|| issue_date.add_months(step));
    while current < maturity_date {
        dates.push(current);
        current = current.add_months(step);
    }
    dates.push(maturity_date);
    dates
}

/// The coupon period `[last, next]` containing `settlement`.
///
/// `last` is the greatest of the issue date and the coupon dates at or
/// before settlement; `next` is the earliest coupon date strictly after.
/// Returns `None` when settlement is on or past the final coupon date.
#[must_use]
pub fn coupon_period(
    issue_date: Date,
    coupon_dates: &[Date],
    settlement: Date,
) -> Option<(Date, Date)> {
    let next = *coupon_dates.iter().find(|d| **d > settlement)?;
    let last = coupon_dates
        .iter()
        .rev()
        .find(|d| **d <= settlement)
        .copied()
        .unwrap_or(issue_date);
    Some((last, next))
}

/// Accrued interest for a coupon-bearing security at `settlement`.
///
/// With the coupon period containing settlement being `[L, N]`:
///
/// ```text
/// accrued = (annual_coupon / frequency) * yf(L, S) / yf(L, N)
/// ```
///
/// under the security's day count convention. Step-up securities accrue at
/// the coupon in effect at the period start `L`. Returns 0 for zero-coupon
/// instruments and outside any coupon period.
#[must_use]
pub fn accrued_interest(security: &Security, settlement: Date) -> f64 {
    if security.frequency.is_zero() || security.coupon_rate == 0.0 {
        return 0.0;
    }
    let dates = coupon_dates(
        security.issue_date,
        security.first_coupon_date,
        security.maturity_date,
        security.frequency,
    );
    let Some((last, next)) = coupon_period(security.issue_date, &dates, settlement) else {
        return 0.0;
    };
    if settlement <= last {
        return 0.0;
    }

    let period_fraction = security
        .day_count
        .year_fraction(last, settlement, security.frequency);
    let full_period = security
        .day_count
        .year_fraction(last, next, security.frequency);
    if full_period == 0.0 {
        return 0.0;
    }

    let annual_coupon = security.coupon_at(last) * security.face_value / 100.0;
    let period_coupon = annual_coupon / f64::from(security.frequency.periods_per_year());

    period_coupon * period_fraction / full_period
}
