//! 30/360 day count conventions.

use super::DayCount;
use crate::types::Date;

/// 30/360 US day count convention (Bond Basis).
///
/// # Rules
///
/// - If D1 is 31, change to 30
/// - If D2 is 31 and D1 is 30 or 31, change D2 to 30
///
/// Days = 360 x (Y2 - Y1) + 30 x (M2 - M1) + (D2 - D1), denominator 360.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360US;

impl Thirty360US {
    /// Day count under the US rules.
    #[must_use]
    pub fn day_count(&self, start: Date, end: Date) -> i64 {
        let mut d1 = start.day() as i64;
        let mut d2 = end.day() as i64;
        let m1 = start.month() as i64;
        let m2 = end.month() as i64;
        let y1 = start.year() as i64;
        let y2 = end.year() as i64;

        if d1 == 31 {
            d1 = 30;
        }
        if d2 == 31 && d1 >= 30 {
            d2 = 30;
        }

        360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
    }
}

impl DayCount for Thirty360US {
    fn name(&self) -> &'static str {
        "30/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        self.day_count(start, end) as f64 / 360.0
    }
}

/// 30E/360 European day count convention (Eurobond Basis).
///
/// # Rules
///
/// - If D1 is 31, change to 30
/// - If D2 is 31, change to 30
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360E;

impl Thirty360E {
    /// Day count under the European rules.
    #[must_use]
    pub fn day_count(&self, start: Date, end: Date) -> i64 {
        let mut d1 = start.day() as i64;
        let mut d2 = end.day() as i64;
        let m1 = start.month() as i64;
        let m2 = end.month() as i64;
        let y1 = start.year() as i64;
        let y2 = end.year() as i64;

        if d1 == 31 {
            d1 = 30;
        }
        if d2 == 31 {
            d2 = 30;
        }

        360 * (y2 - y1) + 30 * (m2 - m1) + (d2 - d1)
    }
}

impl DayCount for Thirty360E {
    fn name(&self) -> &'static str {
        "30E/360"
    }

    fn year_fraction(&self, start: Date, end: Date) -> f64 {
        self.day_count(start, end) as f64 / 360.0
    }
}
