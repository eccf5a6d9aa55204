//! Day count conventions.
//!
//! Day count conventions determine how year fractions are computed between
//! two dates, which drives both accrued interest and discounting.
//!
//! # Supported conventions
//!
//! - [`Thirty360US`]: 30/360 Bond Basis (US adjustment)
//! - [`Thirty360E`]: 30E/360 Eurobond
//! - [`Act360`]: Actual/360 money-market
//! - [`Act365Fixed`]: Actual/365 Fixed
//! - [`ActActIsda`]: Actual/Actual ISDA (year-boundary split)
//! - [`ActActIcma`]: Actual/Actual ICMA (period-based, needs frequency)
//!
//! [`DayCountConvention`] is the storage-facing enum: it parses the persisted
//! label strings and evaluates year fractions without boxing.

mod actact;
mod actual;
mod thirty360;

pub use actact::{ActActIcma, ActActIsda};
pub use actual::{Act360, Act365Fixed};
pub use thirty360::{Thirty360E, Thirty360US};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency};

/// Trait for day count conventions.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait DayCount: Send + Sync {
    /// Returns the conventional name (matches the persisted label).
    fn name(&self) -> &'static str;

    /// Calculates the year fraction between two dates.
    ///
    /// Can be negative if `end < start`.
    fn year_fraction(&self, start: Date, end: Date) -> f64;
}

/// Enumeration of the supported conventions, as persisted on securities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DayCountConvention {
    /// 30/360 Bond Basis (US)
    #[default]
    Thirty360US,
    /// 30E/360 Eurobond
    Thirty360E,
    /// Actual/360
    Act360,
    /// Actual/365 Fixed
    Act365,
    /// Actual/Actual ISDA
    ActActIsda,
    /// Actual/Actual ICMA
    ActActIcma,
}

impl DayCountConvention {
    /// Parses a persisted label. Accepts the canonical names plus common
    /// aliases, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownDayCount` for unrecognised labels. This is
    /// a fatal validation error at the API boundary.
    pub fn parse(label: &str) -> CoreResult<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "30/360" | "30/360 US" | "BOND" | "THIRTY_360" => Ok(Self::Thirty360US),
            "30E/360" | "EUROBOND" | "THIRTY_360E" => Ok(Self::Thirty360E),
            "ACT/360" | "ACTUAL/360" => Ok(Self::Act360),
            "ACT/365" | "ACT/365F" | "ACTUAL/365" => Ok(Self::Act365),
            "ACT/ACT" | "ACT/ACT ISDA" | "ACTUAL/ACTUAL" => Ok(Self::ActActIsda),
            "ACT/ACT ICMA" | "ACT/ACT-ICMA" => Ok(Self::ActActIcma),
            _ => Err(CoreError::unknown_day_count(label)),
        }
    }

    /// Canonical label for the convention.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Thirty360US => "30/360",
            Self::Thirty360E => "30E/360",
            Self::Act360 => "ACT/360",
            Self::Act365 => "ACT/365",
            Self::ActActIsda => "ACT/ACT",
            Self::ActActIcma => "ACT/ACT ICMA",
        }
    }

    /// Calculates the year fraction between two dates.
    ///
    /// `frequency` is only consulted by ACT/ACT ICMA, whose denominator is
    /// the nominal coupon period length (365 / frequency).
    #[must_use]
    pub fn year_fraction(&self, start: Date, end: Date, frequency: Frequency) -> f64 {
        match self {
            Self::Thirty360US => Thirty360US.year_fraction(start, end),
            Self::Thirty360E => Thirty360E.year_fraction(start, end),
            Self::Act360 => Act360.year_fraction(start, end),
            Self::Act365 => Act365Fixed.year_fraction(start, end),
            Self::ActActIsda => ActActIsda.year_fraction(start, end),
            Self::ActActIcma => ActActIcma::new(frequency).year_fraction(start, end),
        }
    }
}

impl fmt::Display for DayCountConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
