//! Yield curves and curve points as stored and fetched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Currency, Date, Tenor};

/// Where a curve came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveSource {
    /// Entered by hand.
    Manual,
    /// Fetched from the Treasury/corporate curve API.
    ExternalFred,
    /// Fetched from the generic market-data API.
    ExternalBloomberg,
    /// Synthetic identity curve (flat zero).
    Identity,
}

impl CurveSource {
    /// True for sources subject to the external-refetch TTL.
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self, CurveSource::ExternalFred | CurveSource::ExternalBloomberg)
    }
}

impl fmt::Display for CurveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CurveSource::Manual => "manual",
            CurveSource::ExternalFred => "external-fred",
            CurveSource::ExternalBloomberg => "external-bloomberg",
            CurveSource::Identity => "identity",
        };
        write!(f, "{name}")
    }
}

/// Shape of the curve's rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// Zero (spot) rates.
    #[default]
    Zero,
    /// Par rates.
    Par,
    /// Forward rates.
    Forward,
    /// Spread over a benchmark.
    Spread,
}

/// A single point on a curve.
///
/// At least one of `tenor_label`, `year_fraction`, or `maturity_date` is
/// present; consumers derive the others against the curve date when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    /// Tenor label (e.g. "10Y"), if supplied.
    pub tenor_label: Option<String>,
    /// Rate as a decimal (0.0525 = 5.25%).
    pub rate: f64,
    /// Time to maturity in years, if supplied.
    pub year_fraction: Option<f64>,
    /// Maturity date, if supplied.
    pub maturity_date: Option<Date>,
}

impl CurvePoint {
    /// Creates a point from a tenor label and rate.
    #[must_use]
    pub fn from_tenor(label: impl Into<String>, rate: f64) -> Self {
        Self {
            tenor_label: Some(label.into()),
            rate,
            year_fraction: None,
            maturity_date: None,
        }
    }

    /// Creates a point from a year fraction and rate.
    #[must_use]
    pub fn from_years(years: f64, rate: f64) -> Self {
        Self {
            tenor_label: None,
            rate,
            year_fraction: Some(years),
            maturity_date: None,
        }
    }

    /// Resolves the point's year fraction: the stored one, else the parsed
    /// tenor label, else ACT/365 days from `curve_date` to the maturity date.
    ///
    /// Returns `None` when the point carries none of the three.
    #[must_use]
    pub fn resolve_years(&self, curve_date: Date) -> Option<f64> {
        if let Some(y) = self.year_fraction {
            return Some(y);
        }
        if let Some(label) = &self.tenor_label {
            if let Ok(tenor) = Tenor::parse(label) {
                return Some(tenor.years());
            }
        }
        self.maturity_date
            .map(|m| curve_date.days_between(&m) as f64 / 365.0)
    }

    /// Resolves the point's maturity date: the stored one, else the curve
    /// date advanced by the resolved year fraction (ACT/365).
    #[must_use]
    pub fn resolve_maturity(&self, curve_date: Date) -> Option<Date> {
        if let Some(m) = self.maturity_date {
            return Some(m);
        }
        self.resolve_years(curve_date)
            .map(|y| curve_date.add_days((y * 365.0).round() as i64))
    }
}

/// A named curve on a date with its ordered points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    /// Curve name (e.g. "US_Treasury").
    pub name: String,
    /// Date the curve was observed.
    pub curve_date: Date,
    /// Source of the curve.
    pub source: CurveSource,
    /// Currency of the rates.
    pub currency: Currency,
    /// Shape of the rates.
    pub curve_type: CurveType,
    /// Points in ascending year-fraction order.
    pub points: Vec<CurvePoint>,
}

impl Curve {
    /// Points paired with resolved year fractions, ascending. Points that
    /// resolve to no year fraction are dropped.
    #[must_use]
    pub fn resolved_points(&self) -> Vec<(f64, &CurvePoint)> {
        let mut resolved: Vec<(f64, &CurvePoint)> = self
            .points
            .iter()
            .filter_map(|p| p.resolve_years(self.curve_date).map(|y| (y, p)))
            .collect();
        resolved.sort_by(|a, b| a.0.total_cmp(&b.0));
        resolved
    }
}
