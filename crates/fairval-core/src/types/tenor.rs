//! Tenor labels for curve points and spread maps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Unit of a tenor label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenorUnit {
    /// Calendar days
    Days,
    /// Weeks
    Weeks,
    /// Months
    Months,
    /// Years
    Years,
}

/// A maturity bucket expressed as `<n><D|W|M|Y>` (e.g. `5Y`, `3M`, `90D`).
///
/// Parsing is case-insensitive. The conversion to years is total and pure:
/// D/365, W/52, M/12, Y/1.
///
/// # Example
///
/// ```rust
/// use fairval_core::types::Tenor;
///
/// let tenor: Tenor = "10Y".parse().unwrap();
/// assert_eq!(tenor.years(), 10.0);
/// assert_eq!(tenor.to_string(), "10Y");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenor {
    /// Number of units (positive).
    pub count: u32,
    /// Unit of measure.
    pub unit: TenorUnit,
}

impl Tenor {
    /// Creates a tenor from a count and unit.
    #[must_use]
    pub fn new(count: u32, unit: TenorUnit) -> Self {
        Self { count, unit }
    }

    /// Parses a tenor label.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTenor` when the input does not match
    /// `<positive integer><D|W|M|Y>`.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        if trimmed.len() < 2 || !trimmed.is_char_boundary(trimmed.len() - 1) {
            return Err(CoreError::invalid_tenor(input));
        }

        let (digits, unit) = trimmed.split_at(trimmed.len() - 1);
        let count: u32 = digits
            .parse()
            .map_err(|_| CoreError::invalid_tenor(input))?;
        if count == 0 {
            return Err(CoreError::invalid_tenor(input));
        }

        let unit = match unit.to_ascii_uppercase().as_str() {
            "D" => TenorUnit::Days,
            "W" => TenorUnit::Weeks,
            "M" => TenorUnit::Months,
            "Y" => TenorUnit::Years,
            _ => return Err(CoreError::invalid_tenor(input)),
        };

        Ok(Self { count, unit })
    }

    /// Converts the tenor to a year fraction.
    #[must_use]
    pub fn years(&self) -> f64 {
        let n = f64::from(self.count);
        match self.unit {
            TenorUnit::Days => n / 365.0,
            TenorUnit::Weeks => n / 52.0,
            TenorUnit::Months => n / 12.0,
            TenorUnit::Years => n,
        }
    }
}

impl FromStr for Tenor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tenor::parse(s)
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TenorUnit::Days => "D",
            TenorUnit::Weeks => "W",
            TenorUnit::Months => "M",
            TenorUnit::Years => "Y",
        };
        write!(f, "{}{}", self.count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Tenor::parse("5Y").unwrap(), Tenor::new(5, TenorUnit::Years));
        assert_eq!(Tenor::parse("3m").unwrap(), Tenor::new(3, TenorUnit::Months));
        assert_eq!(Tenor::parse("90D").unwrap(), Tenor::new(90, TenorUnit::Days));
        assert_eq!(Tenor::parse(" 2W ").unwrap(), Tenor::new(2, TenorUnit::Weeks));
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "Y", "5", "5X", "-1Y", "0M", "1.5Y", "default"] {
            assert!(Tenor::parse(bad).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn test_years_conversion() {
        assert_relative_eq!(Tenor::parse("1Y").unwrap().years(), 1.0);
        assert_relative_eq!(Tenor::parse("6M").unwrap().years(), 0.5);
        assert_relative_eq!(Tenor::parse("26W").unwrap().years(), 0.5);
        assert_relative_eq!(Tenor::parse("365D").unwrap().years(), 1.0);
    }

    #[test]
    fn test_roundtrip_display() {
        for label in ["1D", "2W", "3M", "30Y"] {
            assert_eq!(Tenor::parse(label).unwrap().to_string(), label);
        }
    }
}
