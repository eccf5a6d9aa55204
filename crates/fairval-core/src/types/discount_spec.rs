//! Per-security discount configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{SecurityId, Tenor};

/// Fallback key in a manual-spread map, applied to tenors with no entry.
pub const DEFAULT_SPREAD_KEY: &str = "default";

/// Fair-value hierarchy classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IfrsLevel {
    /// Quoted prices in active markets.
    #[serde(rename = "level_1")]
    Level1,
    /// Observable inputs.
    #[serde(rename = "level_2")]
    Level2,
    /// Unobservable inputs.
    #[serde(rename = "level_3")]
    Level3,
}

/// Standing spreads recorded on the specification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct StandingSpreads {
    /// Z-spread in basis points.
    pub z: Option<f64>,
    /// G-spread in basis points.
    pub g: Option<f64>,
    /// CDS spread in basis points.
    pub cds: Option<f64>,
    /// Liquidity premium in basis points.
    pub liquidity: Option<f64>,
}

/// Per-security discount configuration. At most one per security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountSpec {
    /// Security the specification applies to.
    pub security_id: SecurityId,
    /// Named benchmark curve.
    pub benchmark_curve_name: String,
    /// Optional required-spread curve.
    pub spread_curve_name: Option<String>,
    /// Manual per-tenor spread overrides in basis points; key `"default"`
    /// is the fallback for unmatched tenors.
    #[serde(default)]
    pub manual_spreads: BTreeMap<String, f64>,
    /// Standing Z/G/CDS/liquidity spreads.
    pub standing_spreads: Option<StandingSpreads>,
    /// IFRS level override.
    pub ifrs_level: Option<IfrsLevel>,
}

impl DiscountSpec {
    /// Creates a specification with only a benchmark curve.
    #[must_use]
    pub fn new(security_id: SecurityId, benchmark_curve_name: impl Into<String>) -> Self {
        Self {
            security_id,
            benchmark_curve_name: benchmark_curve_name.into(),
            spread_curve_name: None,
            manual_spreads: BTreeMap::new(),
            standing_spreads: None,
            ifrs_level: None,
        }
    }

    /// Validates the specification: the benchmark name is non-empty and
    /// every manual-spread key is a tenor label or `"default"`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidDiscountSpec`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.benchmark_curve_name.trim().is_empty() {
            return Err(CoreError::InvalidDiscountSpec {
                reason: "benchmark curve name is empty".to_string(),
            });
        }
        for key in self.manual_spreads.keys() {
            if key != DEFAULT_SPREAD_KEY && Tenor::parse(key).is_err() {
                return Err(CoreError::InvalidDiscountSpec {
                    reason: format!("manual spread key '{key}' is not a tenor or 'default'"),
                });
            }
        }
        Ok(())
    }

    /// Manual spread (bps) applicable to `tenor_label`: the exact entry if
    /// present, else the `"default"` entry, else 0.
    #[must_use]
    pub fn manual_spread_for(&self, tenor_label: Option<&str>) -> f64 {
        tenor_label
            .and_then(|label| self.manual_spreads.get(label))
            .or_else(|| self.manual_spreads.get(DEFAULT_SPREAD_KEY))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_keys() {
        let mut spec = DiscountSpec::new(SecurityId::new("S"), "US_Treasury");
        spec.manual_spreads.insert("5Y".into(), 25.0);
        spec.manual_spreads.insert("default".into(), 10.0);
        assert!(spec.validate().is_ok());

        spec.manual_spreads.insert("5X".into(), 1.0);
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_manual_spread_fallback() {
        let mut spec = DiscountSpec::new(SecurityId::new("S"), "US_Treasury");
        spec.manual_spreads.insert("5Y".into(), 25.0);
        spec.manual_spreads.insert(DEFAULT_SPREAD_KEY.into(), 10.0);

        assert_eq!(spec.manual_spread_for(Some("5Y")), 25.0);
        assert_eq!(spec.manual_spread_for(Some("7Y")), 10.0);
        assert_eq!(spec.manual_spread_for(None), 10.0);

        spec.manual_spreads.remove(DEFAULT_SPREAD_KEY);
        assert_eq!(spec.manual_spread_for(Some("7Y")), 0.0);
    }

    #[test]
    fn test_empty_benchmark_rejected() {
        let spec = DiscountSpec::new(SecurityId::new("S"), "  ");
        assert!(spec.validate().is_err());
    }
}
