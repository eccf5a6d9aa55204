//! Engine configuration.
//!
//! One explicit struct constructed at process init and passed into the
//! orchestrator; no ambient state. Loadable from a TOML file with
//! `FAIRVAL_*` environment overrides on top.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fairval_core::types::Currency;
use fairval_providers::{
    ExternalCurveSource, ExternalFxSource, FxApiClient, FxApiFlavor, MarketDataApiClient,
    TreasuryApiClient,
};

/// Hard bounds on the worker pool size.
pub const MIN_CONCURRENCY: usize = 1;
/// Upper bound on the worker pool size.
pub const MAX_CONCURRENCY: usize = 16;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Re-fetch TTL in days for externally sourced curves.
    #[serde(default = "default_curve_ttl_days")]
    pub curve_ttl_days: i64,

    /// Re-fetch TTL in days for stored FX rates.
    #[serde(default = "default_curve_ttl_days")]
    pub fx_ttl_days: i64,

    /// Whether external curve providers are consulted at all.
    #[serde(default)]
    pub external_curves_enabled: bool,

    /// Base URL of the Treasury/corporate curve API.
    pub treasury_api_url: Option<String>,

    /// Bearer token for the Treasury/corporate curve API.
    pub treasury_api_key: Option<String>,

    /// Base URL of the generic market-data API.
    pub market_data_api_url: Option<String>,

    /// API key for the generic market-data API.
    pub market_data_api_key: Option<String>,

    /// URL of the FX endpoint.
    pub fx_api_url: Option<String>,

    /// Query flavour of the FX endpoint: "base_symbols" or "from_to".
    #[serde(default = "default_fx_flavor")]
    pub fx_api_flavor: String,

    /// API key for the FX endpoint.
    pub fx_api_key: Option<String>,

    /// Reporting currency when a run does not name one.
    #[serde(default)]
    pub default_reporting_currency: Currency,

    /// Default worker count for parallel runs (clamped to 1..=16).
    #[serde(default = "default_concurrency")]
    pub default_concurrency: usize,
}

fn default_curve_ttl_days() -> i64 {
    1
}

fn default_fx_flavor() -> String {
    "base_symbols".to_string()
}

fn default_concurrency() -> usize {
    4
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            curve_ttl_days: default_curve_ttl_days(),
            fx_ttl_days: default_curve_ttl_days(),
            external_curves_enabled: false,
            treasury_api_url: None,
            treasury_api_key: None,
            market_data_api_url: None,
            market_data_api_key: None,
            fx_api_url: None,
            fx_api_flavor: default_fx_flavor(),
            fx_api_key: None,
            default_reporting_currency: Currency::USD,
            default_concurrency: default_concurrency(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the file is unreadable or not valid TOML.
    pub fn from_file(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Applies `FAIRVAL_*` environment variables on top of the current
    /// values:
    ///
    /// - `FAIRVAL_CURVE_TTL_DAYS` / `FAIRVAL_FX_TTL_DAYS`
    /// - `FAIRVAL_EXTERNAL_CURVES_ENABLED` ("true"/"1")
    /// - `FAIRVAL_TREASURY_API_URL` / `FAIRVAL_TREASURY_API_KEY`
    /// - `FAIRVAL_MARKET_DATA_API_URL` / `FAIRVAL_MARKET_DATA_API_KEY`
    /// - `FAIRVAL_FX_API_URL` / `FAIRVAL_FX_API_FLAVOR` / `FAIRVAL_FX_API_KEY`
    /// - `FAIRVAL_REPORTING_CURRENCY`
    /// - `FAIRVAL_CONCURRENCY`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(ttl) = std::env::var("FAIRVAL_CURVE_TTL_DAYS") {
            if let Ok(days) = ttl.parse::<i64>() {
                self.curve_ttl_days = days;
            }
        }
        if let Ok(ttl) = std::env::var("FAIRVAL_FX_TTL_DAYS") {
            if let Ok(days) = ttl.parse::<i64>() {
                self.fx_ttl_days = days;
            }
        }
        if let Ok(enabled) = std::env::var("FAIRVAL_EXTERNAL_CURVES_ENABLED") {
            self.external_curves_enabled = enabled.eq_ignore_ascii_case("true") || enabled == "1";
        }
        if let Ok(url) = std::env::var("FAIRVAL_TREASURY_API_URL") {
            self.treasury_api_url = Some(url);
        }
        if let Ok(key) = std::env::var("FAIRVAL_TREASURY_API_KEY") {
            self.treasury_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("FAIRVAL_MARKET_DATA_API_URL") {
            self.market_data_api_url = Some(url);
        }
        if let Ok(key) = std::env::var("FAIRVAL_MARKET_DATA_API_KEY") {
            self.market_data_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("FAIRVAL_FX_API_URL") {
            self.fx_api_url = Some(url);
        }
        if let Ok(flavor) = std::env::var("FAIRVAL_FX_API_FLAVOR") {
            self.fx_api_flavor = flavor;
        }
        if let Ok(key) = std::env::var("FAIRVAL_FX_API_KEY") {
            self.fx_api_key = Some(key);
        }
        if let Ok(currency) = std::env::var("FAIRVAL_REPORTING_CURRENCY") {
            if let Ok(parsed) = Currency::parse(&currency) {
                self.default_reporting_currency = parsed;
            }
        }
        if let Ok(workers) = std::env::var("FAIRVAL_CONCURRENCY") {
            if let Ok(n) = workers.parse::<usize>() {
                self.default_concurrency = n.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY);
            }
        }
    }

    /// Builds the external curve sources in resolution order. Empty when
    /// external curves are disabled.
    #[must_use]
    pub fn build_curve_sources(&self) -> Vec<Arc<dyn ExternalCurveSource>> {
        if !self.external_curves_enabled {
            return Vec::new();
        }
        let mut sources: Vec<Arc<dyn ExternalCurveSource>> = Vec::new();
        if let Some(url) = &self.treasury_api_url {
            sources.push(Arc::new(TreasuryApiClient::new(
                url.clone(),
                self.treasury_api_key.clone(),
                true,
            )));
        }
        if let Some(url) = &self.market_data_api_url {
            sources.push(Arc::new(MarketDataApiClient::new(
                url.clone(),
                self.market_data_api_key.clone(),
                true,
            )));
        }
        sources
    }

    /// Builds the external FX source, if one is configured.
    #[must_use]
    pub fn build_fx_source(&self) -> Option<Arc<dyn ExternalFxSource>> {
        let url = self.fx_api_url.as_ref()?;
        let flavor = if self.fx_api_flavor.eq_ignore_ascii_case("from_to") {
            FxApiFlavor::FromTo
        } else {
            FxApiFlavor::BaseSymbols
        };
        Some(Arc::new(FxApiClient::new(
            url.clone(),
            flavor,
            self.fx_api_key.clone(),
            true,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.curve_ttl_days, 1);
        assert!(!config.external_curves_enabled);
        assert_eq!(config.default_reporting_currency, Currency::USD);
        assert_eq!(config.default_concurrency, 4);
    }

    #[test]
    fn test_disabled_external_builds_no_sources() {
        let mut config = EngineConfig::default();
        config.treasury_api_url = Some("http://localhost".into());
        assert!(config.build_curve_sources().is_empty());

        config.external_curves_enabled = true;
        assert_eq!(config.build_curve_sources().len(), 1);
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml_text = r#"
            curve_ttl_days = 3
            external_curves_enabled = true
            treasury_api_url = "http://curves.internal"
            fx_api_flavor = "from_to"
        "#;
        let config: EngineConfig = toml::from_str(toml_text).unwrap();
        assert_eq!(config.curve_ttl_days, 3);
        assert!(config.external_curves_enabled);
        assert_eq!(config.fx_api_flavor, "from_to");
        assert_eq!(config.default_reporting_currency, Currency::USD);
    }
}
