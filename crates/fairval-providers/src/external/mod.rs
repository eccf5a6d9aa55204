//! External market-data sources.
//!
//! Two small contracts: fetch one curve, fetch one FX rate. Every
//! implementation swallows its own failures - HTTP errors, timeouts, and
//! malformed payloads come back as `None` after a `warn!`, so the provider
//! pipelines fall through to their next resolution step. A disabled source
//! returns `None` without making a call.

pub mod fx_api;
pub mod market_data_api;
pub mod treasury_api;

use std::collections::HashMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;

use fairval_core::types::{Currency, Curve, Date, FxRate};

pub use fx_api::{FxApiClient, FxApiFlavor};
pub use market_data_api::MarketDataApiClient;
pub use treasury_api::TreasuryApiClient;

/// Default per-call HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches one named curve for a date.
#[async_trait]
pub trait ExternalCurveSource: Send + Sync {
    /// Fetch a curve, or `None` when the source is disabled, does not serve
    /// the name, or failed.
    async fn fetch_curve(&self, name: &str, date: Date) -> Option<Curve>;
}

/// Fetches one FX rate for a date.
#[async_trait]
pub trait ExternalFxSource: Send + Sync {
    /// Fetch a rate, or `None` when the source is disabled or failed.
    async fn fetch_rate(&self, from: Currency, to: Currency, date: Date) -> Option<FxRate>;
}

/// Endpoint a curve name routes to on the Treasury/corporate API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurveEndpoint {
    /// `GET /treasury/{date|latest}`
    Treasury,
    /// `GET /corporate/{date|latest}`
    Corporate,
    /// `GET /corporate/spread/{rating}/{date|latest}`
    CorporateSpread(String),
}

static DEFAULT_NAME_MAP: Lazy<HashMap<String, CurveEndpoint>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("US_Treasury".to_string(), CurveEndpoint::Treasury);
    map.insert("US_Corporate_AAA".to_string(), CurveEndpoint::Corporate);
    map.insert("US_Corporate".to_string(), CurveEndpoint::Corporate);
    for rating in ["AAA", "AA", "A", "BAA", "BBB", "BB", "B"] {
        map.insert(
            format!("US_Corporate_Spread_{rating}"),
            CurveEndpoint::CorporateSpread(rating.to_string()),
        );
    }
    map
});

/// Curve-name to endpoint routing for the Treasury/corporate API.
///
/// Names with no entry fall through to the generic market-data client.
#[derive(Debug, Clone)]
pub struct CurveNameMap {
    entries: HashMap<String, CurveEndpoint>,
}

impl Default for CurveNameMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_NAME_MAP.clone(),
        }
    }
}

impl CurveNameMap {
    /// An empty map (routes nothing).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Adds or replaces a routing entry.
    pub fn insert(&mut self, name: impl Into<String>, endpoint: CurveEndpoint) {
        self.entries.insert(name.into(), endpoint);
    }

    /// Endpoint for a curve name, if mapped.
    #[must_use]
    pub fn endpoint_for(&self, name: &str) -> Option<&CurveEndpoint> {
        self.entries.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routing() {
        let map = CurveNameMap::default();
        assert_eq!(map.endpoint_for("US_Treasury"), Some(&CurveEndpoint::Treasury));
        assert_eq!(
            map.endpoint_for("US_Corporate_Spread_BAA"),
            Some(&CurveEndpoint::CorporateSpread("BAA".to_string()))
        );
        assert!(map.endpoint_for("EUR_Swap").is_none());
    }

    #[test]
    fn test_custom_entry() {
        let mut map = CurveNameMap::empty();
        map.insert("GILTS", CurveEndpoint::Treasury);
        assert_eq!(map.endpoint_for("GILTS"), Some(&CurveEndpoint::Treasury));
    }
}
