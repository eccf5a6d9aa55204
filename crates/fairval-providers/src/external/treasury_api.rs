//! Treasury/corporate curve API client.
//!
//! Serves the curve names routed by [`CurveNameMap`]:
//!
//! - `GET {base}/treasury/{date|latest}`
//! - `GET {base}/corporate/{date|latest}`
//! - `GET {base}/corporate/spread/{rating}/{date|latest}`
//!
//! Responses carry parallel `maturities` (years) and `yields` or `spreads`
//! (percent) arrays for the whole curve in one call; rates are divided by
//! 100 on ingest.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use fairval_core::types::{Currency, Curve, CurvePoint, CurveSource, CurveType, Date};

use super::{CurveEndpoint, CurveNameMap, ExternalCurveSource, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Deserialize)]
struct CurveResponse {
    curve_date: String,
    maturities: Vec<f64>,
    #[serde(default)]
    yields: Option<Vec<f64>>,
    #[serde(default)]
    spreads: Option<Vec<f64>>,
}

/// Client for the Treasury/corporate curve API.
pub struct TreasuryApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    name_map: CurveNameMap,
    enabled: bool,
}

impl TreasuryApiClient {
    /// Creates a client. `api_key`, when present, is sent as a bearer
    /// header on every request.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, enabled: bool) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            name_map: CurveNameMap::default(),
            enabled,
        }
    }

    /// Replaces the name-routing map.
    #[must_use]
    pub fn with_name_map(mut self, name_map: CurveNameMap) -> Self {
        self.name_map = name_map;
        self
    }

    fn url_for(&self, endpoint: &CurveEndpoint, date: Date) -> String {
        match endpoint {
            CurveEndpoint::Treasury => format!("{}/treasury/{date}", self.base_url),
            CurveEndpoint::Corporate => format!("{}/corporate/{date}", self.base_url),
            CurveEndpoint::CorporateSpread(rating) => {
                format!("{}/corporate/spread/{rating}/{date}", self.base_url)
            }
        }
    }

    async fn get(&self, url: &str) -> Option<CurveResponse> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                // Timeout or connection failure: treated as unavailable.
                warn!(url, error = %e, "treasury curve API call failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(url, status = %response.status(), "treasury curve API returned error");
            return None;
        }
        match response.json::<CurveResponse>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(url, error = %e, "treasury curve API payload malformed");
                None
            }
        }
    }

    fn to_curve(&self, name: &str, endpoint: &CurveEndpoint, body: CurveResponse) -> Option<Curve> {
        let curve_date = Date::parse(&body.curve_date).ok()?;
        let rates = body.yields.or(body.spreads)?;
        if rates.len() != body.maturities.len() {
            warn!(name, "treasury curve API arrays disagree in length");
            return None;
        }

        let points = body
            .maturities
            .iter()
            .zip(rates.iter())
            .map(|(years, pct)| CurvePoint::from_years(*years, pct / 100.0))
            .collect();

        Some(Curve {
            name: name.to_string(),
            curve_date,
            source: CurveSource::ExternalFred,
            currency: Currency::USD,
            curve_type: if matches!(endpoint, CurveEndpoint::CorporateSpread(_)) {
                CurveType::Spread
            } else {
                CurveType::Zero
            },
            points,
        })
    }
}

#[async_trait]
impl ExternalCurveSource for TreasuryApiClient {
    async fn fetch_curve(&self, name: &str, date: Date) -> Option<Curve> {
        if !self.enabled {
            return None;
        }
        let endpoint = self.name_map.endpoint_for(name)?.clone();
        let url = self.url_for(&endpoint, date);
        debug!(name, url, "fetching curve from treasury API");

        let body = self.get(&url).await?;
        self.to_curve(name, &endpoint, body)
    }
}
