//! Generic market-data curve API client.
//!
//! `GET {base}/curves?curve={name}&date={date}` returning the curve
//! directly: `{currency, curve_type, points: [{tenor, rate}]}`. Rates are
//! already decimals. Serves any curve name; it is the fallback for names
//! the Treasury/corporate routing does not know.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use fairval_core::types::{Currency, Curve, CurvePoint, CurveSource, CurveType, Date};

use super::{ExternalCurveSource, DEFAULT_TIMEOUT_SECS};

#[derive(Debug, Deserialize)]
struct PointPayload {
    tenor: String,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct CurvePayload {
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    curve_type: Option<String>,
    points: Vec<PointPayload>,
}

/// Client for the generic market-data endpoint.
pub struct MarketDataApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    enabled: bool,
}

impl MarketDataApiClient {
    /// Creates a client. `api_key`, when present, is sent as an `X-Api-Key`
    /// header.
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
            enabled,
        }
    }

    fn to_curve(name: &str, date: Date, payload: CurvePayload) -> Option<Curve> {
        if payload.points.is_empty() {
            return None;
        }
        let currency = payload
            .currency
            .as_deref()
            .and_then(|c| Currency::parse(c).ok())
            .unwrap_or_default();
        let curve_type = match payload.curve_type.as_deref() {
            Some("spread") => CurveType::Spread,
            Some("par") => CurveType::Par,
            Some("forward") => CurveType::Forward,
            _ => CurveType::Zero,
        };

        Some(Curve {
            name: name.to_string(),
            curve_date: date,
            source: CurveSource::ExternalBloomberg,
            currency,
            curve_type,
            points: payload
                .points
                .into_iter()
                .map(|p| CurvePoint::from_tenor(p.tenor, p.rate))
                .collect(),
        })
    }
}

#[async_trait]
impl ExternalCurveSource for MarketDataApiClient {
    async fn fetch_curve(&self, name: &str, date: Date) -> Option<Curve> {
        if !self.enabled {
            return None;
        }
        let url = format!("{}/curves", self.base_url);
        debug!(name, url, "fetching curve from market data API");

        let mut request = self
            .client
            .get(&url)
            .query(&[("curve", name), ("date", &date.to_string())]);
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(name, error = %e, "market data API call failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(name, status = %response.status(), "market data API returned error");
            return None;
        }
        let payload = match response.json::<CurvePayload>().await {
            Ok(p) => p,
            Err(e) => {
                warn!(name, error = %e, "market data API payload malformed");
                return None;
            }
        };

        Self::to_curve(name, date, payload)
    }
}
