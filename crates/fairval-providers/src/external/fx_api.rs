//! External FX rate API client.
//!
//! One configured URL, two query flavours:
//!
//! - [`FxApiFlavor::BaseSymbols`]: `?base={from}&symbols={to}&date={date}`,
//!   response `{rates: {TO: rate}}`
//! - [`FxApiFlavor::FromTo`]: `?from={from}&to={to}&amount=1&date={date}`,
//!   response `{rate}` or `{result}`

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use fairval_core::types::{Currency, Date, FxRate};

use super::{ExternalFxSource, DEFAULT_TIMEOUT_SECS};

/// Query shape of the configured FX endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FxApiFlavor {
    /// `base`/`symbols`/`date` query, rates map response.
    #[default]
    BaseSymbols,
    /// `from`/`to`/`amount`/`date` query, single-rate response.
    FromTo,
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    result: Option<f64>,
    #[serde(default)]
    date: Option<String>,
}

/// Client for the configured FX endpoint.
pub struct FxApiClient {
    client: reqwest::Client,
    url: String,
    flavor: FxApiFlavor,
    api_key: Option<String>,
    enabled: bool,
}

impl FxApiClient {
    /// Creates a client for the configured URL and flavour.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        flavor: FxApiFlavor,
        api_key: Option<String>,
        enabled: bool,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.into(),
            flavor,
            api_key,
            enabled,
        }
    }
}

#[async_trait]
impl ExternalFxSource for FxApiClient {
    async fn fetch_rate(&self, from: Currency, to: Currency, date: Date) -> Option<FxRate> {
        if !self.enabled {
            return None;
        }
        debug!(%from, %to, %date, "fetching FX rate from external API");

        let date_string = date.to_string();
        let mut request = self.client.get(&self.url);
        request = match self.flavor {
            FxApiFlavor::BaseSymbols => request.query(&[
                ("base", from.code()),
                ("symbols", to.code()),
                ("date", date_string.as_str()),
            ]),
            FxApiFlavor::FromTo => request.query(&[
                ("from", from.code()),
                ("to", to.code()),
                ("amount", "1"),
                ("date", date_string.as_str()),
            ]),
        };
        if let Some(key) = &self.api_key {
            request = request.header("X-Api-Key", key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%from, %to, error = %e, "FX API call failed");
                return None;
            }
        };
        if !response.status().is_success() {
            warn!(%from, %to, status = %response.status(), "FX API returned error");
            return None;
        }

        let (rate, response_date) = match self.flavor {
            FxApiFlavor::BaseSymbols => match response.json::<RatesResponse>().await {
                Ok(body) => (body.rates.get(to.code()).copied(), body.date),
                Err(e) => {
                    warn!(%from, %to, error = %e, "FX API payload malformed");
                    return None;
                }
            },
            FxApiFlavor::FromTo => match response.json::<ConvertResponse>().await {
                Ok(body) => (body.rate.or(body.result), body.date),
                Err(e) => {
                    warn!(%from, %to, error = %e, "FX API payload malformed");
                    return None;
                }
            },
        };

        let rate = rate?;
        if rate <= 0.0 || !rate.is_finite() {
            warn!(%from, %to, rate, "FX API returned unusable rate");
            return None;
        }

        let rate_date = response_date
            .as_deref()
            .and_then(|s| Date::parse(s).ok())
            .unwrap_or(date);

        Some(FxRate {
            from_currency: from,
            to_currency: to,
            rate_date,
            rate,
            source: "external-fx".to_string(),
        })
    }
}
