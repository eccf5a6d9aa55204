//! Composite curve provider.
//!
//! Resolution order for each named curve:
//!
//! 1. Newest stored curve on or before the requested date.
//! 2. When absent, or stale for external sources (older than the TTL),
//!    try the external sources in order; persist and use the first hit.
//! 3. When the fetch fails but a stale cached curve exists, use it.
//! 4. Otherwise `CurveUnavailable`.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use fairval_core::types::{Curve, Date};
use fairval_curves::composite::CompositeCurve;
use fairval_storage::CurveStore;

use crate::error::{ProviderError, ProviderResult};
use crate::external::ExternalCurveSource;

/// Default re-fetch TTL for externally sourced curves, in days.
pub const DEFAULT_CURVE_TTL_DAYS: i64 = 1;

/// Store-through curve provider with external fallback.
pub struct CurveProvider<S: ?Sized> {
    store: Arc<S>,
    sources: Vec<Arc<dyn ExternalCurveSource>>,
    ttl_days: i64,
}

impl<S> CurveProvider<S>
where
    S: CurveStore + ?Sized,
{
    /// Creates a provider over the store with the given external sources
    /// (tried in order).
    pub fn new(store: Arc<S>, sources: Vec<Arc<dyn ExternalCurveSource>>) -> Self {
        Self {
            store,
            sources,
            ttl_days: DEFAULT_CURVE_TTL_DAYS,
        }
    }

    /// Overrides the external-curve TTL.
    #[must_use]
    pub fn with_ttl_days(mut self, ttl_days: i64) -> Self {
        self.ttl_days = ttl_days;
        self
    }

    /// Loads the composite curve for a benchmark, optional spread curve,
    /// and manual per-tenor overrides (bps).
    ///
    /// # Errors
    ///
    /// `CurveUnavailable` when a named curve cannot be resolved after all
    /// fallbacks; `Curve` when composite construction fails.
    pub async fn load_composite(
        &self,
        benchmark_name: &str,
        spread_name: Option<&str>,
        as_of: Date,
        manual_spreads: &BTreeMap<String, f64>,
    ) -> ProviderResult<CompositeCurve> {
        let benchmark = self.resolve_curve(benchmark_name, as_of).await?;
        let spread = match spread_name {
            Some(name) => Some(self.resolve_curve(name, as_of).await?),
            None => None,
        };
        Ok(CompositeCurve::build(
            &benchmark,
            spread.as_ref(),
            manual_spreads,
        )?)
    }

    /// Resolves one named curve through cache, external fetch, and stale
    /// fallback.
    pub async fn resolve_curve(&self, name: &str, as_of: Date) -> ProviderResult<Curve> {
        let cached = self.store.latest_curve(name, as_of).await?;

        if let Some(curve) = &cached {
            let stale = curve.source.is_external()
                && curve.curve_date.days_between(&as_of) > self.ttl_days;
            if !stale {
                debug!(name, %as_of, curve_date = %curve.curve_date, "curve cache hit");
                return Ok(curve.clone());
            }
        }

        for source in &self.sources {
            if let Some(fetched) = source.fetch_curve(name, as_of).await {
                info!(name, %as_of, source = %fetched.source, "fetched external curve");
                self.store.upsert_curve(&fetched).await?;
                return Ok(fetched);
            }
        }

        if let Some(stale) = cached {
            warn!(name, %as_of, curve_date = %stale.curve_date, "external fetch failed, using stale curve");
            return Ok(stale);
        }

        Err(ProviderError::CurveUnavailable {
            name: name.to_string(),
            as_of,
        })
    }
}
