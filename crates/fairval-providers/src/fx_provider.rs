//! FX rate provider.
//!
//! Resolution order: identity pair, direct store lookup, inverse store
//! lookup (reciprocal), external API (persisted on success). Stored rates
//! older than the TTL relative to the requested date fall through to the
//! external source, but remain the fallback when the fetch fails - callers
//! that can tolerate a stale rate get one rather than an error.

use std::sync::Arc;

use tracing::{debug, info, warn};

use fairval_core::types::{Currency, Date, FxRate};
use fairval_storage::FxRateStore;

use crate::error::{ProviderError, ProviderResult};
use crate::external::ExternalFxSource;

/// Default re-fetch TTL for stored FX rates, in days.
pub const DEFAULT_FX_TTL_DAYS: i64 = 1;

/// Store-through FX provider with external fallback.
pub struct FxProvider<S: ?Sized> {
    store: Arc<S>,
    source: Option<Arc<dyn ExternalFxSource>>,
    ttl_days: i64,
}

impl<S> FxProvider<S>
where
    S: FxRateStore + ?Sized,
{
    /// Creates a provider over the store with an optional external source.
    pub fn new(store: Arc<S>, source: Option<Arc<dyn ExternalFxSource>>) -> Self {
        Self {
            store,
            source,
            ttl_days: DEFAULT_FX_TTL_DAYS,
        }
    }

    /// Overrides the stored-rate TTL.
    #[must_use]
    pub fn with_ttl_days(mut self, ttl_days: i64) -> Self {
        self.ttl_days = ttl_days;
        self
    }

    /// Resolves the rate converting `from` into `to` as of `as_of`.
    ///
    /// # Errors
    ///
    /// `FxUnavailable` when no resolution step produces a rate.
    pub async fn rate(&self, from: Currency, to: Currency, as_of: Date) -> ProviderResult<FxRate> {
        if from == to {
            return Ok(FxRate::identity(from, as_of));
        }

        let direct = self.store.latest_rate(from, to, as_of).await?;
        if let Some(rate) = &direct {
            if self.is_fresh(rate, as_of) {
                debug!(%from, %to, rate = rate.rate, "FX direct store hit");
                return Ok(rate.clone());
            }
        }

        let inverse = self.store.latest_rate(to, from, as_of).await?;
        if let Some(rate) = &inverse {
            if self.is_fresh(rate, as_of) {
                debug!(%from, %to, rate = rate.rate, "FX inverse store hit");
                return Ok(rate.inverted());
            }
        }

        if let Some(source) = &self.source {
            if let Some(fetched) = source.fetch_rate(from, to, as_of).await {
                info!(%from, %to, rate = fetched.rate, "fetched external FX rate");
                self.store.upsert_rate(&fetched).await?;
                return Ok(fetched);
            }
        }

        // Stale rates are better than no rate once the fetch has failed.
        if let Some(rate) = direct {
            warn!(%from, %to, rate_date = %rate.rate_date, "using stale direct FX rate");
            return Ok(rate);
        }
        if let Some(rate) = inverse {
            warn!(%from, %to, rate_date = %rate.rate_date, "using stale inverse FX rate");
            return Ok(rate.inverted());
        }

        Err(ProviderError::FxUnavailable { from, to, as_of })
    }

    fn is_fresh(&self, rate: &FxRate, as_of: Date) -> bool {
        rate.rate_date.days_between(&as_of) <= self.ttl_days
    }
}
