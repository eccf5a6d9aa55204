//! # Fairval Providers
//!
//! Curve and FX providers with store-through caching.
//!
//! - [`curve_provider::CurveProvider`]: composite curve loading (store ->
//!   external fetch -> stale fallback) with a configurable TTL for
//!   externally sourced curves
//! - [`fx_provider::FxProvider`]: FX resolution (identity -> direct ->
//!   inverse -> external)
//! - [`external`]: the external source contracts and the HTTP clients
//!   (Treasury/corporate curve API, generic market-data API, FX API)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod curve_provider;
pub mod error;
pub mod external;
pub mod fx_provider;

pub use curve_provider::{CurveProvider, DEFAULT_CURVE_TTL_DAYS};
pub use error::{ProviderError, ProviderResult};
pub use external::{
    CurveEndpoint, CurveNameMap, ExternalCurveSource, ExternalFxSource, FxApiClient, FxApiFlavor,
    MarketDataApiClient, TreasuryApiClient,
};
pub use fx_provider::{FxProvider, DEFAULT_FX_TTL_DAYS};
