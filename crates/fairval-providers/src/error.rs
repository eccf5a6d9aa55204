//! Error types for the provider pipelines.

use thiserror::Error;

use fairval_core::types::{Currency, Date};
use fairval_curves::CurveError;
use fairval_storage::StorageError;

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors from curve and FX resolution.
///
/// `CurveUnavailable` and `FxUnavailable` are per-security failures: the
/// orchestrator records them and the run continues. External-provider
/// timeouts never surface here; they are swallowed inside the sources and
/// the pipeline falls through to the next resolution step.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Named curve could not be resolved after all fallbacks.
    #[error("Curve '{name}' unavailable on {as_of}")]
    CurveUnavailable {
        /// The curve name.
        name: String,
        /// The requested date.
        as_of: Date,
    },

    /// FX rate could not be resolved after all fallbacks.
    #[error("FX rate {from}/{to} unavailable on {as_of}")]
    FxUnavailable {
        /// Source currency.
        from: Currency,
        /// Target currency.
        to: Currency,
        /// The requested date.
        as_of: Date,
    },

    /// Composite construction failed.
    #[error(transparent)]
    Curve(#[from] CurveError),

    /// Store failure during resolution.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
