//! Error types for projection.

use thiserror::Error;

use fairval_core::error::CoreError;
use fairval_core::types::InstrumentType;
use fairval_storage::StorageError;

/// A specialized Result type for projection operations.
pub type InstrumentResult<T> = Result<T, InstrumentError>;

/// Errors arising from cash-flow projection.
#[derive(Error, Debug)]
pub enum InstrumentError {
    /// Security does not exist.
    #[error("Security not found: {id}")]
    SecurityNotFound {
        /// The missing security ID.
        id: String,
    },

    /// No engine serves the `(classification, instrument_type)` combination.
    /// A per-security failure; the run continues.
    #[error("No projection engine for instrument type '{instrument_type}'")]
    UnsupportedInstrument {
        /// The unroutable instrument type.
        instrument_type: InstrumentType,
    },

    /// Validation failure from the core types.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Store failure while loading inputs.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
