//! Error types for the orchestrator.

use thiserror::Error;

use fairval_core::types::RunType;
use fairval_storage::StorageError;

/// A specialized Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that fail a whole run.
///
/// Per-security failures never surface here; they are collected in the run
/// outcome's error list. The orchestrator itself fails only on an empty
/// target expansion or a store failure outside the per-security path.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Target expanded to no securities.
    #[error("No securities found for {run_type:?} target '{target_id}'")]
    NoTargetsFound {
        /// The run scope.
        run_type: RunType,
        /// The expanded target.
        target_id: String,
    },

    /// Store failure on the run record or target expansion.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
