//! Error types for the Fairval core.

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The main error type for core validation and date/tenor handling.
///
/// These errors are fatal at the API boundary: a caller that submits an
/// invalid tenor, an unknown day count convention, or a malformed security
/// gets the error back immediately and nothing is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date calculations or invalid date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Tenor string does not match `<integer><D|W|M|Y>`.
    #[error("Invalid tenor: '{input}'")]
    InvalidTenor {
        /// The offending input.
        input: String,
    },

    /// Day count convention label is not recognised.
    #[error("Unknown day count convention: '{name}'")]
    UnknownDayCount {
        /// The unrecognised label.
        name: String,
    },

    /// Currency code is not recognised.
    #[error("Unknown currency: '{code}'")]
    UnknownCurrency {
        /// The unrecognised code.
        code: String,
    },

    /// Security failed invariant validation.
    #[error("Invalid security '{security_id}': {reason}")]
    InvalidSecurity {
        /// Identifier of the offending security.
        security_id: String,
        /// Description of the violated invariant.
        reason: String,
    },

    /// Discount specification failed validation.
    #[error("Invalid discount specification: {reason}")]
    InvalidDiscountSpec {
        /// Description of what's invalid.
        reason: String,
    },

    /// Generic input validation failure.
    #[error("Validation error: {reason}")]
    Validation {
        /// Description of the bad input.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid tenor error.
    #[must_use]
    pub fn invalid_tenor(input: impl Into<String>) -> Self {
        Self::InvalidTenor {
            input: input.into(),
        }
    }

    /// Creates an unknown day count error.
    #[must_use]
    pub fn unknown_day_count(name: impl Into<String>) -> Self {
        Self::UnknownDayCount { name: name.into() }
    }

    /// Creates an invalid security error.
    #[must_use]
    pub fn invalid_security(security_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSecurity {
            security_id: security_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a generic validation error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}
