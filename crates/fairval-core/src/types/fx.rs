//! FX rates.

use serde::{Deserialize, Serialize};

use crate::types::{Currency, Date};

/// An FX rate observation. Unique on `(from, to, rate_date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    /// Source currency.
    pub from_currency: Currency,
    /// Target currency.
    pub to_currency: Currency,
    /// Observation date.
    pub rate_date: Date,
    /// Units of `to` per unit of `from`.
    pub rate: f64,
    /// Provider label ("store", "inverse", external provider name, …).
    pub source: String,
}

impl FxRate {
    /// Identity rate for `from == to`.
    #[must_use]
    pub fn identity(currency: Currency, date: Date) -> Self {
        Self {
            from_currency: currency,
            to_currency: currency,
            rate_date: date,
            rate: 1.0,
            source: "identity".to_string(),
        }
    }

    /// The inverse observation (swapped pair, reciprocal rate).
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            from_currency: self.to_currency,
            to_currency: self.from_currency,
            rate_date: self.rate_date,
            rate: 1.0 / self.rate,
            source: self.source.clone(),
        }
    }
}
