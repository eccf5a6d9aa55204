//! Positions and the fund/portfolio/asset-class hierarchy.

use serde::{Deserialize, Serialize};

use crate::types::{Classification, Date, SecurityId};

/// Lifecycle status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    /// Held; participates in portfolio/fund expansion.
    Active,
    /// Sold out.
    Sold,
    /// Issuer defaulted.
    Defaulted,
    /// Transferred to another book.
    Transferred,
    /// Reached maturity.
    Matured,
}

/// Ownership record linking a security to an asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Position identifier.
    pub id: String,
    /// The held security.
    pub security_id: SecurityId,
    /// Owning asset class.
    pub asset_class_id: String,
    /// Held quantity.
    pub quantity: f64,
    /// Current book value.
    pub book_value: Option<f64>,
    /// Original cost basis.
    pub cost_basis: Option<f64>,
    /// Acquisition date.
    pub acquisition_date: Option<Date>,
    /// Lifecycle status.
    pub status: PositionStatus,
}

impl Position {
    /// Whether the position participates in portfolio/fund expansion.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.status, PositionStatus::Active)
    }
}

/// Asset class within a portfolio. Securities inherit the classification of
/// the asset class their position belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClass {
    /// Asset class identifier.
    pub id: String,
    /// Owning portfolio.
    pub portfolio_id: String,
    /// Display name.
    pub name: String,
    /// Classification of securities in this asset class.
    pub classification: Option<Classification>,
}

/// Portfolio within a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Portfolio identifier.
    pub id: String,
    /// Owning fund.
    pub fund_id: String,
    /// Display name.
    pub name: String,
}
