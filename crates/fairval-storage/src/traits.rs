//! Storage traits for the valuation core.
//!
//! Each trait covers one persistence concern; `ValuationStore` bundles them
//! for the orchestrator. Implementations are backends (SQL, in-memory, ...);
//! the reference semantics live in [`crate::memory::InMemoryStore`].
//!
//! Backends are expected to index: curves by `(name, date)`, curve points by
//! curve ordered by years, price results by `(security, date)`, calculation
//! steps by `(run, security)` ordered by `step_order`, and FX rates by
//! `(from, to, date)`.

use async_trait::async_trait;

use fairval_core::types::{
    AssetClass, AuditEntry, CalculationStep, Curve, Currency, Date, DiscountSpec, FxRate, Portfolio,
    Position, PriceResult, ProjectedCashFlow, RunId, Security, SecurityId, ValuationRun,
};

use crate::error::StorageResult;

/// Security reference-data storage.
#[async_trait]
pub trait SecurityStore: Send + Sync {
    /// Get a security by ID.
    async fn get_security(&self, id: &SecurityId) -> StorageResult<Option<Security>>;

    /// Upsert a security.
    async fn save_security(&self, security: &Security) -> StorageResult<()>;
}

/// Positions and the fund/portfolio/asset-class hierarchy.
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// Active positions across the portfolio's asset classes.
    async fn active_positions_in_portfolio(
        &self,
        portfolio_id: &str,
    ) -> StorageResult<Vec<Position>>;

    /// Active positions across all portfolios of the fund.
    async fn active_positions_in_fund(&self, fund_id: &str) -> StorageResult<Vec<Position>>;

    /// Any position holding the security (used to inherit the asset-class
    /// classification).
    async fn position_for_security(
        &self,
        security_id: &SecurityId,
    ) -> StorageResult<Option<Position>>;

    /// Asset class by ID.
    async fn get_asset_class(&self, id: &str) -> StorageResult<Option<AssetClass>>;

    /// Upsert a position.
    async fn save_position(&self, position: &Position) -> StorageResult<()>;

    /// Upsert an asset class.
    async fn save_asset_class(&self, asset_class: &AssetClass) -> StorageResult<()>;

    /// Upsert a portfolio.
    async fn save_portfolio(&self, portfolio: &Portfolio) -> StorageResult<()>;
}

/// Stored (realized/defaulted) cash flows.
#[async_trait]
pub trait CashFlowStore: Send + Sync {
    /// Stored flows for a security, any status.
    async fn stored_flows(&self, security_id: &SecurityId)
        -> StorageResult<Vec<ProjectedCashFlow>>;

    /// Persist one flow.
    async fn save_flow(&self, flow: &ProjectedCashFlow) -> StorageResult<()>;
}

/// Curve cache. A shared read-through cache: upserts are idempotent on
/// `(name, curve_date, source)` and concurrent writers of the same key
/// produce the same row (last write wins).
#[async_trait]
pub trait CurveStore: Send + Sync {
    /// Newest stored curve with the name dated on or before `as_of`.
    async fn latest_curve(&self, name: &str, as_of: Date) -> StorageResult<Option<Curve>>;

    /// Upsert a curve with its points.
    async fn upsert_curve(&self, curve: &Curve) -> StorageResult<()>;
}

/// FX rate cache. Upserts are idempotent on `(from, to, rate_date)`.
#[async_trait]
pub trait FxRateStore: Send + Sync {
    /// Newest stored rate for the pair dated on or before `as_of`.
    async fn latest_rate(
        &self,
        from: Currency,
        to: Currency,
        as_of: Date,
    ) -> StorageResult<Option<FxRate>>;

    /// Upsert a rate.
    async fn upsert_rate(&self, rate: &FxRate) -> StorageResult<()>;
}

/// Per-security discount specifications. At most one per security
/// (uniqueness constraint on `security_id`).
#[async_trait]
pub trait DiscountSpecStore: Send + Sync {
    /// Specification for a security, if any.
    async fn get_spec(&self, security_id: &SecurityId) -> StorageResult<Option<DiscountSpec>>;

    /// Upsert the specification for its security.
    async fn save_spec(&self, spec: &DiscountSpec) -> StorageResult<()>;

    /// Delete the specification. Idempotent; returns whether one existed.
    async fn delete_spec(&self, security_id: &SecurityId) -> StorageResult<bool>;
}

/// Valuation runs, price results, and calculation steps. Runs own their
/// results and steps (cascade delete).
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Insert a new run record.
    async fn create_run(&self, run: &ValuationRun) -> StorageResult<()>;

    /// Overwrite a run record (progress/status updates by the orchestrator).
    async fn update_run(&self, run: &ValuationRun) -> StorageResult<()>;

    /// Run by ID.
    async fn get_run(&self, run_id: &RunId) -> StorageResult<Option<ValuationRun>>;

    /// Atomically insert one security's price result, its ordered
    /// calculation steps, and the completion audit entry. The single
    /// transaction per security the valuation pipeline relies on.
    async fn insert_result(
        &self,
        result: &PriceResult,
        steps: &[CalculationStep],
        audit: &AuditEntry,
    ) -> StorageResult<()>;

    /// Price results for a run.
    async fn results_for_run(&self, run_id: &RunId) -> StorageResult<Vec<PriceResult>>;

    /// Calculation steps for `(run, security)` ordered by `step_order`.
    async fn steps_for(
        &self,
        run_id: &RunId,
        security_id: &SecurityId,
    ) -> StorageResult<Vec<CalculationStep>>;
}

/// Append-only audit log.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an entry.
    async fn append_audit(&self, entry: &AuditEntry) -> StorageResult<()>;

    /// Entries associated with a run.
    async fn audit_for_run(&self, run_id: &RunId) -> StorageResult<Vec<AuditEntry>>;
}

/// The full store surface the orchestrator requires.
pub trait ValuationStore:
    SecurityStore
    + PositionStore
    + CashFlowStore
    + CurveStore
    + FxRateStore
    + DiscountSpecStore
    + RunStore
    + AuditStore
{
}

impl<T> ValuationStore for T where
    T: SecurityStore
        + PositionStore
        + CashFlowStore
        + CurveStore
        + FxRateStore
        + DiscountSpecStore
        + RunStore
        + AuditStore
{
}
