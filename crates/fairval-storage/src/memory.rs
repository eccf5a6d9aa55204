//! In-memory store.
//!
//! Reference implementation of every storage trait. Thread-safe through
//! `parking_lot::RwLock`; data does not survive the process. Used by the
//! test suites and as the semantic model for real backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use fairval_core::types::{
    AssetClass, AuditEntry, CalculationStep, Curve, Currency, Date, DiscountSpec, FxRate, Portfolio,
    Position, PriceResult, ProjectedCashFlow, RunId, Security, SecurityId, ValuationRun,
};

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    AuditStore, CashFlowStore, CurveStore, DiscountSpecStore, FxRateStore, PositionStore, RunStore,
    SecurityStore,
};

/// In-memory storage backend.
///
/// # Example
///
/// ```rust
/// use fairval_storage::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// store.clear();
/// ```
#[derive(Default)]
pub struct InMemoryStore {
    securities: RwLock<HashMap<SecurityId, Security>>,
    positions: RwLock<Vec<Position>>,
    asset_classes: RwLock<HashMap<String, AssetClass>>,
    portfolios: RwLock<HashMap<String, Portfolio>>,
    flows: RwLock<Vec<ProjectedCashFlow>>,
    curves: RwLock<Vec<Curve>>,
    fx_rates: RwLock<Vec<FxRate>>,
    specs: RwLock<HashMap<SecurityId, DiscountSpec>>,
    runs: RwLock<HashMap<String, ValuationRun>>,
    results: RwLock<Vec<PriceResult>>,
    steps: RwLock<Vec<CalculationStep>>,
    audit: RwLock<Vec<AuditEntry>>,
    /// Number of upcoming `insert_result` calls to fail with a transient
    /// error. Test hook for the orchestrator's retry path.
    transient_insert_failures: AtomicUsize,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all data.
    pub fn clear(&self) {
        self.securities.write().clear();
        self.positions.write().clear();
        self.asset_classes.write().clear();
        self.portfolios.write().clear();
        self.flows.write().clear();
        self.curves.write().clear();
        self.fx_rates.write().clear();
        self.specs.write().clear();
        self.runs.write().clear();
        self.results.write().clear();
        self.steps.write().clear();
        self.audit.write().clear();
    }

    /// Makes the next `n` `insert_result` calls fail with
    /// `StorageError::Transient`. Test hook.
    pub fn fail_next_result_inserts(&self, n: usize) {
        self.transient_insert_failures.store(n, Ordering::SeqCst);
    }

    fn asset_class_ids_for_portfolio(&self, portfolio_id: &str) -> Vec<String> {
        self.asset_classes
            .read()
            .values()
            .filter(|ac| ac.portfolio_id == portfolio_id)
            .map(|ac| ac.id.clone())
            .collect()
    }
}

#[async_trait]
impl SecurityStore for InMemoryStore {
    async fn get_security(&self, id: &SecurityId) -> StorageResult<Option<Security>> {
        Ok(self.securities.read().get(id).cloned())
    }

    async fn save_security(&self, security: &Security) -> StorageResult<()> {
        self.securities
            .write()
            .insert(security.id.clone(), security.clone());
        Ok(())
    }
}

#[async_trait]
impl PositionStore for InMemoryStore {
    async fn active_positions_in_portfolio(
        &self,
        portfolio_id: &str,
    ) -> StorageResult<Vec<Position>> {
        let class_ids = self.asset_class_ids_for_portfolio(portfolio_id);
        Ok(self
            .positions
            .read()
            .iter()
            .filter(|p| p.is_active() && class_ids.contains(&p.asset_class_id))
            .cloned()
            .collect())
    }

    async fn active_positions_in_fund(&self, fund_id: &str) -> StorageResult<Vec<Position>> {
        let portfolio_ids: Vec<String> = self
            .portfolios
            .read()
            .values()
            .filter(|p| p.fund_id == fund_id)
            .map(|p| p.id.clone())
            .collect();

        let mut positions = Vec::new();
        for pid in portfolio_ids {
            positions.extend(self.active_positions_in_portfolio(&pid).await?);
        }
        Ok(positions)
    }

    async fn position_for_security(
        &self,
        security_id: &SecurityId,
    ) -> StorageResult<Option<Position>> {
        Ok(self
            .positions
            .read()
            .iter()
            .find(|p| &p.security_id == security_id)
            .cloned())
    }

    async fn get_asset_class(&self, id: &str) -> StorageResult<Option<AssetClass>> {
        Ok(self.asset_classes.read().get(id).cloned())
    }

    async fn save_position(&self, position: &Position) -> StorageResult<()> {
        let mut positions = self.positions.write();
        if let Some(existing) = positions.iter_mut().find(|p| p.id == position.id) {
            *existing = position.clone();
        } else {
            positions.push(position.clone());
        }
        Ok(())
    }

    async fn save_asset_class(&self, asset_class: &AssetClass) -> StorageResult<()> {
        self.asset_classes
            .write()
            .insert(asset_class.id.clone(), asset_class.clone());
        Ok(())
    }

    async fn save_portfolio(&self, portfolio: &Portfolio) -> StorageResult<()> {
        self.portfolios
            .write()
            .insert(portfolio.id.clone(), portfolio.clone());
        Ok(())
    }
}

#[async_trait]
impl CashFlowStore for InMemoryStore {
    async fn stored_flows(
        &self,
        security_id: &SecurityId,
    ) -> StorageResult<Vec<ProjectedCashFlow>> {
        let mut flows: Vec<ProjectedCashFlow> = self
            .flows
            .read()
            .iter()
            .filter(|f| &f.security_id == security_id)
            .cloned()
            .collect();
        flows.sort_by_key(|f| f.flow_date);
        Ok(flows)
    }

    async fn save_flow(&self, flow: &ProjectedCashFlow) -> StorageResult<()> {
        self.flows.write().push(flow.clone());
        Ok(())
    }
}

#[async_trait]
impl CurveStore for InMemoryStore {
    async fn latest_curve(&self, name: &str, as_of: Date) -> StorageResult<Option<Curve>> {
        Ok(self
            .curves
            .read()
            .iter()
            .filter(|c| c.name == name && c.curve_date <= as_of)
            .max_by_key(|c| c.curve_date)
            .cloned())
    }

    async fn upsert_curve(&self, curve: &Curve) -> StorageResult<()> {
        let mut curves = self.curves.write();
        if let Some(existing) = curves.iter_mut().find(|c| {
            c.name == curve.name && c.curve_date == curve.curve_date && c.source == curve.source
        }) {
            *existing = curve.clone();
        } else {
            curves.push(curve.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl FxRateStore for InMemoryStore {
    async fn latest_rate(
        &self,
        from: Currency,
        to: Currency,
        as_of: Date,
    ) -> StorageResult<Option<FxRate>> {
        Ok(self
            .fx_rates
            .read()
            .iter()
            .filter(|r| r.from_currency == from && r.to_currency == to && r.rate_date <= as_of)
            .max_by_key(|r| r.rate_date)
            .cloned())
    }

    async fn upsert_rate(&self, rate: &FxRate) -> StorageResult<()> {
        let mut rates = self.fx_rates.write();
        if let Some(existing) = rates.iter_mut().find(|r| {
            r.from_currency == rate.from_currency
                && r.to_currency == rate.to_currency
                && r.rate_date == rate.rate_date
        }) {
            *existing = rate.clone();
        } else {
            rates.push(rate.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl DiscountSpecStore for InMemoryStore {
    async fn get_spec(&self, security_id: &SecurityId) -> StorageResult<Option<DiscountSpec>> {
        Ok(self.specs.read().get(security_id).cloned())
    }

    async fn save_spec(&self, spec: &DiscountSpec) -> StorageResult<()> {
        self.specs
            .write()
            .insert(spec.security_id.clone(), spec.clone());
        Ok(())
    }

    async fn delete_spec(&self, security_id: &SecurityId) -> StorageResult<bool> {
        Ok(self.specs.write().remove(security_id).is_some())
    }
}

#[async_trait]
impl RunStore for InMemoryStore {
    async fn create_run(&self, run: &ValuationRun) -> StorageResult<()> {
        self.runs
            .write()
            .insert(run.run_id.as_str().to_string(), run.clone());
        Ok(())
    }

    async fn update_run(&self, run: &ValuationRun) -> StorageResult<()> {
        let mut runs = self.runs.write();
        if !runs.contains_key(run.run_id.as_str()) {
            return Err(StorageError::not_found("Run", run.run_id.as_str()));
        }
        runs.insert(run.run_id.as_str().to_string(), run.clone());
        Ok(())
    }

    async fn get_run(&self, run_id: &RunId) -> StorageResult<Option<ValuationRun>> {
        Ok(self.runs.read().get(run_id.as_str()).cloned())
    }

    async fn insert_result(
        &self,
        result: &PriceResult,
        steps: &[CalculationStep],
        audit: &AuditEntry,
    ) -> StorageResult<()> {
        // Test hook: simulate a transient transaction failure.
        let remaining = self.transient_insert_failures.load(Ordering::SeqCst);
        if remaining > 0
            && self
                .transient_insert_failures
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(StorageError::Transient(
                "injected transaction failure".to_string(),
            ));
        }

        // Take all locks before mutating anything so the write is atomic
        // with respect to readers of any one table.
        let mut results = self.results.write();
        let mut all_steps = self.steps.write();
        let mut audit_log = self.audit.write();

        if results
            .iter()
            .any(|r| r.run_id == result.run_id && r.security_id == result.security_id)
        {
            return Err(StorageError::Constraint(format!(
                "duplicate price result for run {} security {}",
                result.run_id, result.security_id
            )));
        }

        results.push(result.clone());
        all_steps.extend_from_slice(steps);
        audit_log.push(audit.clone());
        Ok(())
    }

    async fn results_for_run(&self, run_id: &RunId) -> StorageResult<Vec<PriceResult>> {
        Ok(self
            .results
            .read()
            .iter()
            .filter(|r| &r.run_id == run_id)
            .cloned()
            .collect())
    }

    async fn steps_for(
        &self,
        run_id: &RunId,
        security_id: &SecurityId,
    ) -> StorageResult<Vec<CalculationStep>> {
        let mut steps: Vec<CalculationStep> = self
            .steps
            .read()
            .iter()
            .filter(|s| &s.run_id == run_id && &s.security_id == security_id)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.step_order);
        Ok(steps)
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn append_audit(&self, entry: &AuditEntry) -> StorageResult<()> {
        self.audit.write().push(entry.clone());
        Ok(())
    }

    async fn audit_for_run(&self, run_id: &RunId) -> StorageResult<Vec<AuditEntry>> {
        Ok(self
            .audit
            .read()
            .iter()
            .filter(|e| e.run_id.as_ref() == Some(run_id))
            .cloned()
            .collect())
    }
}
