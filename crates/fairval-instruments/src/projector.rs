//! Cash-flow projector.
//!
//! Loads a security (inheriting the owning asset class's classification),
//! dispatches to the family engine, merges the generated flows with stored
//! realized/defaulted flows, and classifies the result against the
//! valuation date. Stored flows are authoritative: a generated flow is kept
//! only when no stored flow matches its `(date, type, amount)` triple.

use std::sync::Arc;

use tracing::debug;

use fairval_core::types::{CashFlowSummary, Date, ProjectedCashFlow, Security, SecurityId};
use fairval_storage::{CashFlowStore, PositionStore, SecurityStore};

use crate::engines;
use crate::error::{InstrumentError, InstrumentResult};

/// Output of a projection: the loaded security, both flow lists, the merged
/// chronological list, and the summary.
#[derive(Debug, Clone)]
pub struct ProjectionResult {
    /// The security, with the inherited classification applied.
    pub security: Security,
    /// Stored flows (realized/defaulted markers), sorted by date.
    pub existing: Vec<ProjectedCashFlow>,
    /// Engine-generated flows, sorted by date.
    pub projected: Vec<ProjectedCashFlow>,
    /// Merged list, stored flows authoritative, sorted chronologically.
    pub all_sorted: Vec<ProjectedCashFlow>,
    /// Counts and next payment over the merged list.
    pub summary: CashFlowSummary,
}

/// Cash-flow projector over a storage backend.
pub struct Projector<S: ?Sized> {
    store: Arc<S>,
}

impl<S> Projector<S>
where
    S: SecurityStore + PositionStore + CashFlowStore + ?Sized,
{
    /// Creates a projector over the store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Projects the merged flow list for a security as of `valuation_date`.
    ///
    /// # Errors
    ///
    /// - `InstrumentError::SecurityNotFound` when the security is missing
    /// - `InstrumentError::UnsupportedInstrument` when no engine routes
    /// - storage errors loading inputs
    pub async fn project(
        &self,
        security_id: &SecurityId,
        valuation_date: Date,
    ) -> InstrumentResult<ProjectionResult> {
        let mut security = self
            .store
            .get_security(security_id)
            .await?
            .ok_or_else(|| InstrumentError::SecurityNotFound {
                id: security_id.as_str().to_string(),
            })?;

        if security.classification.is_none() {
            security.classification = self.inherited_classification(security_id).await?;
        }

        let projected = engines::project_flows(&security, valuation_date)?;
        let existing = self.store.stored_flows(security_id).await?;

        let mut all_sorted: Vec<ProjectedCashFlow> = existing.clone();
        all_sorted.extend(
            projected
                .iter()
                .filter(|g| !existing.iter().any(|s| s.same_payment(g)))
                .cloned(),
        );
        all_sorted.sort_by_key(|f| f.flow_date);

        debug!(
            security = %security_id,
            generated = projected.len(),
            stored = existing.len(),
            merged = all_sorted.len(),
            "projected cash flows"
        );

        let summary = summarize(&all_sorted, valuation_date);

        Ok(ProjectionResult {
            security,
            existing,
            projected,
            all_sorted,
            summary,
        })
    }

    /// Classification of the asset class owning the security's position.
    async fn inherited_classification(
        &self,
        security_id: &SecurityId,
    ) -> InstrumentResult<Option<fairval_core::types::Classification>> {
        let Some(position) = self.store.position_for_security(security_id).await? else {
            return Ok(None);
        };
        let Some(asset_class) = self.store.get_asset_class(&position.asset_class_id).await? else {
            return Ok(None);
        };
        Ok(asset_class.classification)
    }
}

/// Counts and next payment for a merged flow list.
fn summarize(flows: &[ProjectedCashFlow], valuation_date: Date) -> CashFlowSummary {
    let past = flows.iter().filter(|f| f.flow_date <= valuation_date).count();
    CashFlowSummary {
        total: flows.len(),
        past,
        future: flows.len() - past,
        defaulted: flows.iter().filter(|f| f.is_defaulted).count(),
        realized: flows.iter().filter(|f| f.is_realized).count(),
        next_payment: flows
            .iter()
            .filter(|f| f.flow_date > valuation_date)
            .map(|f| f.flow_date)
            .min(),
    }
}
