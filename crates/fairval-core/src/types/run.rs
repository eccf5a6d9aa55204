//! Valuation runs, price results, calculation steps, and audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Currency, Date, IfrsLevel, RunId, SecurityId};

/// Scope of a valuation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Single security.
    Security,
    /// All active positions of a portfolio.
    Portfolio,
    /// All active positions of a fund's portfolios.
    Fund,
}

/// Lifecycle status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created but not started.
    Pending,
    /// In progress.
    Running,
    /// All securities valued.
    Completed,
    /// Some securities errored.
    CompletedWithErrors,
    /// Every security errored (or the orchestrator aborted).
    Failed,
}

impl RunStatus {
    /// True for terminal states.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::CompletedWithErrors | RunStatus::Failed
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::CompletedWithErrors => "completed_with_errors",
            RunStatus::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// One valuation run. Created `running` by the orchestrator, mutated only by
/// it, terminal once completed or failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRun {
    /// Run identifier.
    pub run_id: RunId,
    /// Scope of the run.
    pub run_type: RunType,
    /// Security/portfolio/fund id depending on `run_type`.
    pub target_id: String,
    /// Valuation date.
    pub valuation_date: Date,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Percent complete, 0..=100.
    pub progress: u8,
    /// Number of securities in scope.
    pub total_securities: usize,
    /// Number of securities attempted so far.
    pub completed_securities: usize,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Completion timestamp, once terminal.
    pub completed_at: Option<DateTime<Utc>>,
    /// Error summary, when securities errored.
    pub error_message: Option<String>,
    /// User who initiated the run.
    pub created_by: Option<String>,
}

/// Valuation output for one security in one run. Exactly one per
/// `(run, security)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    /// Owning run.
    pub run_id: RunId,
    /// Valued security.
    pub security_id: SecurityId,
    /// Valuation date.
    pub valuation_date: Date,
    /// Book value, if known.
    pub book_value: Option<f64>,
    /// Sum of discounted future flows (security currency).
    pub present_value: f64,
    /// Accrued interest (security currency).
    pub accrued_interest: f64,
    /// Dirty value, converted to the reporting currency when it differs.
    pub fair_value: f64,
    /// Fair value minus book value.
    pub unrealized_gain_loss: f64,
    /// Reporting currency of `fair_value`.
    pub currency: Currency,
    /// Fair-value hierarchy level.
    pub ifrs_level: IfrsLevel,
}

/// Step type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// Per-flow discounting step.
    Discount,
    /// Post-discount adjustment.
    Adjustment,
}

/// Payload of a discount step: everything needed to reproduce the number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountStepData {
    /// Flow date.
    pub flow_date: Date,
    /// Tenor label of the curve point used, if one matched.
    pub tenor: Option<String>,
    /// Years from valuation date to the flow (ACT/365).
    pub years: f64,
    /// Undiscounted flow amount.
    pub cash_flow: f64,
    /// Benchmark component of the rate.
    pub benchmark_rate: f64,
    /// Spread component of the rate.
    pub spread_rate: f64,
    /// Total discount rate.
    pub discount_rate: f64,
    /// 1 / (1 + rate)^years.
    pub discount_factor: f64,
    /// cash_flow x discount_factor.
    pub present_value: f64,
}

/// Step payload, discriminated by step type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepData {
    /// Discounting of one flow.
    Discount(DiscountStepData),
    /// Opaque adjustment payload.
    Adjustment(serde_json::Value),
}

/// One audit-trail calculation step. `step_order` starts at 1 with no gaps
/// per `(run, security)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    /// Owning run.
    pub run_id: RunId,
    /// Security the step belongs to.
    pub security_id: SecurityId,
    /// 1-based position in the step sequence.
    pub step_order: u32,
    /// Step type.
    pub step_type: StepType,
    /// Step payload.
    pub step_data: StepData,
}

/// Audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Run the entry relates to, if any.
    pub run_id: Option<RunId>,
    /// Security the entry relates to, if any.
    pub security_id: Option<SecurityId>,
    /// Action label (e.g. "valuation_completed").
    pub action: String,
    /// Opaque structured payload.
    pub details: serde_json::Value,
    /// User attribution.
    pub created_by: Option<String>,
}

impl AuditEntry {
    /// Creates an entry stamped now.
    #[must_use]
    pub fn now(
        run_id: Option<RunId>,
        security_id: Option<SecurityId>,
        action: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            run_id,
            security_id,
            action: action.into(),
            details,
            created_by: None,
        }
    }
}
