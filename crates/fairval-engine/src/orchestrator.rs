//! Valuation run orchestrator.
//!
//! Expands a run target into a security set, fans the per-security pipeline
//! out over a bounded worker pool drawing from a shared queue, and persists
//! results, calculation steps, audit entries, and progress. Per-security
//! failures are collected and never abort the run.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use fairval_core::types::{
    AuditEntry, CalculationStep, CashFlowSummary, Currency, Date, PriceResult, RunId, RunStatus,
    RunType, SecurityId, StepData, StepType, ValuationRun,
};
use fairval_instruments::Projector;
use fairval_pricing::{value, ValuationInput, ValuationOutput};
use fairval_providers::{CurveProvider, FxProvider};
use fairval_storage::ValuationStore;

use crate::config::{EngineConfig, MAX_CONCURRENCY, MIN_CONCURRENCY};
use crate::error::{EngineError, EngineResult};
use crate::ifrs;

/// Backoff before the single retry of a transient result-write failure.
const STORE_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Per-run options supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Benchmark curve name; falls back to each security's discount spec.
    pub benchmark_curve_name: Option<String>,
    /// Spread curve name; falls back to each security's discount spec.
    pub spread_curve_name: Option<String>,
    /// Curve date; defaults to the valuation date.
    pub curve_date: Option<Date>,
    /// Reporting currency; defaults to the configured one.
    pub reporting_currency: Option<Currency>,
    /// Whether to use the worker pool.
    pub parallel: bool,
    /// Worker count, clamped to 1..=16. 0 means the configured default.
    pub concurrency: usize,
    /// Optional absolute deadline; workers check it between securities.
    pub deadline: Option<DateTime<Utc>>,
}

/// A valuation run request.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Scope of the run.
    pub run_type: RunType,
    /// Security/portfolio/fund id depending on the scope.
    pub target_id: String,
    /// Valuation date.
    pub valuation_date: Date,
    /// User attribution.
    pub user_id: Option<String>,
    /// Run options.
    pub options: RunOptions,
}

/// One successfully valued security.
#[derive(Debug, Clone)]
pub struct SecurityValuation {
    /// The valued security.
    pub security_id: SecurityId,
    /// The persisted price result.
    pub result: PriceResult,
    /// Full valuation output (metrics, steps, curve setup).
    pub output: ValuationOutput,
    /// Cash-flow summary from the projector.
    pub summary: CashFlowSummary,
}

/// One failed security.
#[derive(Debug, Clone)]
pub struct RunError {
    /// The failed security.
    pub security_id: SecurityId,
    /// Failure description.
    pub error_message: String,
}

/// Outcome of a run: the terminal run record plus per-security results and
/// errors. Results are in completion order, not input order.
#[derive(Debug)]
pub struct RunOutcome {
    /// Terminal run record.
    pub run: ValuationRun,
    /// Successfully valued securities.
    pub results: Vec<SecurityValuation>,
    /// Failed securities.
    pub errors: Vec<RunError>,
}

/// One unit of work: a security and the book value of its position.
#[derive(Debug, Clone)]
struct WorkItem {
    security_id: SecurityId,
    book_value: Option<f64>,
}

/// Immutable per-run context shared by the workers.
struct RunContext {
    run_id: RunId,
    valuation_date: Date,
    curve_date: Date,
    reporting_currency: Currency,
    benchmark_curve_name: Option<String>,
    spread_curve_name: Option<String>,
    deadline: Option<DateTime<Utc>>,
    user_id: Option<String>,
}

/// The valuation orchestrator.
///
/// Construct once per process from a store and configuration; the providers
/// and projector are built internally and shared across runs.
pub struct Orchestrator<S: ?Sized> {
    store: Arc<S>,
    curves: Arc<CurveProvider<S>>,
    fx: Arc<FxProvider<S>>,
    projector: Arc<Projector<S>>,
    config: EngineConfig,
}

impl<S: ?Sized> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            curves: self.curves.clone(),
            fx: self.fx.clone(),
            projector: self.projector.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> Orchestrator<S>
where
    S: ValuationStore + ?Sized + Send + Sync + 'static,
{
    /// Creates an orchestrator over the store with the given configuration.
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        let curves = Arc::new(
            CurveProvider::new(store.clone(), config.build_curve_sources())
                .with_ttl_days(config.curve_ttl_days),
        );
        let fx = Arc::new(
            FxProvider::new(store.clone(), config.build_fx_source())
                .with_ttl_days(config.fx_ttl_days),
        );
        let projector = Arc::new(Projector::new(store.clone()));
        Self {
            store,
            curves,
            fx,
            projector,
            config,
        }
    }

    /// Runs a valuation over the expanded target set.
    ///
    /// # Errors
    ///
    /// `NoTargetsFound` when the target expands to nothing, or a storage
    /// error on the run record itself. Per-security failures land in the
    /// outcome's error list instead.
    pub async fn run_valuation(&self, request: RunRequest) -> EngineResult<RunOutcome> {
        let items = self.expand_target(&request).await?;
        if items.is_empty() {
            return Err(EngineError::NoTargetsFound {
                run_type: request.run_type,
                target_id: request.target_id,
            });
        }
        let total = items.len();

        let run_id = RunId::generate();
        let run = ValuationRun {
            run_id: run_id.clone(),
            run_type: request.run_type,
            target_id: request.target_id.clone(),
            valuation_date: request.valuation_date,
            status: RunStatus::Running,
            progress: 0,
            total_securities: total,
            completed_securities: 0,
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
            created_by: request.user_id.clone(),
        };
        self.store.create_run(&run).await?;
        self.audit_best_effort(AuditEntry::now(
            Some(run_id.clone()),
            None,
            "valuation_started",
            json!({
                "run_type": request.run_type,
                "target_id": request.target_id.clone(),
                "total_securities": total,
            }),
        ))
        .await;
        info!(run_id = %run_id, total, "valuation run started");

        let ctx = Arc::new(RunContext {
            run_id: run_id.clone(),
            valuation_date: request.valuation_date,
            curve_date: request.options.curve_date.unwrap_or(request.valuation_date),
            reporting_currency: request
                .options
                .reporting_currency
                .unwrap_or(self.config.default_reporting_currency),
            benchmark_curve_name: request.options.benchmark_curve_name.clone(),
            spread_curve_name: request.options.spread_curve_name.clone(),
            deadline: request.options.deadline,
            user_id: request.user_id.clone(),
        });

        let queue = Arc::new(Mutex::new(items.into_iter().collect::<VecDeque<_>>()));
        let results = Arc::new(AsyncMutex::new(Vec::new()));
        let errors = Arc::new(AsyncMutex::new(Vec::new()));
        let run_state = Arc::new(AsyncMutex::new(run));

        let requested = if request.options.concurrency == 0 {
            self.config.default_concurrency
        } else {
            request.options.concurrency
        };
        let workers = if request.options.parallel {
            requested.clamp(MIN_CONCURRENCY, MAX_CONCURRENCY).min(total)
        } else {
            1
        };

        if workers <= 1 {
            self.drain_queue(&ctx, &queue, &run_state, &results, &errors)
                .await;
        } else {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let this = self.clone();
                let ctx = ctx.clone();
                let queue = queue.clone();
                let run_state = run_state.clone();
                let results = results.clone();
                let errors = errors.clone();
                handles.push(tokio::spawn(async move {
                    this.drain_queue(&ctx, &queue, &run_state, &results, &errors)
                        .await;
                }));
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(run_id = %run_id, error = %e, "valuation worker panicked");
                }
            }
        }

        let results = std::mem::take(&mut *results.lock().await);
        let errors = std::mem::take(&mut *errors.lock().await);

        let mut run = run_state.lock().await.clone();
        run.status = if results.is_empty() && !errors.is_empty() {
            RunStatus::Failed
        } else if !errors.is_empty() {
            RunStatus::CompletedWithErrors
        } else {
            RunStatus::Completed
        };
        run.progress = 100;
        run.completed_securities = total;
        run.completed_at = Some(Utc::now());
        run.error_message = if errors.is_empty() {
            None
        } else {
            Some(format!("{} of {} securities failed", errors.len(), total))
        };
        self.store.update_run(&run).await?;
        self.audit_best_effort(AuditEntry::now(
            Some(run_id.clone()),
            None,
            "run_completed",
            json!({
                "status": run.status,
                "results": results.len(),
                "errors": errors.len(),
            }),
        ))
        .await;
        info!(
            run_id = %run_id,
            status = %run.status,
            results = results.len(),
            errors = errors.len(),
            "valuation run finished"
        );

        Ok(RunOutcome {
            run,
            results,
            errors,
        })
    }

    /// Expands the run target into distinct work items with book values.
    async fn expand_target(&self, request: &RunRequest) -> EngineResult<Vec<WorkItem>> {
        let positions = match request.run_type {
            RunType::Security => {
                let security_id = SecurityId::new(request.target_id.clone());
                let book_value = self
                    .store
                    .position_for_security(&security_id)
                    .await?
                    .and_then(|p| p.book_value);
                return Ok(vec![WorkItem {
                    security_id,
                    book_value,
                }]);
            }
            RunType::Portfolio => {
                self.store
                    .active_positions_in_portfolio(&request.target_id)
                    .await?
            }
            RunType::Fund => self.store.active_positions_in_fund(&request.target_id).await?,
        };

        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for position in positions {
            if seen.insert(position.security_id.clone()) {
                items.push(WorkItem {
                    security_id: position.security_id,
                    book_value: position.book_value,
                });
            }
        }
        Ok(items)
    }

    /// Worker loop: pull from the shared queue until drained, recording
    /// outcomes and progress after each security.
    async fn drain_queue(
        &self,
        ctx: &Arc<RunContext>,
        queue: &Arc<Mutex<VecDeque<WorkItem>>>,
        run_state: &Arc<AsyncMutex<ValuationRun>>,
        results: &Arc<AsyncMutex<Vec<SecurityValuation>>>,
        errors: &Arc<AsyncMutex<Vec<RunError>>>,
    ) {
        loop {
            let item = { queue.lock().pop_front() };
            let Some(item) = item else { break };

            let past_deadline = ctx.deadline.is_some_and(|d| Utc::now() >= d);
            let outcome = if past_deadline {
                Err("run deadline exceeded; security skipped".to_string())
            } else {
                self.process_security(ctx, &item).await
            };

            match outcome {
                Ok(valuation) => results.lock().await.push(valuation),
                Err(error_message) => {
                    warn!(
                        run_id = %ctx.run_id,
                        security = %item.security_id,
                        error = %error_message,
                        "security valuation failed"
                    );
                    self.audit_best_effort(AuditEntry::now(
                        Some(ctx.run_id.clone()),
                        Some(item.security_id.clone()),
                        "valuation_failed",
                        json!({ "error": error_message.clone() }),
                    ))
                    .await;
                    errors.lock().await.push(RunError {
                        security_id: item.security_id.clone(),
                        error_message,
                    });
                }
            }

            let mut run = run_state.lock().await;
            run.completed_securities += 1;
            run.progress = ((run.completed_securities * 100) as f64
                / run.total_securities as f64)
                .round() as u8;
            if let Err(e) = self.store.update_run(&run).await {
                warn!(run_id = %ctx.run_id, error = %e, "progress update failed");
            }
        }
    }

    /// The per-security pipeline: spec, composite curve, projection, DCF,
    /// FX conversion, IFRS level, transactional persistence.
    async fn process_security(
        &self,
        ctx: &RunContext,
        item: &WorkItem,
    ) -> Result<SecurityValuation, String> {
        let spec = self
            .store
            .get_spec(&item.security_id)
            .await
            .map_err(|e| e.to_string())?;

        let benchmark_name = ctx
            .benchmark_curve_name
            .clone()
            .or_else(|| spec.as_ref().map(|s| s.benchmark_curve_name.clone()))
            .ok_or_else(|| "no benchmark curve configured".to_string())?;
        let spread_name = ctx
            .spread_curve_name
            .clone()
            .or_else(|| spec.as_ref().and_then(|s| s.spread_curve_name.clone()));
        let manual_spreads = spec
            .as_ref()
            .map(|s| s.manual_spreads.clone())
            .unwrap_or_default();

        let composite = self
            .curves
            .load_composite(
                &benchmark_name,
                spread_name.as_deref(),
                ctx.curve_date,
                &manual_spreads,
            )
            .await
            .map_err(|e| e.to_string())?;

        let projection = self
            .projector
            .project(&item.security_id, ctx.valuation_date)
            .await
            .map_err(|e| e.to_string())?;

        let output = value(&ValuationInput {
            security: &projection.security,
            flows: &projection.all_sorted,
            curve: &composite,
            valuation_date: ctx.valuation_date,
            book_value: item.book_value,
            include_accrued: true,
        });

        let security_currency = projection.security.currency;
        let mut fair_value = output.dirty_value;
        let mut result_currency = security_currency;
        if ctx.reporting_currency != security_currency {
            let fx = self
                .fx
                .rate(security_currency, ctx.reporting_currency, ctx.valuation_date)
                .await
                .map_err(|e| e.to_string())?;
            fair_value = output.dirty_value * fx.rate;
            result_currency = ctx.reporting_currency;
        }

        let ifrs_level = ifrs::classify(spec.as_ref(), &projection.security);

        let result = PriceResult {
            run_id: ctx.run_id.clone(),
            security_id: item.security_id.clone(),
            valuation_date: ctx.valuation_date,
            book_value: item.book_value,
            present_value: output.present_value,
            accrued_interest: output.accrued_interest,
            fair_value,
            unrealized_gain_loss: output.unrealized_gain_loss,
            currency: result_currency,
            ifrs_level,
        };

        let steps: Vec<CalculationStep> = output
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| CalculationStep {
                run_id: ctx.run_id.clone(),
                security_id: item.security_id.clone(),
                step_order: i as u32 + 1,
                step_type: StepType::Discount,
                step_data: StepData::Discount(step.clone()),
            })
            .collect();

        let mut audit = AuditEntry::now(
            Some(ctx.run_id.clone()),
            Some(item.security_id.clone()),
            "valuation_completed",
            json!({
                "curve_setup": output.curve_setup.clone(),
                "metrics": output.metrics,
                "summary": projection.summary.clone(),
                "fair_value": fair_value,
                "currency": result_currency,
            }),
        );
        audit.created_by = ctx.user_id.clone();

        // Single transaction per security, retried once on transient
        // store failure.
        if let Err(first) = self.store.insert_result(&result, &steps, &audit).await {
            if !first.is_transient() {
                return Err(first.to_string());
            }
            warn!(
                security = %item.security_id,
                error = %first,
                "transient result-write failure, retrying"
            );
            tokio::time::sleep(STORE_RETRY_BACKOFF).await;
            self.store
                .insert_result(&result, &steps, &audit)
                .await
                .map_err(|e| e.to_string())?;
        }

        Ok(SecurityValuation {
            security_id: item.security_id.clone(),
            result,
            output,
            summary: projection.summary,
        })
    }

    async fn audit_best_effort(&self, entry: AuditEntry) {
        if let Err(e) = self.store.append_audit(&entry).await {
            warn!(action = %entry.action, error = %e, "audit append failed");
        }
    }
}
