//! End-to-end orchestrator tests over the in-memory store.

use std::sync::Arc;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::Utc;

use fairval_core::daycounts::DayCountConvention;
use fairval_core::types::{
    AmortizationEntry, AssetClass, Classification, Currency, Curve, CurvePoint, CurveSource,
    CurveType, Date, FxRate, Frequency, InstrumentType, Portfolio, Position, PositionStatus,
    RunStatus, RunType, Security, SecurityId, StepEntry,
};
use fairval_engine::{EngineConfig, EngineError, Orchestrator, RunOptions, RunRequest};
use fairval_instruments::Projector;
use fairval_storage::{
    AuditStore, CurveStore, FxRateStore, InMemoryStore, PositionStore, RunStore, SecurityStore,
};

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

fn fixed_bond(id: &str) -> Security {
    Security::new(
        id,
        "5% Jan 2025",
        InstrumentType::BondFixed,
        Currency::USD,
        DayCountConvention::Thirty360US,
        5.0,
        Frequency::SemiAnnual,
        d(2020, 1, 15),
        d(2025, 1, 15),
        100.0,
    )
}

fn flat_curve(name: &str, rate: f64, date: Date) -> Curve {
    Curve {
        name: name.to_string(),
        curve_date: date,
        source: CurveSource::Manual,
        currency: Currency::USD,
        curve_type: CurveType::Zero,
        points: vec![CurvePoint::from_years(10.0, rate)],
    }
}

async fn seed_position(store: &InMemoryStore, portfolio_id: &str, security_id: &str, book: f64) {
    let asset_class_id = format!("{portfolio_id}-bonds");
    store
        .save_asset_class(&AssetClass {
            id: asset_class_id.clone(),
            portfolio_id: portfolio_id.to_string(),
            name: "Bonds".into(),
            classification: Some(Classification::Bond),
        })
        .await
        .unwrap();
    store
        .save_position(&Position {
            id: format!("pos-{security_id}"),
            security_id: SecurityId::new(security_id),
            asset_class_id,
            quantity: 1.0,
            book_value: Some(book),
            cost_basis: Some(book),
            acquisition_date: Some(d(2022, 1, 1)),
            status: PositionStatus::Active,
        })
        .await
        .unwrap();
}

fn orchestrator(store: &Arc<InMemoryStore>) -> Orchestrator<InMemoryStore> {
    Orchestrator::new(store.clone(), EngineConfig::default())
}

fn security_request(target: &str, valuation: Date, benchmark: &str) -> RunRequest {
    RunRequest {
        run_type: RunType::Security,
        target_id: target.to_string(),
        valuation_date: valuation,
        user_id: Some("tester".into()),
        options: RunOptions {
            benchmark_curve_name: Some(benchmark.to_string()),
            ..RunOptions::default()
        },
    }
}

// ---------------------------------------------------------------------------
// Single-security scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fixed_bond_on_flat_curve() {
    let store = Arc::new(InMemoryStore::new());
    store.save_security(&fixed_bond("A")).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let outcome = orchestrator(&store)
        .run_valuation(security_request("A", d(2023, 1, 15), "UST"))
        .await
        .unwrap();

    assert_eq!(outcome.run.status, RunStatus::Completed);
    assert_eq!(outcome.run.progress, 100);
    assert_eq!(outcome.results.len(), 1);
    assert!(outcome.errors.is_empty());

    let valuation = &outcome.results[0];
    // Four future coupons of 2.50 plus the redemption.
    assert_eq!(valuation.output.steps.len(), 5);
    assert_abs_diff_eq!(valuation.result.present_value, 100.0, epsilon = 0.25);
    assert_relative_eq!(valuation.result.accrued_interest, 0.0);
    assert_abs_diff_eq!(valuation.output.metrics.duration, 1.93, epsilon = 0.02);

    // Exactly one persisted price result with contiguous step orders.
    let results = store.results_for_run(&outcome.run.run_id).await.unwrap();
    assert_eq!(results.len(), 1);
    let steps = store
        .steps_for(&outcome.run.run_id, &SecurityId::new("A"))
        .await
        .unwrap();
    assert_eq!(steps.len(), 5);
    for (i, step) in steps.iter().enumerate() {
        assert_eq!(step.step_order, i as u32 + 1);
    }
}

#[tokio::test]
async fn weekend_coupon_dates_priced_unshifted() {
    // The 5% 2025 bond's 2023-07-15 coupon falls on a Saturday. The
    // pipeline discounts the contractual date; the weekend-forward shift
    // is a settlement-level utility and never moves projected flows.
    let store = Arc::new(InMemoryStore::new());
    store.save_security(&fixed_bond("A")).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let outcome = orchestrator(&store)
        .run_valuation(security_request("A", d(2023, 1, 15), "UST"))
        .await
        .unwrap();

    let saturday = d(2023, 7, 15);
    assert!(saturday.is_weekend());
    let shifted = saturday.next_business_day();
    assert_eq!(shifted, d(2023, 7, 17));

    let steps = &outcome.results[0].output.steps;
    assert_eq!(steps[0].flow_date, saturday);
    assert!(steps.iter().all(|s| s.flow_date != shifted));
}

#[tokio::test]
async fn zero_coupon_closed_form() {
    let store = Arc::new(InMemoryStore::new());
    let mut zero = fixed_bond("Z");
    zero.instrument_type = InstrumentType::BondZero;
    zero.coupon_rate = 0.0;
    zero.frequency = Frequency::Zero;
    zero.issue_date = d(2020, 1, 1);
    zero.maturity_date = d(2030, 1, 1);
    zero.face_value = 1000.0;
    store.save_security(&zero).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.04, d(2025, 1, 1)))
        .await
        .unwrap();

    let outcome = orchestrator(&store)
        .run_valuation(security_request("Z", d(2025, 1, 1), "UST"))
        .await
        .unwrap();

    let valuation = &outcome.results[0];
    let years = d(2025, 1, 1).days_between(&d(2030, 1, 1)) as f64 / 365.0;
    let expected = 1000.0 / (1.04_f64).powf(years);
    assert_relative_eq!(valuation.result.present_value, expected, epsilon = 1e-6);
    assert_abs_diff_eq!(valuation.result.present_value, 821.9271, epsilon = 0.15);
    assert_relative_eq!(valuation.result.accrued_interest, 0.0);
    assert_relative_eq!(valuation.output.metrics.duration, years, epsilon = 1e-9);
    assert_eq!(valuation.output.steps.len(), 1);
}

#[tokio::test]
async fn step_up_coupon_sequence() {
    let store = Arc::new(InMemoryStore::new());
    let mut stepper = fixed_bond("S");
    stepper.instrument_type = InstrumentType::BondStepUp;
    stepper.day_count = DayCountConvention::Act365;
    stepper.coupon_rate = 3.0;
    stepper.issue_date = d(2021, 7, 1);
    stepper.maturity_date = d(2026, 1, 1);
    stepper.step_schedule = vec![
        StepEntry {
            effective_date: d(2022, 1, 1),
            new_coupon: 3.0,
        },
        StepEntry {
            effective_date: d(2024, 1, 1),
            new_coupon: 5.0,
        },
    ];
    store.save_security(&stepper).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.04, d(2023, 6, 30)))
        .await
        .unwrap();

    let outcome = orchestrator(&store)
        .run_valuation(security_request("S", d(2023, 6, 30), "UST"))
        .await
        .unwrap();

    let coupons: Vec<f64> = outcome.results[0]
        .output
        .steps
        .iter()
        .filter(|s| s.cash_flow < 50.0)
        .map(|s| s.cash_flow)
        .collect();
    assert_eq!(coupons, vec![1.5, 1.5, 2.5, 2.5, 2.5, 2.5]);

    let redemption = outcome.results[0]
        .output
        .steps
        .iter()
        .find(|s| s.cash_flow >= 50.0)
        .unwrap();
    assert_relative_eq!(redemption.cash_flow, 100.0);
    assert_eq!(redemption.flow_date, d(2026, 1, 1));
}

#[tokio::test]
async fn amortizing_loan_projection_stable() {
    let store = Arc::new(InMemoryStore::new());
    let mut loan = fixed_bond("L");
    loan.instrument_type = InstrumentType::LoanAmortizing;
    loan.face_value = 1000.0;
    loan.issue_date = d(2024, 1, 1);
    loan.maturity_date = d(2025, 12, 31);
    loan.amortization_schedule = vec![
        AmortizationEntry {
            date: d(2024, 6, 30),
            principal: 250.0,
            interest: 10.0,
        },
        AmortizationEntry {
            date: d(2024, 12, 31),
            principal: 250.0,
            interest: 7.5,
        },
        AmortizationEntry {
            date: d(2025, 6, 30),
            principal: 250.0,
            interest: 5.0,
        },
        AmortizationEntry {
            date: d(2025, 12, 31),
            principal: 250.0,
            interest: 2.5,
        },
    ];
    store.save_security(&loan).await.unwrap();

    let projector = Projector::new(store.clone());
    let first = projector
        .project(&SecurityId::new("L"), d(2024, 1, 1))
        .await
        .unwrap();
    assert_eq!(first.all_sorted.len(), 4);
    assert!(first.all_sorted.iter().all(|f| !f.is_realized));

    // Re-projection leaves the merged list unchanged.
    let second = projector
        .project(&SecurityId::new("L"), d(2024, 1, 1))
        .await
        .unwrap();
    assert_eq!(first.all_sorted, second.all_sorted);

    let principal_total: f64 = loan.amortization_schedule.iter().map(|r| r.principal).sum();
    assert_relative_eq!(principal_total, 1000.0);
}

#[tokio::test]
async fn currency_conversion_to_reporting() {
    let store = Arc::new(InMemoryStore::new());
    let mut eur_bond = fixed_bond("E");
    eur_bond.currency = Currency::EUR;
    store.save_security(&eur_bond).await.unwrap();
    store
        .upsert_curve(&flat_curve("EUR_GOV", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();
    store
        .upsert_rate(&FxRate {
            from_currency: Currency::EUR,
            to_currency: Currency::USD,
            rate_date: d(2023, 1, 15),
            rate: 1.10,
            source: "manual".into(),
        })
        .await
        .unwrap();

    let mut request = security_request("E", d(2023, 1, 15), "EUR_GOV");
    request.options.reporting_currency = Some(Currency::USD);

    let outcome = orchestrator(&store).run_valuation(request).await.unwrap();
    let valuation = &outcome.results[0];

    // Fair value converted; PV and accrued stay in the security currency.
    assert_relative_eq!(
        valuation.result.fair_value,
        valuation.output.dirty_value * 1.10,
        epsilon = 1e-9
    );
    assert_eq!(valuation.result.currency, Currency::USD);
    assert_relative_eq!(
        valuation.result.present_value,
        valuation.output.present_value
    );
}

// ---------------------------------------------------------------------------
// Portfolio and fund runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn portfolio_partial_failure() {
    let store = Arc::new(InMemoryStore::new());

    store.save_security(&fixed_bond("A")).await.unwrap();
    // B is bond-classified with a loan instrument type: no engine routes it.
    let mut unsupported = fixed_bond("B");
    unsupported.instrument_type = InstrumentType::LoanTerm;
    unsupported.classification = Some(Classification::Bond);
    store.save_security(&unsupported).await.unwrap();

    store
        .save_portfolio(&Portfolio {
            id: "P".into(),
            fund_id: "F".into(),
            name: "Test portfolio".into(),
        })
        .await
        .unwrap();
    seed_position(&store, "P", "A", 98.0).await;
    seed_position(&store, "P", "B", 50.0).await;
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let request = RunRequest {
        run_type: RunType::Portfolio,
        target_id: "P".into(),
        valuation_date: d(2023, 1, 15),
        user_id: None,
        options: RunOptions {
            benchmark_curve_name: Some("UST".into()),
            ..RunOptions::default()
        },
    };
    let outcome = orchestrator(&store).run_valuation(request).await.unwrap();

    assert_eq!(outcome.run.status, RunStatus::CompletedWithErrors);
    assert_eq!(outcome.run.progress, 100);
    assert_eq!(outcome.run.completed_securities, 2);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].security_id, SecurityId::new("A"));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].security_id, SecurityId::new("B"));
    assert!(outcome.errors[0].error_message.contains("No projection engine"));

    // Per-security isolation: A's persisted rows are unaffected by B.
    let results = store.results_for_run(&outcome.run.run_id).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].security_id, SecurityId::new("A"));
    let steps = store
        .steps_for(&outcome.run.run_id, &SecurityId::new("A"))
        .await
        .unwrap();
    assert!(!steps.is_empty());
    assert!(store
        .steps_for(&outcome.run.run_id, &SecurityId::new("B"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn fund_run_spans_portfolios() {
    let store = Arc::new(InMemoryStore::new());
    for (portfolio, security) in [("P1", "A"), ("P2", "B")] {
        store.save_security(&fixed_bond(security)).await.unwrap();
        store
            .save_portfolio(&Portfolio {
                id: portfolio.into(),
                fund_id: "F".into(),
                name: portfolio.into(),
            })
            .await
            .unwrap();
        seed_position(&store, portfolio, security, 99.0).await;
    }
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let request = RunRequest {
        run_type: RunType::Fund,
        target_id: "F".into(),
        valuation_date: d(2023, 1, 15),
        user_id: None,
        options: RunOptions {
            benchmark_curve_name: Some("UST".into()),
            ..RunOptions::default()
        },
    };
    let outcome = orchestrator(&store).run_valuation(request).await.unwrap();

    assert_eq!(outcome.run.status, RunStatus::Completed);
    assert_eq!(outcome.run.total_securities, 2);
    assert_eq!(outcome.results.len(), 2);

    // Book values flow through from the positions.
    for valuation in &outcome.results {
        assert_eq!(valuation.result.book_value, Some(99.0));
        assert_relative_eq!(
            valuation.result.unrealized_gain_loss,
            valuation.output.dirty_value - 99.0,
            epsilon = 1e-9
        );
    }
}

#[tokio::test]
async fn empty_portfolio_is_no_targets() {
    let store = Arc::new(InMemoryStore::new());
    store
        .save_portfolio(&Portfolio {
            id: "P".into(),
            fund_id: "F".into(),
            name: "Empty".into(),
        })
        .await
        .unwrap();

    let request = RunRequest {
        run_type: RunType::Portfolio,
        target_id: "P".into(),
        valuation_date: d(2023, 1, 15),
        user_id: None,
        options: RunOptions::default(),
    };
    let err = orchestrator(&store).run_valuation(request).await.unwrap_err();
    assert!(matches!(err, EngineError::NoTargetsFound { .. }));
}

#[tokio::test]
async fn parallel_run_matches_serial() {
    let store = Arc::new(InMemoryStore::new());
    store
        .save_portfolio(&Portfolio {
            id: "P".into(),
            fund_id: "F".into(),
            name: "Wide".into(),
        })
        .await
        .unwrap();
    let ids: Vec<String> = (0..6).map(|i| format!("SEC-{i}")).collect();
    for id in &ids {
        store.save_security(&fixed_bond(id)).await.unwrap();
        seed_position(&store, "P", id, 100.0).await;
    }
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let request = |parallel: bool| RunRequest {
        run_type: RunType::Portfolio,
        target_id: "P".into(),
        valuation_date: d(2023, 1, 15),
        user_id: None,
        options: RunOptions {
            benchmark_curve_name: Some("UST".into()),
            parallel,
            concurrency: 4,
            ..RunOptions::default()
        },
    };

    let orchestrator = orchestrator(&store);
    let serial = orchestrator.run_valuation(request(false)).await.unwrap();
    let parallel = orchestrator.run_valuation(request(true)).await.unwrap();

    assert_eq!(serial.results.len(), 6);
    assert_eq!(parallel.results.len(), 6);
    assert_eq!(parallel.run.status, RunStatus::Completed);
    assert_eq!(parallel.run.progress, 100);

    // Same values regardless of execution mode (completion order may differ).
    for valuation in &parallel.results {
        let twin = serial
            .results
            .iter()
            .find(|v| v.security_id == valuation.security_id)
            .unwrap();
        assert_relative_eq!(
            valuation.result.present_value,
            twin.result.present_value,
            epsilon = 1e-12
        );
    }
}

// ---------------------------------------------------------------------------
// Failure semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_curve_fails_security_not_run() {
    let store = Arc::new(InMemoryStore::new());
    store.save_security(&fixed_bond("A")).await.unwrap();

    let outcome = orchestrator(&store)
        .run_valuation(security_request("A", d(2023, 1, 15), "NOPE"))
        .await
        .unwrap();

    assert_eq!(outcome.run.status, RunStatus::Failed);
    assert_eq!(outcome.run.progress, 100);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].error_message.contains("unavailable"));
    assert!(store
        .results_for_run(&outcome.run.run_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn transient_write_retried_once() {
    let store = Arc::new(InMemoryStore::new());
    store.save_security(&fixed_bond("A")).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();
    store.fail_next_result_inserts(1);

    let outcome = orchestrator(&store)
        .run_valuation(security_request("A", d(2023, 1, 15), "UST"))
        .await
        .unwrap();

    assert_eq!(outcome.run.status, RunStatus::Completed);
    assert_eq!(
        store.results_for_run(&outcome.run.run_id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn expired_deadline_skips_securities() {
    let store = Arc::new(InMemoryStore::new());
    store.save_security(&fixed_bond("A")).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let mut request = security_request("A", d(2023, 1, 15), "UST");
    request.options.deadline = Some(Utc::now() - chrono::Duration::seconds(1));

    let outcome = orchestrator(&store).run_valuation(request).await.unwrap();

    assert!(outcome.run.status.is_terminal());
    assert_eq!(outcome.run.progress, 100);
    assert!(outcome.results.is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].error_message.contains("deadline"));
}

#[tokio::test]
async fn run_record_lifecycle() {
    let store = Arc::new(InMemoryStore::new());
    store.save_security(&fixed_bond("A")).await.unwrap();
    store
        .upsert_curve(&flat_curve("UST", 0.05, d(2023, 1, 15)))
        .await
        .unwrap();

    let outcome = orchestrator(&store)
        .run_valuation(security_request("A", d(2023, 1, 15), "UST"))
        .await
        .unwrap();

    let stored = store.get_run(&outcome.run.run_id).await.unwrap().unwrap();
    assert_eq!(stored.status, RunStatus::Completed);
    assert_eq!(stored.progress, 100);
    assert_eq!(stored.total_securities, 1);
    assert_eq!(stored.completed_securities, 1);
    assert!(stored.completed_at.is_some());
    assert!(stored.error_message.is_none());
    assert_eq!(stored.created_by.as_deref(), Some("tester"));

    // Audit trail: start, per-security completion, run completion.
    let audit = store.audit_for_run(&outcome.run.run_id).await.unwrap();
    let actions: Vec<&str> = audit.iter().map(|e| e.action.as_str()).collect();
    assert!(actions.contains(&"valuation_started"));
    assert!(actions.contains(&"valuation_completed"));
    assert!(actions.contains(&"run_completed"));
}
