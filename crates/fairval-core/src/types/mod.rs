//! Domain types for the valuation core.

mod cashflow;
mod currency;
mod curve;
mod date;
mod discount_spec;
mod frequency;
mod fx;
mod ids;
mod position;
mod run;
mod security;
mod tenor;

pub use cashflow::{CashFlowSummary, FlowType, PaymentStatus, ProjectedCashFlow};
pub use currency::Currency;
pub use curve::{Curve, CurvePoint, CurveSource, CurveType};
pub use date::Date;
pub use discount_spec::{DiscountSpec, IfrsLevel, StandingSpreads, DEFAULT_SPREAD_KEY};
pub use frequency::Frequency;
pub use fx::FxRate;
pub use ids::{RunId, SecurityId};
pub use position::{AssetClass, Portfolio, Position, PositionStatus};
pub use run::{
    AuditEntry, CalculationStep, DiscountStepData, PriceResult, RunStatus, RunType, StepData,
    StepType, ValuationRun,
};
pub use security::{
    AmortizationEntry, CallPutEntry, Classification, InstrumentType, Security, StepEntry,
};
pub use tenor::{Tenor, TenorUnit};
