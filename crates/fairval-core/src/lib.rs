//! # Fairval Core
//!
//! Core types, day count conventions, and schedule utilities for the Fairval
//! fixed-income valuation platform.
//!
//! This crate provides the foundational building blocks used throughout
//! Fairval:
//!
//! - **Types**: the persistent data model - securities, positions, projected
//!   cash flows, curves, FX rates, discount specifications, valuation runs,
//!   price results, calculation steps, and audit entries
//! - **Day count conventions**: six industry conventions behind one trait
//! - **Schedules**: coupon-date generation and accrued-interest math
//!
//! ## Example
//!
//! ```rust
//! use fairval_core::daycounts::DayCountConvention;
//! use fairval_core::types::{Date, Frequency};
//!
//! let start = Date::from_ymd(2025, 1, 15).unwrap();
//! let end = Date::from_ymd(2025, 7, 15).unwrap();
//! let yf = DayCountConvention::Thirty360US.year_fraction(start, end, Frequency::SemiAnnual);
//! assert!((yf - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod daycounts;
pub mod error;
pub mod schedule;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::daycounts::{DayCount, DayCountConvention};
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::types::{
        Classification, Currency, Curve, CurvePoint, Date, DiscountSpec, FlowType, Frequency,
        FxRate, IfrsLevel, InstrumentType, PriceResult, ProjectedCashFlow, RunId, RunStatus,
        RunType, Security, SecurityId, Tenor, ValuationRun,
    };
}

pub use error::{CoreError, CoreResult};
pub use types::{Currency, Date, SecurityId};
