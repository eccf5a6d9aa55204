//! # Fairval Instruments
//!
//! Instrument cash-flow engines and the cash-flow projector.
//!
//! Nine instrument families are served by six engines (term, amortizing and
//! revolving loans share one; convertibles ride the fixed engine):
//!
//! - [`engines::fixed`], [`engines::zero`], [`engines::floating`],
//!   [`engines::inflation`], [`engines::step_up`], [`engines::loan`]
//!
//! The [`projector::Projector`] routes a security to its engine by
//! `(classification, instrument_type)`, merges the generated flows with
//! stored realized/defaulted flows, and summarizes the result.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod engines;
pub mod error;
pub mod projector;

pub use engines::{is_coupon_bearing, project_flows};
pub use error::{InstrumentError, InstrumentResult};
pub use projector::{ProjectionResult, Projector};
