//! # Fairval Pricing
//!
//! Discounted cash-flow fair-value engine.
//!
//! [`dcf::value`] turns a security, its merged flow list, and a composite
//! curve into a present value, accrued interest, dirty value, unrealized
//! G/L, risk metrics, and one auditable discount step per future flow.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod dcf;
pub mod metrics;
pub mod ytm;

pub use dcf::{discount_factor, value, ValuationInput, ValuationMetrics, ValuationOutput};
pub use ytm::yield_to_maturity;
