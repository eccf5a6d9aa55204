//! Instrument cash-flow engines.
//!
//! One engine per instrument family. Every engine takes
//! `(security, valuation_date)` and returns projected flows sorted by date,
//! with `is_realized` set for flows on or before the valuation date. Engines
//! never consult stored realized/defaulted flows; that merge happens in the
//! projector.

pub mod fixed;
pub mod floating;
pub mod inflation;
pub mod loan;
pub mod step_up;
pub mod zero;

use fairval_core::types::{Classification, Date, InstrumentType, ProjectedCashFlow, Security};

use crate::error::{InstrumentError, InstrumentResult};

/// Routes a security to its engine.
///
/// A `loan` classification always routes to the loan engine regardless of
/// instrument type. Otherwise routing follows the instrument type; a
/// bond-classified security with a loan instrument type has no engine.
///
/// # Errors
///
/// Returns `InstrumentError::UnsupportedInstrument` for unroutable
/// combinations.
pub fn project_flows(
    security: &Security,
    valuation_date: Date,
) -> InstrumentResult<Vec<ProjectedCashFlow>> {
    if security.classification == Some(Classification::Loan) {
        return Ok(loan::project(security, valuation_date));
    }

    match security.instrument_type {
        InstrumentType::BondFixed | InstrumentType::BondConvertible => {
            Ok(fixed::project(security, valuation_date))
        }
        InstrumentType::BondZero => Ok(zero::project(security, valuation_date)),
        InstrumentType::BondFloating => Ok(floating::project(security, valuation_date)),
        InstrumentType::BondInflation => Ok(inflation::project(security, valuation_date)),
        InstrumentType::BondStepUp => Ok(step_up::project(security, valuation_date)),
        InstrumentType::LoanTerm
        | InstrumentType::LoanAmortizing
        | InstrumentType::LoanRevolving => {
            if security.classification == Some(Classification::Bond) {
                Err(InstrumentError::UnsupportedInstrument {
                    instrument_type: security.instrument_type,
                })
            } else {
                Ok(loan::project(security, valuation_date))
            }
        }
    }
}

/// Whether the family accrues coupon interest between payment dates.
#[must_use]
pub fn is_coupon_bearing(security: &Security) -> bool {
    security.instrument_type.is_bond()
        && !security.frequency.is_zero()
        && security.coupon_rate > 0.0
}
