//! Security reference data and family-specific schedules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::daycounts::DayCountConvention;
use crate::error::{CoreError, CoreResult};
use crate::types::{Currency, Date, Frequency, SecurityId};

/// Tolerance for the amortization-sums-to-face invariant: one currency unit.
const AMORTIZATION_TOLERANCE: f64 = 1.0;

/// Instrument family of a security.
///
/// The serialized labels (`bond_fixed`, `loan_term`, …) are the wire and
/// storage representation; `is_bond`/`is_loan` drive accrued-interest and
/// YTM eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentType {
    /// Fixed-coupon bond
    BondFixed,
    /// Zero-coupon bond
    BondZero,
    /// Floating-rate bond
    BondFloating,
    /// Inflation-linked bond
    BondInflation,
    /// Step-up bond
    BondStepUp,
    /// Convertible bond
    BondConvertible,
    /// Term loan
    LoanTerm,
    /// Amortizing loan
    LoanAmortizing,
    /// Revolving loan
    LoanRevolving,
}

impl InstrumentType {
    /// Storage label for the instrument type.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            InstrumentType::BondFixed => "bond_fixed",
            InstrumentType::BondZero => "bond_zero",
            InstrumentType::BondFloating => "bond_floating",
            InstrumentType::BondInflation => "bond_inflation",
            InstrumentType::BondStepUp => "bond_step_up",
            InstrumentType::BondConvertible => "bond_convertible",
            InstrumentType::LoanTerm => "loan_term",
            InstrumentType::LoanAmortizing => "loan_amortizing",
            InstrumentType::LoanRevolving => "loan_revolving",
        }
    }

    /// True for the bond families.
    #[must_use]
    pub fn is_bond(&self) -> bool {
        matches!(
            self,
            InstrumentType::BondFixed
                | InstrumentType::BondZero
                | InstrumentType::BondFloating
                | InstrumentType::BondInflation
                | InstrumentType::BondStepUp
                | InstrumentType::BondConvertible
        )
    }

    /// True for the loan families.
    #[must_use]
    pub fn is_loan(&self) -> bool {
        !self.is_bond()
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification inherited from the owning asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Bond-like asset class
    Bond,
    /// Loan-like asset class
    Loan,
}

/// One row of an amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// Payment date.
    pub date: Date,
    /// Principal repaid on the date.
    pub principal: f64,
    /// Interest paid on the date.
    pub interest: f64,
}

/// One row of a step-up coupon schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    /// First date the new coupon applies.
    pub effective_date: Date,
    /// New annual coupon in percent (e.g. 5.0 for 5%).
    pub new_coupon: f64,
}

/// One row of a call or put schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallPutEntry {
    /// Exercise date.
    pub date: Date,
    /// Exercise price per 100 face, if quoted.
    pub price: Option<f64>,
}

/// Immutable (within a run) description of one instrument.
///
/// Coupon rates and spreads are stored in percent (5.0 = 5%); curve rates
/// elsewhere are decimals. Family-specific fields are optional and only
/// consulted by the matching cash-flow engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    /// Primary identifier.
    pub id: SecurityId,
    /// Human-readable name.
    pub name: String,
    /// External identifier (ISIN/CUSIP/internal), if any.
    pub external_id: Option<String>,
    /// Instrument family.
    pub instrument_type: InstrumentType,
    /// Denomination currency.
    pub currency: Currency,
    /// Day count convention for accruals.
    pub day_count: DayCountConvention,
    /// Annual coupon in percent (e.g. 5.0 for 5%).
    pub coupon_rate: f64,
    /// Coupon frequency.
    pub frequency: Frequency,
    /// Issue date.
    pub issue_date: Date,
    /// First coupon date, when irregular.
    pub first_coupon_date: Option<Date>,
    /// Maturity date.
    pub maturity_date: Date,
    /// Face value.
    pub face_value: f64,

    /// Amortization schedule (empty when none).
    #[serde(default)]
    pub amortization_schedule: Vec<AmortizationEntry>,
    /// Step-up coupon schedule (empty when none).
    #[serde(default)]
    pub step_schedule: Vec<StepEntry>,

    /// Reference rate name for floaters (e.g. "SOFR").
    pub reference_rate: Option<String>,
    /// Latest stored fixing of the reference rate, in percent.
    pub reference_rate_snapshot: Option<f64>,
    /// Spread over the reference rate, in percent.
    pub reference_spread: Option<f64>,
    /// Coupon floor in percent.
    pub rate_floor: Option<f64>,
    /// Coupon cap in percent.
    pub rate_cap: Option<f64>,
    /// Reset frequency for floaters.
    pub reset_frequency: Option<Frequency>,

    /// Inflation index name (e.g. "CPI-U").
    pub inflation_index: Option<String>,
    /// Base index value at issue.
    pub inflation_base_value: Option<f64>,
    /// Index observation lag in months.
    pub index_lag_months: Option<u32>,
    /// Stored index ratios keyed by observation date.
    #[serde(default)]
    pub index_ratios: BTreeMap<Date, f64>,

    /// Whether the issuer may call the security.
    #[serde(default)]
    pub callable: bool,
    /// Call schedule (sorted by date).
    #[serde(default)]
    pub call_schedule: Vec<CallPutEntry>,
    /// Whether the holder may put the security.
    #[serde(default)]
    pub puttable: bool,
    /// Put schedule (sorted by date).
    #[serde(default)]
    pub put_schedule: Vec<CallPutEntry>,

    /// Credit rating label (e.g. "AAA", "BB+").
    pub rating: Option<String>,
    /// Sector label (e.g. "government", "industrials").
    pub sector: Option<String>,
    /// Classification inherited from the owning asset class.
    pub classification: Option<Classification>,
}

impl Security {
    /// Validates the security invariants.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSecurity` describing the first violated
    /// invariant:
    /// - maturity >= issue date
    /// - face value > 0
    /// - coupon >= 0 when the frequency is non-zero
    /// - step schedule strictly increasing by effective date, last <= maturity
    /// - amortization schedule sorted by date with principal summing to face
    ///   within one currency unit
    /// - call/put schedules sorted by date
    pub fn validate(&self) -> CoreResult<()> {
        let fail = |reason: String| Err(CoreError::invalid_security(self.id.as_str(), reason));

        if self.maturity_date < self.issue_date {
            return fail(format!(
                "maturity {} precedes issue {}",
                self.maturity_date, self.issue_date
            ));
        }
        if self.face_value <= 0.0 {
            return fail(format!("face value {} must be positive", self.face_value));
        }
        if !self.frequency.is_zero() && self.coupon_rate < 0.0 {
            return fail(format!("coupon {} must be non-negative", self.coupon_rate));
        }

        for pair in self.step_schedule.windows(2) {
            if pair[1].effective_date <= pair[0].effective_date {
                return fail("step schedule not strictly increasing".to_string());
            }
        }
        if let Some(last) = self.step_schedule.last() {
            if last.effective_date > self.maturity_date {
                return fail(format!(
                    "step effective date {} after maturity",
                    last.effective_date
                ));
            }
        }

        if !self.amortization_schedule.is_empty() {
            for pair in self.amortization_schedule.windows(2) {
                if pair[1].date < pair[0].date {
                    return fail("amortization schedule not sorted by date".to_string());
                }
            }
            let total: f64 = self.amortization_schedule.iter().map(|e| e.principal).sum();
            if (total - self.face_value).abs() > AMORTIZATION_TOLERANCE {
                return fail(format!(
                    "amortization principal {} does not sum to face {}",
                    total, self.face_value
                ));
            }
        }

        for (name, schedule) in [("call", &self.call_schedule), ("put", &self.put_schedule)] {
            for pair in schedule.windows(2) {
                if pair[1].date < pair[0].date {
                    return fail(format!("{name} schedule not sorted by date"));
                }
            }
        }

        Ok(())
    }

    /// Effective classification: the inherited one, else derived from the
    /// instrument family.
    #[must_use]
    pub fn effective_classification(&self) -> Classification {
        self.classification.unwrap_or(if self.instrument_type.is_loan() {
            Classification::Loan
        } else {
            Classification::Bond
        })
    }

    /// The index ratio applicable on `date`: the most recent stored entry at
    /// or before `date`, defaulting to 1.0.
    #[must_use]
    pub fn index_ratio_at(&self, date: Date) -> f64 {
        self.index_ratios
            .range(..=date)
            .next_back()
            .map_or(1.0, |(_, ratio)| *ratio)
    }

    /// The annual coupon in percent applicable for a period ending on `date`:
    /// the `new_coupon` of the step entry with the greatest effective date at
    /// or before `date`, else the base coupon.
    #[must_use]
    pub fn coupon_at(&self, date: Date) -> f64 {
        self.step_schedule
            .iter()
            .filter(|s| s.effective_date <= date)
            .next_back()
            .map_or(self.coupon_rate, |s| s.new_coupon)
    }
}

/// Builder-free constructor covering the common fixed-bond case; family
/// extras are set directly on the returned value.
impl Security {
    /// Creates a security with the required fields and empty/None extras.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: impl Into<SecurityId>,
        name: impl Into<String>,
        instrument_type: InstrumentType,
        currency: Currency,
        day_count: DayCountConvention,
        coupon_rate: f64,
        frequency: Frequency,
        issue_date: Date,
        maturity_date: Date,
        face_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            external_id: None,
            instrument_type,
            currency,
            day_count,
            coupon_rate,
            frequency,
            issue_date,
            first_coupon_date: None,
            maturity_date,
            face_value,
            amortization_schedule: Vec::new(),
            step_schedule: Vec::new(),
            reference_rate: None,
            reference_rate_snapshot: None,
            reference_spread: None,
            rate_floor: None,
            rate_cap: None,
            reset_frequency: None,
            inflation_index: None,
            inflation_base_value: None,
            index_lag_months: None,
            index_ratios: BTreeMap::new(),
            callable: false,
            call_schedule: Vec::new(),
            puttable: false,
            put_schedule: Vec::new(),
            rating: None,
            sector: None,
            classification: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn sample() -> Security {
        Security::new(
            "SEC-1",
            "5% 2030",
            InstrumentType::BondFixed,
            Currency::USD,
            DayCountConvention::Thirty360US,
            5.0,
            Frequency::SemiAnnual,
            d(2020, 1, 15),
            d(2030, 1, 15),
            100.0,
        )
    }

    #[test]
    fn test_valid_security() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_maturity_before_issue() {
        let mut s = sample();
        s.maturity_date = d(2019, 1, 1);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_amortization_must_sum_to_face() {
        let mut s = sample();
        s.face_value = 1000.0;
        s.amortization_schedule = vec![
            AmortizationEntry {
                date: d(2024, 6, 30),
                principal: 500.0,
                interest: 10.0,
            },
            AmortizationEntry {
                date: d(2024, 12, 31),
                principal: 400.0,
                interest: 5.0,
            },
        ];
        assert!(s.validate().is_err());

        s.amortization_schedule[1].principal = 500.5; // within one unit
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_step_schedule_ordering() {
        let mut s = sample();
        s.step_schedule = vec![
            StepEntry {
                effective_date: d(2024, 1, 1),
                new_coupon: 5.0,
            },
            StepEntry {
                effective_date: d(2022, 1, 1),
                new_coupon: 3.0,
            },
        ];
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_coupon_at_steps() {
        let mut s = sample();
        s.coupon_rate = 2.0;
        s.step_schedule = vec![
            StepEntry {
                effective_date: d(2022, 1, 1),
                new_coupon: 3.0,
            },
            StepEntry {
                effective_date: d(2024, 1, 1),
                new_coupon: 5.0,
            },
        ];
        assert_eq!(s.coupon_at(d(2021, 6, 1)), 2.0);
        assert_eq!(s.coupon_at(d(2022, 1, 1)), 3.0);
        assert_eq!(s.coupon_at(d(2023, 12, 31)), 3.0);
        assert_eq!(s.coupon_at(d(2025, 1, 1)), 5.0);
    }

    #[test]
    fn test_index_ratio_lookup() {
        let mut s = sample();
        s.index_ratios.insert(d(2023, 1, 1), 1.05);
        s.index_ratios.insert(d(2024, 1, 1), 1.10);
        assert_eq!(s.index_ratio_at(d(2022, 6, 1)), 1.0);
        assert_eq!(s.index_ratio_at(d(2023, 6, 1)), 1.05);
        assert_eq!(s.index_ratio_at(d(2024, 1, 1)), 1.10);
    }
}
