//! IFRS fair-value hierarchy levelling.

use fairval_core::types::{DiscountSpec, IfrsLevel, InstrumentType, Security};

/// Classifies a security into the fair-value hierarchy.
///
/// Priority: the specification's override, then the rule set
///
/// - rating AAA through A, or a government/treasury sector, is Level 1
/// - rating BBB through BB, or an unrated plain bond/loan, is Level 2
/// - everything else is Level 3
#[must_use]
pub fn classify(spec: Option<&DiscountSpec>, security: &Security) -> IfrsLevel {
    if let Some(level) = spec.and_then(|s| s.ifrs_level) {
        return level;
    }

    if is_government_sector(security.sector.as_deref()) {
        return IfrsLevel::Level1;
    }

    match security.rating.as_deref().map(rating_bucket) {
        Some(RatingBucket::HighGrade) => IfrsLevel::Level1,
        Some(RatingBucket::MidGrade) => IfrsLevel::Level2,
        Some(RatingBucket::Other) => IfrsLevel::Level3,
        None => {
            if is_generic_instrument(security.instrument_type) {
                IfrsLevel::Level2
            } else {
                IfrsLevel::Level3
            }
        }
    }
}

enum RatingBucket {
    /// AAA through A
    HighGrade,
    /// BBB through BB
    MidGrade,
    Other,
}

fn rating_bucket(rating: &str) -> RatingBucket {
    let base: String = rating
        .trim()
        .to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    match base.as_str() {
        "AAA" | "AA" | "A" => RatingBucket::HighGrade,
        "BBB" | "BB" => RatingBucket::MidGrade,
        _ => RatingBucket::Other,
    }
}

fn is_government_sector(sector: Option<&str>) -> bool {
    let Some(sector) = sector else {
        return false;
    };
    let sector = sector.to_ascii_lowercase();
    sector.contains("gov") || sector.contains("treasury") || sector.contains("sovereign")
}

/// Plain-vanilla families price off observable inputs even unrated.
fn is_generic_instrument(instrument_type: InstrumentType) -> bool {
    matches!(
        instrument_type,
        InstrumentType::BondFixed
            | InstrumentType::BondZero
            | InstrumentType::LoanTerm
            | InstrumentType::LoanAmortizing
    )
}
