//! Composite discount curve: benchmark + spread curve + manual overrides.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fairval_core::types::{Curve, CurveSource, Date, Tenor, DEFAULT_SPREAD_KEY};

use crate::error::{CurveError, CurveResult};
use crate::interpolation::{CurveInterpolator, InterpolationMethod};

/// Tolerance for matching spread-curve points to benchmark points by
/// year fraction.
pub const YEAR_MATCH_TOLERANCE: f64 = 1e-8;

/// Snapshot of the curves and overrides a composite was built from.
///
/// Persisted with every valuation so results are reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSetup {
    /// Benchmark curve name.
    pub benchmark_name: String,
    /// Benchmark curve source.
    pub benchmark_source: CurveSource,
    /// Benchmark curve date.
    pub benchmark_date: Date,
    /// Spread curve name, when one was applied.
    pub spread_name: Option<String>,
    /// Spread curve source.
    pub spread_source: Option<CurveSource>,
    /// Spread curve date.
    pub spread_date: Option<Date>,
    /// Manual per-tenor overrides in basis points.
    pub manual_overrides: BTreeMap<String, f64>,
}

/// One point of a composite curve.
///
/// `rate = benchmark_rate + spread_rate` always holds; `spread_rate` folds
/// in both the spread-curve contribution and any manual override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositePoint {
    /// Tenor label carried over from the benchmark point, if any.
    pub tenor_label: Option<String>,
    /// Years to maturity.
    pub years: f64,
    /// Total discount rate (decimal).
    pub rate: f64,
    /// Maturity date, when the benchmark point carried or implied one.
    pub maturity_date: Option<Date>,
    /// Benchmark component.
    pub benchmark_rate: f64,
    /// Spread component (curve spread + manual override).
    pub spread_rate: f64,
}

/// Rate resolved for a single flow date.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    /// Years from valuation date to the flow (ACT/365).
    pub years: f64,
    /// Tenor label: the matched point's label on an exact hit, else derived
    /// from the year fraction.
    pub tenor: Option<String>,
    /// Benchmark component.
    pub benchmark_rate: f64,
    /// Spread component.
    pub spread_rate: f64,
    /// Total rate.
    pub rate: f64,
}

/// A composite discount curve ready for DCF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeCurve {
    /// Points in ascending year-fraction order, non-empty.
    pub points: Vec<CompositePoint>,
    /// Provenance snapshot.
    pub setup: CurveSetup,
}

impl CompositeCurve {
    /// Builds a composite from a benchmark curve, an optional spread curve,
    /// and manual per-tenor overrides (bps, `"default"` as fallback).
    ///
    /// Spread points are matched to each benchmark point by exact maturity
    /// date, then by year fraction within [`YEAR_MATCH_TOLERANCE`], then by
    /// tenor label; unmatched points take spread 0. Manual overrides are
    /// additive on top of the matched curve spread.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::EmptyCurve` when the benchmark resolves to no
    /// usable points.
    pub fn build(
        benchmark: &Curve,
        spread_curve: Option<&Curve>,
        manual_spreads: &BTreeMap<String, f64>,
    ) -> CurveResult<Self> {
        let bench_points = benchmark.resolved_points();
        if bench_points.is_empty() {
            return Err(CurveError::empty_curve(&benchmark.name));
        }

        let spread_points: Vec<(f64, Option<Date>, Option<String>, f64)> = spread_curve
            .map(|c| {
                c.resolved_points()
                    .into_iter()
                    .map(|(years, p)| {
                        (
                            years,
                            p.maturity_date,
                            p.tenor_label.clone(),
                            p.rate,
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        let points = bench_points
            .into_iter()
            .map(|(years, bp)| {
                let maturity = bp.resolve_maturity(benchmark.curve_date);
                let curve_spread = match_spread(&spread_points, maturity, years, bp.tenor_label.as_deref());
                let manual_bps = manual_spread_for(manual_spreads, bp.tenor_label.as_deref());
                let spread_rate = curve_spread + manual_bps / 10_000.0;
                CompositePoint {
                    tenor_label: bp.tenor_label.clone(),
                    years,
                    rate: bp.rate + spread_rate,
                    maturity_date: maturity,
                    benchmark_rate: bp.rate,
                    spread_rate,
                }
            })
            .collect();

        Ok(Self {
            points,
            setup: CurveSetup {
                benchmark_name: benchmark.name.clone(),
                benchmark_source: benchmark.source,
                benchmark_date: benchmark.curve_date,
                spread_name: spread_curve.map(|c| c.name.clone()),
                spread_source: spread_curve.map(|c| c.source),
                spread_date: spread_curve.map(|c| c.curve_date),
                manual_overrides: manual_spreads.clone(),
            },
        })
    }

    /// Resolves the discount rate for a flow dated `flow_date`.
    ///
    /// A composite point whose maturity date equals the flow date is used
    /// exactly; otherwise the benchmark and spread components are each
    /// linearly interpolated against `years = ACT/365(valuation, flow)`,
    /// with endpoint rates beyond the curve ends.
    #[must_use]
    pub fn resolve(&self, valuation_date: Date, flow_date: Date) -> ResolvedRate {
        let years = valuation_date.days_between(&flow_date) as f64 / 365.0;

        if let Some(point) = self
            .points
            .iter()
            .find(|p| p.maturity_date == Some(flow_date))
        {
            return ResolvedRate {
                years,
                tenor: point.tenor_label.clone(),
                benchmark_rate: point.benchmark_rate,
                spread_rate: point.spread_rate,
                rate: point.benchmark_rate + point.spread_rate,
            };
        }

        let bench_knots: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.years, p.benchmark_rate))
            .collect();
        let spread_knots: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.years, p.spread_rate))
            .collect();

        // Construction guarantees non-empty points.
        let benchmark_rate = CurveInterpolator::new(bench_knots, InterpolationMethod::Linear)
            .map(|i| i.rate_at(years))
            .unwrap_or(0.0);
        let spread_rate = CurveInterpolator::new(spread_knots, InterpolationMethod::Linear)
            .map(|i| i.rate_at(years))
            .unwrap_or(0.0);

        ResolvedRate {
            years,
            tenor: Some(format!("{years:.2}Y")),
            benchmark_rate,
            spread_rate,
            rate: benchmark_rate + spread_rate,
        }
    }
}

/// Spread-curve rate matching a benchmark point, or 0.
fn match_spread(
    spread_points: &[(f64, Option<Date>, Option<String>, f64)],
    maturity: Option<Date>,
    years: f64,
    tenor_label: Option<&str>,
) -> f64 {
    if let Some(m) = maturity {
        if let Some(hit) = spread_points.iter().find(|(_, sm, _, _)| *sm == Some(m)) {
            return hit.3;
        }
    }
    if let Some(hit) = spread_points
        .iter()
        .find(|(sy, _, _, _)| (sy - years).abs() < YEAR_MATCH_TOLERANCE)
    {
        return hit.3;
    }
    if let Some(label) = tenor_label {
        if let Some(hit) = spread_points
            .iter()
            .find(|(_, _, sl, _)| sl.as_deref() == Some(label))
        {
            return hit.3;
        }
    }
    0.0
}

/// Manual override (bps) for a tenor label: the exact entry, else the
/// `"default"` entry, else 0. Labels are matched after tenor normalization
/// so `6m` and `6M` agree.
fn manual_spread_for(manual_spreads: &BTreeMap<String, f64>, tenor_label: Option<&str>) -> f64 {
    if let Some(label) = tenor_label {
        if let Some(bps) = manual_spreads.get(label) {
            return *bps;
        }
        if let Ok(tenor) = Tenor::parse(label) {
            let canonical = tenor.to_string();
            for (key, bps) in manual_spreads {
                if Tenor::parse(key).map(|t| t.to_string()) == Ok(canonical.clone()) {
                    return *bps;
                }
            }
        }
    }
    manual_spreads
        .get(DEFAULT_SPREAD_KEY)
        .copied()
        .unwrap_or(0.0)
}
