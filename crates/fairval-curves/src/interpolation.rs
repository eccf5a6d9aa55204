//! Interpolation over curve knots.
//!
//! Both methods extrapolate flat beyond the knot range and reproduce knot
//! rates exactly (targets within 1e-3 years of a knot return the knot rate).

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// Tolerance in years for treating a target as an exact knot hit.
pub const KNOT_TOLERANCE: f64 = 1e-3;

/// Minimum knot count for the Hermite cubic; below this the interpolator
/// falls back to linear.
const CUBIC_MIN_POINTS: usize = 4;

/// Interpolation methods for yield curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Linear interpolation on rates.
    #[default]
    Linear,
    /// Hermite cubic with finite-difference slopes.
    CubicHermite,
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Linear => "Linear",
            Self::CubicHermite => "Cubic Hermite",
        };
        write!(f, "{name}")
    }
}

/// Interpolator over `(years, rate)` knots.
///
/// # Example
///
/// ```rust
/// use fairval_curves::interpolation::{CurveInterpolator, InterpolationMethod};
///
/// let knots = vec![(1.0, 0.03), (2.0, 0.035), (5.0, 0.04), (10.0, 0.045)];
/// let interp = CurveInterpolator::new(knots, InterpolationMethod::Linear).unwrap();
/// let rate = interp.rate_at(3.5);
/// assert!((rate - 0.0375).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CurveInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    method: InterpolationMethod,
}

impl CurveInterpolator {
    /// Creates an interpolator from `(years, rate)` knots.
    ///
    /// Knots are sorted ascending internally; duplicate-year knots keep
    /// their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `CurveError::Interpolation` when no knots are supplied.
    pub fn new(mut knots: Vec<(f64, f64)>, method: InterpolationMethod) -> CurveResult<Self> {
        if knots.is_empty() {
            return Err(CurveError::interpolation("no knots supplied"));
        }
        knots.sort_by(|a, b| a.0.total_cmp(&b.0));
        knots.dedup_by(|a, b| (a.0 - b.0).abs() < 1e-12);

        let (xs, ys) = knots.into_iter().unzip();
        Ok(Self { xs, ys, method })
    }

    /// Number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// True when the interpolator holds no knots (never, post-construction).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Interpolated rate at `target` years.
    ///
    /// Exact knot hits (within [`KNOT_TOLERANCE`]) return the knot rate;
    /// targets beyond either end extrapolate flat.
    #[must_use]
    pub fn rate_at(&self, target: f64) -> f64 {
        let n = self.xs.len();

        // Exact knot hit
        if let Some(i) = self.xs.iter().position(|x| (x - target).abs() < KNOT_TOLERANCE) {
            return self.ys[i];
        }

        // Flat extrapolation
        if target <= self.xs[0] {
            return self.ys[0];
        }
        if target >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        let i = self.find_segment(target);
        match self.method {
            InterpolationMethod::Linear => self.linear(i, target),
            InterpolationMethod::CubicHermite => {
                if n < CUBIC_MIN_POINTS {
                    self.linear(i, target)
                } else {
                    self.hermite(i, target)
                }
            }
        }
    }

    /// Finds the index i such that xs[i] <= x < xs[i+1].
    fn find_segment(&self, x: f64) -> usize {
        match self
            .xs
            .binary_search_by(|probe| probe.partial_cmp(&x).unwrap_or(std::cmp::Ordering::Equal))
        {
            Ok(i) => i.min(self.xs.len() - 2),
            Err(i) => (i.saturating_sub(1)).min(self.xs.len() - 2),
        }
    }

    fn linear(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    /// Hermite cubic over the bracketing segment. Endpoint slopes come from
    /// finite differences of the neighbouring segments; at the curve ends
    /// the segment's own slope is used.
    fn hermite(&self, i: usize, x: f64) -> f64 {
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let h = x1 - x0;
        let secant = (y1 - y0) / h;

        let m0 = if i == 0 {
            secant
        } else {
            let prev = (y0 - self.ys[i - 1]) / (x0 - self.xs[i - 1]);
            (prev + secant) / 2.0
        };
        let m1 = if i + 2 >= self.xs.len() {
            secant
        } else {
            let next = (self.ys[i + 2] - y1) / (self.xs[i + 2] - x1);
            (secant + next) / 2.0
        };

        let t = (x - x0) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * y0 + h10 * h * m0 + h01 * y1 + h11 * h * m1
    }
}

/// One-shot interpolation over `(years, rate)` points.
///
/// # Errors
///
/// Returns `CurveError::Interpolation` when `points` is empty.
pub fn interpolate(
    points: &[(f64, f64)],
    target_years: f64,
    method: InterpolationMethod,
) -> CurveResult<f64> {
    CurveInterpolator::new(points.to_vec(), method).map(|i| i.rate_at(target_years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn knots() -> Vec<(f64, f64)> {
        vec![(1.0, 0.03), (2.0, 0.035), (5.0, 0.04), (10.0, 0.045)]
    }

    #[test]
    fn test_knot_reproduction_linear() {
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::Linear).unwrap();
        for (x, y) in knots() {
            assert_relative_eq!(interp.rate_at(x), y);
        }
    }

    #[test]
    fn test_knot_reproduction_cubic() {
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::CubicHermite).unwrap();
        for (x, y) in knots() {
            assert_relative_eq!(interp.rate_at(x), y);
        }
    }

    #[test]
    fn test_flat_extrapolation() {
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::Linear).unwrap();
        assert_relative_eq!(interp.rate_at(0.25), 0.03);
        assert_relative_eq!(interp.rate_at(30.0), 0.045);
    }

    #[test]
    fn test_linear_midpoint() {
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::Linear).unwrap();
        assert_relative_eq!(interp.rate_at(1.5), 0.0325);
        assert_relative_eq!(interp.rate_at(3.5), 0.0375);
    }

    #[test]
    fn test_near_knot_tolerance() {
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::Linear).unwrap();
        assert_relative_eq!(interp.rate_at(2.0005), 0.035);
    }

    #[test]
    fn test_cubic_falls_back_below_four_points() {
        let interp = CurveInterpolator::new(
            vec![(1.0, 0.03), (2.0, 0.04), (3.0, 0.05)],
            InterpolationMethod::CubicHermite,
        )
        .unwrap();
        assert_relative_eq!(interp.rate_at(1.5), 0.035);
    }

    #[test]
    fn test_cubic_within_hull_monotone_data() {
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::CubicHermite).unwrap();
        let r = interp.rate_at(3.0);
        assert!(r > 0.035 && r < 0.04, "r = {r}");
    }

    #[test]
    fn test_single_point_is_flat() {
        let interp =
            CurveInterpolator::new(vec![(10.0, 0.05)], InterpolationMethod::Linear).unwrap();
        assert_relative_eq!(interp.rate_at(1.0), 0.05);
        assert_relative_eq!(interp.rate_at(20.0), 0.05);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(CurveInterpolator::new(Vec::new(), InterpolationMethod::Linear).is_err());
    }

    #[test]
    fn test_cubic_continuity_at_interior_knot() {
        // Approach the 5.0 knot from both sides: both limits equal the knot
        // rate (the exact-hit branch and the spline agree).
        let interp = CurveInterpolator::new(knots(), InterpolationMethod::CubicHermite).unwrap();
        let left = interp.rate_at(5.0 - 2e-3);
        let right = interp.rate_at(5.0 + 2e-3);
        assert_relative_eq!(left, 0.04, epsilon = 1e-4);
        assert_relative_eq!(right, 0.04, epsilon = 1e-4);
    }
}
