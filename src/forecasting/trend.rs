//! Linear trend estimation over monthly series

use statrs::statistics::Statistics;

use crate::types::TrendFit;

/// Ordinary least-squares trend over index positions rather than calendar
/// time, so gaps in the source months do not distort the slope.
pub struct TrendEstimator;

impl TrendEstimator {
    /// Fit `y = intercept + slope × x` with `x = 1..=n`.
    ///
    /// Non-finite observations are dropped before fitting. Fewer than two
    /// observations give a flat line through the first value (or 0) with
    /// r² = 0. A constant series fits exactly and reports r² = 1.
    pub fn fit(values: &[f64]) -> TrendFit {
        let ys: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let n = ys.len();

        if n < 2 {
            return TrendFit {
                slope: 0.0,
                intercept: ys.first().copied().unwrap_or(0.0),
                r_squared: 0.0,
                observations: n,
            };
        }

        let xs: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let x_mean = xs.iter().mean();
        let y_mean = ys.iter().mean();

        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (x, y) in xs.iter().zip(&ys) {
            sxx += (x - x_mean).powi(2);
            sxy += (x - x_mean) * (y - y_mean);
        }

        // n >= 2 guarantees distinct x positions, so sxx > 0
        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let ss_tot: f64 = ys.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = xs
            .iter()
            .zip(&ys)
            .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
            .sum();

        let r_squared = if ss_tot <= f64::EPSILON {
            1.0
        } else {
            (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
        };

        TrendFit {
            slope,
            intercept,
            r_squared,
            observations: n,
        }
    }

    /// Extrapolated value for forecast month `i` (1-based) after a history of
    /// `history_len` points. History occupies x = 1..=n, so month `i` sits at
    /// x = n + i.
    pub fn project(fit: &TrendFit, history_len: usize, i: usize) -> f64 {
        fit.at((history_len + i) as f64)
    }
}
