//! Plot-ready series for the four regression assumption checks.
//!
//! Each series is the data behind one diagnostic chart: linearity
//! (residuals vs fitted), independence (residuals in observation order),
//! normality (normal QQ and histogram), and equal variance
//! (scale-location). Rendering is left to the caller.

use crate::core::FitResult;
use crate::diagnostics::standardized_residuals;
use statrs::distribution::{ContinuousCDF, Normal};

/// Equal-width residual histogram.
#[derive(Debug, Clone)]
pub struct Histogram {
    /// Bin boundaries, length `counts.len() + 1`.
    pub breaks: Vec<f64>,
    /// Observations per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin `values` into Sturges' count of equal-width bins.
    pub fn from_values(values: &[f64]) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let n = finite.len();
        if n == 0 {
            return Self {
                breaks: Vec::new(),
                counts: Vec::new(),
            };
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max - min < 1e-14 {
            return Self {
                breaks: vec![min, max],
                counts: vec![n],
            };
        }

        let n_bins = (n as f64).log2().ceil() as usize + 1;
        let width = (max - min) / n_bins as f64;

        let breaks: Vec<f64> = (0..=n_bins).map(|k| min + k as f64 * width).collect();
        let mut counts = vec![0usize; n_bins];
        for &v in &finite {
            let bin = (((v - min) / width) as usize).min(n_bins - 1);
            counts[bin] += 1;
        }

        Self { breaks, counts }
    }
}

/// Probability points for a normal QQ series, as in R's `ppoints`.
fn ppoints(n: usize) -> Vec<f64> {
    let a = if n <= 10 { 0.375 } else { 0.5 };
    (0..n)
        .map(|i| (i as f64 + 1.0 - a) / (n as f64 + 1.0 - 2.0 * a))
        .collect()
}

/// The residual series behind the four assumption checks.
#[derive(Debug, Clone)]
pub struct DiagnosticReport {
    /// Linearity: (fitted value, residual). Should show no pattern.
    pub residuals_vs_fitted: Vec<(f64, f64)>,

    /// Independence: (original row index, residual) in observation order.
    /// Should show no pattern.
    pub residuals_in_order: Vec<(usize, f64)>,

    /// Normality: (theoretical normal quantile, sorted standardized
    /// residual). Should track a straight line.
    pub normal_qq: Vec<(f64, f64)>,

    /// Normality: residual histogram. Should look roughly bell-shaped.
    pub histogram: Histogram,

    /// Equal variance: (fitted value, sqrt(|standardized residual|)).
    /// Spread should be constant across the fitted range.
    pub scale_location: Vec<(f64, f64)>,
}

impl DiagnosticReport {
    /// Assemble the report from a fit result and the original row indices
    /// of the observations used.
    pub fn new(result: &FitResult, kept_rows: &[usize]) -> Self {
        let n = result.residuals.nrows();
        let standardized = standardized_residuals(&result.residuals, result.mse);

        let residuals_vs_fitted: Vec<(f64, f64)> = (0..n)
            .map(|i| (result.fitted_values[i], result.residuals[i]))
            .collect();

        let residuals_in_order: Vec<(usize, f64)> = (0..n)
            .map(|i| {
                let row = kept_rows.get(i).copied().unwrap_or(i);
                (row, result.residuals[i])
            })
            .collect();

        let mut sorted: Vec<f64> = (0..n).map(|i| standardized[i]).collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let normal_qq = match Normal::new(0.0, 1.0) {
            Ok(normal) => ppoints(n)
                .into_iter()
                .zip(sorted.iter())
                .map(|(p, &r)| (normal.inverse_cdf(p), r))
                .collect(),
            Err(_) => Vec::new(),
        };

        let residual_values: Vec<f64> = (0..n).map(|i| result.residuals[i]).collect();
        let histogram = Histogram::from_values(&residual_values);

        let scale_location: Vec<(f64, f64)> = (0..n)
            .map(|i| (result.fitted_values[i], standardized[i].abs().sqrt()))
            .collect();

        Self {
            residuals_vs_fitted,
            residuals_in_order,
            normal_qq,
            histogram,
            scale_location,
        }
    }
}
