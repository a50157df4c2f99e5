//! Coefficient inference calculations.

use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Computes inference statistics for regression coefficients.
pub struct CoefficientInference;

impl CoefficientInference {
    /// Standard errors for coefficients of a no-intercept fit.
    ///
    /// SE(β_j) = sqrt(σ² * (X'X)⁻¹_{jj})
    pub fn standard_errors(
        x: &Mat<f64>,
        mse: f64,
        aliased: &[bool],
    ) -> Result<Col<f64>, &'static str> {
        let n_features = x.ncols();
        let xtx_inv = Self::xtx_inverse(x, aliased)?;

        let mut se = Col::zeros(n_features);
        for j in 0..n_features {
            if aliased[j] {
                se[j] = f64::NAN;
            } else {
                let var = mse * xtx_inv[(j, j)];
                se[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
            }
        }

        Ok(se)
    }

    /// Standard errors for intercept and coefficients via the augmented
    /// design matrix `[1 | X]`, matching R's `lm()`.
    ///
    /// Returns (coefficient SEs, intercept SE).
    pub fn standard_errors_with_intercept(
        x: &Mat<f64>,
        mse: f64,
        aliased: &[bool],
    ) -> Result<(Col<f64>, f64), &'static str> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        // Aliased columns would make the cross-product singular; they get
        // NaN standard errors and stay out of the augmented design.
        let active: Vec<usize> = (0..n_features).filter(|&j| !aliased[j]).collect();
        let aug_size = active.len() + 1;

        let x_aug = Mat::from_fn(n_samples, aug_size, |i, j| {
            if j == 0 {
                1.0
            } else {
                x[(i, active[j - 1])]
            }
        });
        let xtx_aug = x_aug.transpose() * &x_aug;
        let xtx_aug_inv = invert_via_qr(&xtx_aug)?;

        let se_intercept = (mse * xtx_aug_inv[(0, 0)]).sqrt();

        let mut se_coef = Col::from_fn(n_features, |_| f64::NAN);
        for (aj, &j) in active.iter().enumerate() {
            let var = mse * xtx_aug_inv[(aj + 1, aj + 1)];
            se_coef[j] = if var >= 0.0 { var.sqrt() } else { f64::NAN };
        }

        Ok((se_coef, se_intercept))
    }

    /// t-statistics: t_j = β_j / SE(β_j).
    pub fn t_statistics(coefficients: &Col<f64>, std_errors: &Col<f64>) -> Col<f64> {
        Col::from_fn(coefficients.nrows(), |j| {
            if std_errors[j].is_nan() || std_errors[j] == 0.0 {
                f64::NAN
            } else {
                coefficients[j] / std_errors[j]
            }
        })
    }

    /// Two-tailed p-values from t-statistics with `df` degrees of freedom.
    pub fn p_values(t_statistics: &Col<f64>, df: f64) -> Col<f64> {
        let n = t_statistics.nrows();

        if df <= 0.0 {
            return Col::from_fn(n, |_| f64::NAN);
        }
        let Ok(t_dist) = StudentsT::new(0.0, 1.0, df) else {
            return Col::from_fn(n, |_| f64::NAN);
        };

        Col::from_fn(n, |j| {
            if t_statistics[j].is_nan() {
                f64::NAN
            } else {
                2.0 * (1.0 - t_dist.cdf(t_statistics[j].abs()))
            }
        })
    }

    /// Confidence intervals: β_j ± t_{α/2, df} * SE(β_j).
    pub fn confidence_intervals(
        coefficients: &Col<f64>,
        std_errors: &Col<f64>,
        df: f64,
        confidence_level: f64,
    ) -> (Col<f64>, Col<f64>) {
        let n = coefficients.nrows();

        let t_crit = if df > 0.0 {
            StudentsT::new(0.0, 1.0, df)
                .ok()
                .map_or(f64::NAN, |d| {
                    d.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0)
                })
        } else {
            f64::NAN
        };

        let lower = Col::from_fn(n, |j| {
            if std_errors[j].is_nan() {
                f64::NAN
            } else {
                coefficients[j] - t_crit * std_errors[j]
            }
        });
        let upper = Col::from_fn(n, |j| {
            if std_errors[j].is_nan() {
                f64::NAN
            } else {
                coefficients[j] + t_crit * std_errors[j]
            }
        });

        (lower, upper)
    }

    /// (X'X)⁻¹ over the non-aliased columns, mapped back to full size.
    fn xtx_inverse(x: &Mat<f64>, aliased: &[bool]) -> Result<Mat<f64>, &'static str> {
        let n_features = x.ncols();
        let active: Vec<usize> = (0..n_features).filter(|&j| !aliased[j]).collect();
        if active.is_empty() {
            return Err("all features are aliased");
        }

        let x_active = Mat::from_fn(x.nrows(), active.len(), |i, j| x[(i, active[j])]);
        let xtx = x_active.transpose() * &x_active;
        let inv_active = invert_via_qr(&xtx)?;

        let mut xtx_inv = Mat::zeros(n_features, n_features);
        for (ai, &i) in active.iter().enumerate() {
            for (aj, &j) in active.iter().enumerate() {
                xtx_inv[(i, j)] = inv_active[(ai, aj)];
            }
        }

        Ok(xtx_inv)
    }
}

/// Invert a square matrix by QR factorization and back-substitution.
fn invert_via_qr(m: &Mat<f64>) -> Result<Mat<f64>, &'static str> {
    let size = m.nrows();
    let qr = m.qr();
    let q = qr.compute_Q();
    let r = qr.R();

    for i in 0..size {
        if r[(i, i)].abs() < 1e-10 {
            return Err("matrix is singular");
        }
    }

    let qt = q.transpose();
    let mut inv = Mat::zeros(size, size);
    for col in 0..size {
        for i in (0..size).rev() {
            let mut sum = qt[(i, col)];
            for j in (i + 1)..size {
                sum -= r[(i, j)] * inv[(j, col)];
            }
            inv[(i, col)] = sum / r[(i, i)];
        }
    }

    Ok(inv)
}
