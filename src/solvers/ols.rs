//! Ordinary least squares.

use crate::core::{FitOptions, FitResult};
use crate::inference::CoefficientInference;
use crate::solvers::traits::{FittedRegressor, Regressor, RegressionError};
use crate::utils::{center_columns, center_vector, detect_constant_columns};
use faer::{Col, Mat};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Ordinary least squares estimator.
///
/// Solves via QR decomposition with column pivoting, so rank-deficient
/// designs are handled: aliased (collinear or constant) columns get NaN
/// coefficients and are skipped in prediction, matching R's `lm()`.
#[derive(Debug, Clone, Default)]
pub struct OlsRegressor {
    options: FitOptions,
}

impl OlsRegressor {
    /// Create an OLS estimator with the given options.
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// The options this estimator fits with.
    pub fn options(&self) -> &FitOptions {
        &self.options
    }
}

impl Regressor for OlsRegressor {
    type Fitted = FittedOls;

    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError> {
        self.options.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.nrows() {
            return Err(RegressionError::DimensionMismatch {
                x_rows: n_samples,
                y_len: y.nrows(),
            });
        }
        if n_samples < 2 {
            return Err(RegressionError::InsufficientObservations {
                needed: 2,
                got: n_samples,
            });
        }

        let max_params = if self.options.with_intercept {
            n_features + 1
        } else {
            n_features
        };
        if n_samples < max_params {
            return Err(RegressionError::InsufficientObservations {
                needed: max_params,
                got: n_samples,
            });
        }

        let constant_cols = detect_constant_columns(x, self.options.rank_tolerance);

        let (coefficients, aliased, rank, intercept) = if self.options.with_intercept {
            // Center both sides, solve the reduced system, then recover the
            // intercept from the means.
            let (x_centered, x_means) = center_columns(x);
            let (y_centered, y_mean) = center_vector(y);

            let (coefficients, aliased, rank) =
                self.solve_pivoted_qr(&x_centered, &y_centered, &constant_cols)?;

            let mut intercept = y_mean;
            for j in 0..n_features {
                if !aliased[j] && !coefficients[j].is_nan() {
                    intercept -= x_means[j] * coefficients[j];
                }
            }

            (coefficients, aliased, rank, Some(intercept))
        } else {
            if constant_cols.iter().all(|&c| c) {
                return Err(RegressionError::AllFeaturesConstant);
            }
            let (coefficients, aliased, rank) = self.solve_pivoted_qr(x, y, &constant_cols)?;
            (coefficients, aliased, rank, None)
        };

        let (fitted_values, residuals) =
            compute_fitted(x, y, &coefficients, &aliased, intercept);

        let n_params = rank + usize::from(intercept.is_some());
        let result = self.assemble_result(
            x,
            y,
            &coefficients,
            intercept,
            &residuals,
            &fitted_values,
            &aliased,
            rank,
            n_params,
        );

        Ok(FittedOls { result })
    }
}

impl OlsRegressor {
    /// Solve the least-squares system by column-pivoted QR.
    ///
    /// Returns (coefficients, aliased flags, numerical rank). Coefficients
    /// for aliased columns are NaN.
    fn solve_pivoted_qr(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        constant_cols: &[bool],
    ) -> Result<(Col<f64>, Vec<bool>, usize), RegressionError> {
        let n_features = x.ncols();
        let n_samples = x.nrows();

        let mut aliased = constant_cols.to_vec();

        let qr = x.col_piv_qr();
        let q = qr.compute_Q();
        let r = qr.R();
        let perm = qr.P();

        // perm_inv[j] = pivoted position of original column j
        let perm_arr = perm.arrays().1;
        let mut perm_inv: Vec<usize> = vec![0; n_features];
        perm_inv[..n_features].copy_from_slice(&perm_arr[..n_features]);

        // Numerical rank from the R diagonal
        let mut rank = 0;
        for i in 0..n_features.min(n_samples) {
            if r[(i, i)].abs() > self.options.rank_tolerance {
                rank += 1;
            } else {
                break;
            }
        }

        if rank == 0 {
            let mut coefficients = Col::zeros(n_features);
            for j in 0..n_features {
                coefficients[j] = f64::NAN;
                aliased[j] = true;
            }
            return Ok((coefficients, aliased, 0));
        }

        // Columns pivoted beyond the rank are aliased
        for j in 0..n_features {
            if constant_cols[j] || perm_inv[j] >= rank {
                aliased[j] = true;
            }
        }

        // Back-substitution on R * beta = Q'y over the leading rank block
        let qty = q.transpose() * y;
        let mut beta_reduced = Col::zeros(rank);
        for i in (0..rank).rev() {
            let mut sum = qty[i];
            for j in (i + 1)..rank {
                sum -= r[(i, j)] * beta_reduced[j];
            }
            beta_reduced[i] = sum / r[(i, i)];
        }

        // Undo the pivot
        let mut coefficients = Col::zeros(n_features);
        for j in 0..n_features {
            coefficients[j] = if aliased[j] {
                f64::NAN
            } else {
                beta_reduced[perm_inv[j]]
            };
        }

        Ok((coefficients, aliased, rank))
    }

    /// Fill a [`FitResult`] with fit statistics and optional inference.
    #[allow(clippy::too_many_arguments)]
    fn assemble_result(
        &self,
        x: &Mat<f64>,
        y: &Col<f64>,
        coefficients: &Col<f64>,
        intercept: Option<f64>,
        residuals: &Col<f64>,
        fitted_values: &Col<f64>,
        aliased: &[bool],
        rank: usize,
        n_params: usize,
    ) -> FitResult {
        let n = y.nrows();
        let stats = fit_statistics(y, residuals, n_params, intercept.is_some());

        let mut result = FitResult::empty(x.ncols(), n);
        result.coefficients = coefficients.clone();
        result.intercept = intercept;
        result.residuals = residuals.clone();
        result.fitted_values = fitted_values.clone();
        result.rank = rank;
        result.n_parameters = n_params;
        result.n_observations = n;
        result.aliased = aliased.to_vec();
        result.rank_tolerance = self.options.rank_tolerance;
        result.r_squared = stats.r_squared;
        result.adj_r_squared = stats.adj_r_squared;
        result.mse = stats.mse;
        result.rmse = stats.rmse;
        result.f_statistic = stats.f_statistic;
        result.f_pvalue = stats.f_pvalue;
        result.aic = stats.aic;
        result.aicc = stats.aicc;
        result.bic = stats.bic;
        result.log_likelihood = stats.log_likelihood;
        result.confidence_level = self.options.confidence_level;

        if self.options.compute_inference {
            self.attach_inference(x, &mut result);
        }

        result
    }

    /// Compute standard errors, t-statistics, p-values, and confidence
    /// intervals; leaves the inference fields as `None` when the design is
    /// too degenerate for them.
    fn attach_inference(&self, x: &Mat<f64>, result: &mut FitResult) {
        let df = result.residual_df() as f64;
        if df <= 0.0 || !result.mse.is_finite() {
            return;
        }

        let level = self.options.confidence_level;

        if result.intercept.is_some() {
            let Ok((se, se_int)) = CoefficientInference::standard_errors_with_intercept(
                x,
                result.mse,
                &result.aliased,
            ) else {
                return;
            };

            let t_stats = CoefficientInference::t_statistics(&result.coefficients, &se);
            let p_vals = CoefficientInference::p_values(&t_stats, df);
            let (ci_lower, ci_upper) =
                CoefficientInference::confidence_intervals(&result.coefficients, &se, df, level);

            result.std_errors = Some(se);
            result.t_statistics = Some(t_stats);
            result.p_values = Some(p_vals);
            result.conf_interval_lower = Some(ci_lower);
            result.conf_interval_upper = Some(ci_upper);

            if let Some(intercept) = result.intercept {
                let t_int = if se_int > 0.0 {
                    intercept / se_int
                } else {
                    f64::NAN
                };

                let t_dist = StudentsT::new(0.0, 1.0, df).ok();
                let p_int = if t_int.is_finite() {
                    t_dist
                        .as_ref()
                        .map_or(f64::NAN, |d| 2.0 * (1.0 - d.cdf(t_int.abs())))
                } else {
                    f64::NAN
                };
                let t_crit = t_dist
                    .as_ref()
                    .map_or(f64::NAN, |d| d.inverse_cdf(1.0 - (1.0 - level) / 2.0));

                result.intercept_std_error = Some(se_int);
                result.intercept_t_statistic = Some(t_int);
                result.intercept_p_value = Some(p_int);
                result.intercept_conf_interval =
                    Some((intercept - t_crit * se_int, intercept + t_crit * se_int));
            }
        } else {
            let Ok(se) = CoefficientInference::standard_errors(x, result.mse, &result.aliased)
            else {
                return;
            };

            let t_stats = CoefficientInference::t_statistics(&result.coefficients, &se);
            let p_vals = CoefficientInference::p_values(&t_stats, df);
            let (ci_lower, ci_upper) =
                CoefficientInference::confidence_intervals(&result.coefficients, &se, df, level);

            result.std_errors = Some(se);
            result.t_statistics = Some(t_stats);
            result.p_values = Some(p_vals);
            result.conf_interval_lower = Some(ci_lower);
            result.conf_interval_upper = Some(ci_upper);
        }
    }
}

/// Linear predictor over the non-aliased columns, and the residuals.
fn compute_fitted(
    x: &Mat<f64>,
    y: &Col<f64>,
    coefficients: &Col<f64>,
    aliased: &[bool],
    intercept: Option<f64>,
) -> (Col<f64>, Col<f64>) {
    let n_samples = x.nrows();
    let n_features = x.ncols();
    let base = intercept.unwrap_or(0.0);

    let mut fitted_values = Col::zeros(n_samples);
    let mut residuals = Col::zeros(n_samples);
    for i in 0..n_samples {
        let mut pred = base;
        for j in 0..n_features {
            if !aliased[j] && !coefficients[j].is_nan() {
                pred += x[(i, j)] * coefficients[j];
            }
        }
        fitted_values[i] = pred;
        residuals[i] = y[i] - pred;
    }

    (fitted_values, residuals)
}

pub(crate) struct FitStatistics {
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub mse: f64,
    pub rmse: f64,
    pub f_statistic: f64,
    pub f_pvalue: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub aicc: f64,
    pub bic: f64,
}

/// Goodness-of-fit statistics shared by the OLS and intercept-only paths.
pub(crate) fn fit_statistics(
    y: &Col<f64>,
    residuals: &Col<f64>,
    n_params: usize,
    has_intercept: bool,
) -> FitStatistics {
    let n = y.nrows();
    let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
    let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
    let rss: f64 = residuals.iter().map(|&r| r.powi(2)).sum();

    let r_squared = if tss > 0.0 {
        (1.0 - rss / tss).clamp(0.0, 1.0)
    } else if rss < 1e-10 {
        1.0
    } else {
        0.0
    };

    let df_total = (n - 1) as f64;
    let df_resid = n.saturating_sub(n_params) as f64;
    let adj_r_squared = if df_resid > 0.0 && df_total > 0.0 {
        1.0 - (1.0 - r_squared) * df_total / df_resid
    } else {
        f64::NAN
    };

    let mse = if df_resid > 0.0 { rss / df_resid } else { f64::NAN };
    let rmse = mse.sqrt();

    let df_model = n_params.saturating_sub(usize::from(has_intercept)) as f64;
    let ess = tss - rss;
    let f_statistic = if df_model > 0.0 && df_resid > 0.0 && mse > 0.0 {
        (ess / df_model) / mse
    } else {
        f64::NAN
    };
    let f_pvalue = if f_statistic.is_finite() && df_model > 0.0 && df_resid > 0.0 {
        FisherSnedecor::new(df_model, df_resid)
            .ok()
            .map_or(f64::NAN, |d| 1.0 - d.cdf(f_statistic))
    } else {
        f64::NAN
    };

    let log_likelihood = if mse > 0.0 {
        -0.5 * n as f64 * (1.0 + (2.0 * std::f64::consts::PI).ln() + mse.ln())
    } else {
        f64::NAN
    };

    let k = n_params as f64;
    let aic = if log_likelihood.is_finite() {
        2.0 * k - 2.0 * log_likelihood
    } else {
        f64::NAN
    };
    let aicc = if log_likelihood.is_finite() && (n as f64 - k - 1.0) > 0.0 {
        aic + 2.0 * k * (k + 1.0) / (n as f64 - k - 1.0)
    } else {
        f64::NAN
    };
    let bic = if log_likelihood.is_finite() {
        k * (n as f64).ln() - 2.0 * log_likelihood
    } else {
        f64::NAN
    };

    FitStatistics {
        r_squared,
        adj_r_squared,
        mse,
        rmse,
        f_statistic,
        f_pvalue,
        log_likelihood,
        aic,
        aicc,
        bic,
    }
}

/// A fitted OLS model.
#[derive(Debug, Clone)]
pub struct FittedOls {
    result: FitResult,
}

impl FittedRegressor for FittedOls {
    fn predict(&self, x: &Mat<f64>) -> Col<f64> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        let intercept = self.result.intercept.unwrap_or(0.0);

        Col::from_fn(n_samples, |i| {
            let mut pred = intercept;
            for j in 0..n_features {
                if !self.result.aliased[j] && !self.result.coefficients[j].is_nan() {
                    pred += x[(i, j)] * self.result.coefficients[j];
                }
            }
            pred
        })
    }

    fn result(&self) -> &FitResult {
        &self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_is_recovered() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

        assert!((fitted.coefficients()[0] - 3.0).abs() < 1e-10);
        assert!((fitted.intercept().expect("intercept exists") - 2.0).abs() < 1e-10);
        assert!((fitted.r_squared() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn prediction_extends_the_line() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(5, |i| 2.0 + 3.0 * i as f64);

        let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");

        let x_new = Mat::from_fn(2, 1, |i, _| (i + 10) as f64);
        let preds = fitted.predict(&x_new);

        assert!((preds[0] - 32.0).abs() < 1e-10);
        assert!((preds[1] - 35.0).abs() < 1e-10);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let x = Mat::from_fn(5, 1, |i, _| i as f64);
        let y = Col::from_fn(4, |i| i as f64);

        assert!(matches!(
            OlsRegressor::default().fit(&x, &y),
            Err(RegressionError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn collinear_column_is_aliased() {
        let mut x = Mat::zeros(10, 2);
        let mut y = Col::zeros(10);
        for i in 0..10 {
            x[(i, 0)] = i as f64;
            x[(i, 1)] = 2.0 * i as f64;
            y[i] = 1.0 + 2.0 * i as f64;
        }

        let fitted = OlsRegressor::default().fit(&x, &y).expect("fit should succeed");
        assert!(fitted.result().has_aliased());
        assert!(fitted.coefficients().iter().any(|c| c.is_nan()));
    }
}
