//! Fit result structures.

use faer::Col;

/// Complete result of a least-squares fit.
///
/// Holds coefficients, residuals and fitted values, rank information, fit
/// statistics, and (when requested) inference statistics. Aliased
/// (collinear or constant) coefficients are stored as NaN.
#[derive(Debug, Clone)]
pub struct FitResult {
    // ========== Core Results ==========
    /// Estimated coefficients, one per design column (excluding intercept).
    pub coefficients: Col<f64>,

    /// Intercept term (if the model was fit with intercept).
    pub intercept: Option<f64>,

    /// Residuals (y - fitted_values) for the rows used in the fit.
    pub residuals: Col<f64>,

    /// Fitted values for the rows used in the fit.
    pub fitted_values: Col<f64>,

    // ========== Rank Information ==========
    /// Numerical rank of the design matrix.
    pub rank: usize,

    /// Number of parameters (including intercept if present).
    pub n_parameters: usize,

    /// Number of observations used.
    pub n_observations: usize,

    /// Flags coefficients that are aliased (perfectly collinear).
    pub aliased: Vec<bool>,

    /// Tolerance used for rank determination.
    pub rank_tolerance: f64,

    // ========== Fit Statistics ==========
    /// Coefficient of determination (R²).
    pub r_squared: f64,

    /// Adjusted R², penalizing additional parameters.
    pub adj_r_squared: f64,

    /// Mean squared error (RSS / residual df).
    pub mse: f64,

    /// Root mean squared error.
    pub rmse: f64,

    /// F-statistic for overall model significance.
    pub f_statistic: f64,

    /// P-value for the F-statistic.
    pub f_pvalue: f64,

    /// Akaike Information Criterion.
    pub aic: f64,

    /// Corrected AIC for small samples.
    pub aicc: f64,

    /// Bayesian Information Criterion.
    pub bic: f64,

    /// Log-likelihood.
    pub log_likelihood: f64,

    // ========== Inference Statistics (Optional) ==========
    /// Standard errors of coefficients.
    pub std_errors: Option<Col<f64>>,

    /// Standard error of the intercept.
    pub intercept_std_error: Option<f64>,

    /// t-statistics for coefficients.
    pub t_statistics: Option<Col<f64>>,

    /// t-statistic for the intercept.
    pub intercept_t_statistic: Option<f64>,

    /// Two-tailed p-values for coefficient significance tests.
    pub p_values: Option<Col<f64>>,

    /// P-value for the intercept.
    pub intercept_p_value: Option<f64>,

    /// Lower bounds of coefficient confidence intervals.
    pub conf_interval_lower: Option<Col<f64>>,

    /// Upper bounds of coefficient confidence intervals.
    pub conf_interval_upper: Option<Col<f64>>,

    /// Intercept confidence interval (lower, upper).
    pub intercept_conf_interval: Option<(f64, f64)>,

    /// Confidence level used for intervals.
    pub confidence_level: f64,
}

impl FitResult {
    /// Create a new empty result (used internally by solvers).
    pub(crate) fn empty(n_features: usize, n_observations: usize) -> Self {
        Self {
            coefficients: Col::zeros(n_features),
            intercept: None,
            residuals: Col::zeros(n_observations),
            fitted_values: Col::zeros(n_observations),
            rank: 0,
            n_parameters: 0,
            n_observations,
            aliased: vec![false; n_features],
            rank_tolerance: 1e-10,
            r_squared: 0.0,
            adj_r_squared: 0.0,
            mse: 0.0,
            rmse: 0.0,
            f_statistic: f64::NAN,
            f_pvalue: f64::NAN,
            aic: f64::NAN,
            aicc: f64::NAN,
            bic: f64::NAN,
            log_likelihood: f64::NAN,
            std_errors: None,
            intercept_std_error: None,
            t_statistics: None,
            intercept_t_statistic: None,
            p_values: None,
            intercept_p_value: None,
            conf_interval_lower: None,
            conf_interval_upper: None,
            intercept_conf_interval: None,
            confidence_level: 0.95,
        }
    }

    /// Residual degrees of freedom (n - p).
    pub fn residual_df(&self) -> usize {
        self.n_observations.saturating_sub(self.n_parameters)
    }

    /// Model degrees of freedom (p - 1 if intercept, else p).
    pub fn model_df(&self) -> usize {
        if self.intercept.is_some() {
            self.n_parameters.saturating_sub(1)
        } else {
            self.n_parameters
        }
    }

    /// Count of non-aliased (active) coefficients.
    pub fn n_active_coefficients(&self) -> usize {
        self.aliased.iter().filter(|&&a| !a).count()
    }

    /// Check if any coefficients are aliased.
    pub fn has_aliased(&self) -> bool {
        self.aliased.iter().any(|&a| a)
    }

    /// Coefficient value, `None` for aliased or out-of-range indices.
    pub fn get_coefficient(&self, index: usize) -> Option<f64> {
        if index < self.coefficients.nrows() && !self.aliased[index] {
            Some(self.coefficients[index])
        } else {
            None
        }
    }

    /// Residual sum of squares.
    pub fn rss(&self) -> f64 {
        self.residuals.iter().map(|&r| r.powi(2)).sum()
    }

    /// Total sum of squares of the (reconstructed) response.
    pub fn tss(&self) -> f64 {
        let n = self.n_observations as f64;
        let y_mean = self
            .residuals
            .iter()
            .zip(self.fitted_values.iter())
            .map(|(&r, &f)| r + f)
            .sum::<f64>()
            / n;

        self.residuals
            .iter()
            .zip(self.fitted_values.iter())
            .map(|(&r, &f)| (r + f - y_mean).powi(2))
            .sum()
    }

    /// Explained sum of squares (TSS - RSS).
    pub fn ess(&self) -> f64 {
        self.tss() - self.rss()
    }
}
