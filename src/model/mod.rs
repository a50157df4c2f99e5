//! Formula-level model fitting over a [`DataFrame`].
//!
//! [`LinearModel`] resolves a term set against named columns, builds the
//! design matrix, applies the response transform and missing-value policy,
//! and delegates to the OLS solver. The returned [`FittedModel`] keeps the
//! term labels so coefficients, p-values, and the printed summary are
//! addressed by name rather than column index.

use std::fmt;

use faer::{Col, Mat};
use log::debug;
use thiserror::Error;

use crate::core::{screen_missing, FitOptions, FitResult, MissingError};
use crate::data::{DataError, DataFrame};
use crate::diagnostics::DiagnosticReport;
use crate::formula::{build_design, Formula, FormulaError, Term, TermSet};
use crate::solvers::{fit_statistics, FittedRegressor, OlsRegressor, RegressionError, Regressor};
use crate::transform::{ResponseTransform, TransformError};

/// Errors raised while fitting or using a formula-level model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error(transparent)]
    Missing(#[from] MissingError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Fit(#[from] RegressionError),

    #[error("inference statistics unavailable; fit with compute_inference enabled")]
    InferenceUnavailable,
}

/// A configurable linear model: options plus response transform.
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    options: FitOptions,
    transform: ResponseTransform,
}

impl LinearModel {
    /// A model with default options and no response transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for configuring the model.
    pub fn builder() -> LinearModelBuilder {
        LinearModelBuilder::default()
    }

    /// The fit options.
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// The response transform.
    pub fn transform(&self) -> ResponseTransform {
        self.transform
    }

    /// Fit the model described by a formula.
    pub fn fit(&self, frame: &DataFrame, formula: &Formula) -> Result<FittedModel, ModelError> {
        self.fit_terms(frame, formula.response(), formula.terms())
    }

    /// Fit the model for an explicit response and term set.
    ///
    /// An empty term set fits the intercept-only model (the forward
    /// selection starting point).
    pub fn fit_terms(
        &self,
        frame: &DataFrame,
        response: &str,
        terms: &TermSet,
    ) -> Result<FittedModel, ModelError> {
        terms.validate()?;

        let y_raw = frame.column(response)?;
        let y_col = Col::from_fn(y_raw.len(), |i| y_raw[i]);
        let (x, labels) = build_design(frame, terms)?;

        let screened = screen_missing(&x, &y_col, self.options.missing)?;

        let n = screened.y.nrows();
        let mut y_transformed = Col::zeros(n);
        for i in 0..n {
            y_transformed[i] = self.transform.apply(screened.y[i])?;
        }

        let result = if terms.is_empty() {
            fit_intercept_only(&y_transformed, &self.options)?
        } else {
            OlsRegressor::new(self.options.clone())
                .fit(&screened.x, &y_transformed)?
                .result()
                .clone()
        };

        debug!(
            "fit {} ~ {} ({} terms, {} rows used, {} dropped): adj R² = {:.4}",
            response,
            if labels.is_empty() {
                "1".to_string()
            } else {
                labels.join(" + ")
            },
            terms.len(),
            n,
            screened.n_dropped,
            result.adj_r_squared,
        );

        Ok(FittedModel {
            response: response.to_string(),
            terms: terms.clone(),
            labels,
            transform: self.transform,
            result,
            kept_rows: screened.kept_rows,
            n_dropped: screened.n_dropped,
        })
    }
}

/// Builder for [`LinearModel`].
#[derive(Debug, Clone, Default)]
pub struct LinearModelBuilder {
    options: FitOptions,
    transform: ResponseTransform,
}

impl LinearModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to include an intercept term.
    pub fn with_intercept(mut self, include: bool) -> Self {
        self.options.with_intercept = include;
        self
    }

    /// Set whether to compute inference statistics.
    pub fn compute_inference(mut self, compute: bool) -> Self {
        self.options.compute_inference = compute;
        self
    }

    /// Set the confidence level for coefficient intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.options.confidence_level = level;
        self
    }

    /// Set the missing-value policy.
    pub fn missing(mut self, policy: crate::core::MissingPolicy) -> Self {
        self.options.missing = policy;
        self
    }

    /// Set the response transform.
    pub fn transform(mut self, transform: ResponseTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Build the model.
    pub fn build(self) -> LinearModel {
        LinearModel {
            options: self.options,
            transform: self.transform,
        }
    }
}

/// Fit of the mean-only model, used when the term set is empty.
fn fit_intercept_only(y: &Col<f64>, options: &FitOptions) -> Result<FitResult, RegressionError> {
    let n = y.nrows();
    if n < 2 {
        return Err(RegressionError::InsufficientObservations { needed: 2, got: n });
    }

    let mean = y.iter().sum::<f64>() / n as f64;
    let fitted_values = Col::from_fn(n, |_| mean);
    let residuals = Col::from_fn(n, |i| y[i] - mean);

    let stats = fit_statistics(y, &residuals, 1, true);

    let mut result = FitResult::empty(0, n);
    result.intercept = Some(mean);
    result.residuals = residuals;
    result.fitted_values = fitted_values;
    result.rank = 0;
    result.n_parameters = 1;
    result.rank_tolerance = options.rank_tolerance;
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
    result.confidence_level = options.confidence_level;

    if options.compute_inference && result.mse.is_finite() {
        // SE of the mean; the empty coefficient block stays empty.
        let se = (result.mse / n as f64).sqrt();
        let df = (n - 1) as f64;
        let t = if se > 0.0 { mean / se } else { f64::NAN };

        use statrs::distribution::{ContinuousCDF, StudentsT};
        if let Ok(t_dist) = StudentsT::new(0.0, 1.0, df) {
            let p = if t.is_finite() {
                2.0 * (1.0 - t_dist.cdf(t.abs()))
            } else {
                f64::NAN
            };
            let t_crit = t_dist.inverse_cdf(1.0 - (1.0 - options.confidence_level) / 2.0);

            result.intercept_std_error = Some(se);
            result.intercept_t_statistic = Some(t);
            result.intercept_p_value = Some(p);
            result.intercept_conf_interval = Some((mean - t_crit * se, mean + t_crit * se));
            result.std_errors = Some(Col::zeros(0));
            result.t_statistics = Some(Col::zeros(0));
            result.p_values = Some(Col::zeros(0));
            result.conf_interval_lower = Some(Col::zeros(0));
            result.conf_interval_upper = Some(Col::zeros(0));
        }
    }

    Ok(result)
}

/// A fitted formula-level model.
#[derive(Debug, Clone)]
pub struct FittedModel {
    response: String,
    terms: TermSet,
    labels: Vec<String>,
    transform: ResponseTransform,
    result: FitResult,
    kept_rows: Vec<usize>,
    n_dropped: usize,
}

impl FittedModel {
    /// The response variable name.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// The fitted term set.
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Term labels in design-column order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The response transform the model was fit under.
    pub fn transform(&self) -> ResponseTransform {
        self.transform
    }

    /// The underlying fit result.
    pub fn result(&self) -> &FitResult {
        &self.result
    }

    /// Original row indices of the observations used in the fit.
    pub fn kept_rows(&self) -> &[usize] {
        &self.kept_rows
    }

    /// Number of rows dropped by the missing-value policy.
    pub fn n_dropped(&self) -> usize {
        self.n_dropped
    }

    /// R².
    pub fn r_squared(&self) -> f64 {
        self.result.r_squared
    }

    /// Adjusted R².
    pub fn adj_r_squared(&self) -> f64 {
        self.result.adj_r_squared
    }

    /// The intercept, if fit with one.
    pub fn intercept(&self) -> Option<f64> {
        self.result.intercept
    }

    /// Coefficient for a term; `None` if absent or aliased.
    pub fn coefficient(&self, term: &Term) -> Option<f64> {
        let idx = self.terms.index_of(term)?;
        self.result.get_coefficient(idx)
    }

    /// Standard error for a term's coefficient, when inference was computed.
    pub fn std_error(&self, term: &Term) -> Option<f64> {
        let idx = self.terms.index_of(term)?;
        let se = self.result.std_errors.as_ref()?[idx];
        (!se.is_nan()).then_some(se)
    }

    /// Two-tailed p-value for a term's coefficient, when inference was
    /// computed; NaN-valued (aliased) entries come back as `None`.
    pub fn p_value(&self, term: &Term) -> Option<f64> {
        let idx = self.terms.index_of(term)?;
        let p = self.result.p_values.as_ref()?[idx];
        (!p.is_nan()).then_some(p)
    }

    /// Multiplicative effect `exp(b)` of a one-unit increase in a term's
    /// predictor, for log-response models.
    pub fn multiplicative_effect(&self, term: &Term) -> Option<f64> {
        self.transform.multiplicative_effect(self.coefficient(term)?)
    }

    /// Residuals on the transformed (model) scale, for the rows used.
    pub fn residuals(&self) -> &Col<f64> {
        &self.result.residuals
    }

    /// Fitted values on the transformed (model) scale, for the rows used.
    pub fn fitted_values(&self) -> &Col<f64> {
        &self.result.fitted_values
    }

    /// Predict on the transformed (model) scale.
    pub fn predict_transformed(&self, frame: &DataFrame) -> Result<Col<f64>, ModelError> {
        let (x, _) = build_design(frame, &self.terms)?;
        Ok(self.linear_predictor(&x))
    }

    /// Predict on the response scale (inverse-transformed).
    pub fn predict(&self, frame: &DataFrame) -> Result<Col<f64>, ModelError> {
        let transformed = self.predict_transformed(frame)?;
        Ok(Col::from_fn(transformed.nrows(), |i| {
            self.transform.invert(transformed[i])
        }))
    }

    /// The four residual diagnostic series for assumption checking.
    pub fn diagnostics(&self) -> DiagnosticReport {
        DiagnosticReport::new(&self.result, &self.kept_rows)
    }

    /// The coefficient table and fit statistics, ready for display.
    pub fn summary(&self) -> ModelSummary<'_> {
        ModelSummary { model: self }
    }

    fn linear_predictor(&self, x: &Mat<f64>) -> Col<f64> {
        let intercept = self.result.intercept.unwrap_or(0.0);
        Col::from_fn(x.nrows(), |i| {
            let mut pred = intercept;
            for j in 0..x.ncols() {
                if !self.result.aliased[j] && !self.result.coefficients[j].is_nan() {
                    pred += x[(i, j)] * self.result.coefficients[j];
                }
            }
            pred
        })
    }
}

/// `Display`able coefficient summary, in the shape of R's `summary(lm)`.
pub struct ModelSummary<'a> {
    model: &'a FittedModel,
}

impl fmt::Display for ModelSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = self.model;
        let result = model.result();

        let rhs = if model.labels.is_empty() {
            "1".to_string()
        } else {
            model.labels.join(" + ")
        };
        writeln!(f, "Call: {} ~ {}", model.response, rhs)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<16} {:>12} {:>12} {:>10} {:>10}",
            "term", "estimate", "std.error", "t.value", "p.value"
        )?;

        if let Some(intercept) = result.intercept {
            write_row(
                f,
                "(Intercept)",
                intercept,
                result.intercept_std_error,
                result.intercept_t_statistic,
                result.intercept_p_value,
            )?;
        }
        for (idx, label) in model.labels.iter().enumerate() {
            let estimate = result.coefficients[idx];
            write_row(
                f,
                label,
                estimate,
                result.std_errors.as_ref().map(|se| se[idx]),
                result.t_statistics.as_ref().map(|t| t[idx]),
                result.p_values.as_ref().map(|p| p[idx]),
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Residual standard error: {:.4} on {} degrees of freedom",
            result.rmse,
            result.residual_df()
        )?;
        if model.n_dropped > 0 {
            writeln!(
                f,
                "  ({} observations deleted due to missingness)",
                model.n_dropped
            )?;
        }
        writeln!(
            f,
            "Multiple R-squared: {:.4}, Adjusted R-squared: {:.4}",
            result.r_squared, result.adj_r_squared
        )?;
        if result.f_statistic.is_finite() {
            writeln!(
                f,
                "F-statistic: {:.2} on {} and {} DF, p-value: {:.4}",
                result.f_statistic,
                result.model_df(),
                result.residual_df(),
                result.f_pvalue
            )?;
        }

        Ok(())
    }
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    estimate: f64,
    se: Option<f64>,
    t: Option<f64>,
    p: Option<f64>,
) -> fmt::Result {
    write!(f, "{label:<16} {estimate:>12.6}")?;
    match (se, t, p) {
        (Some(se), Some(t), Some(p)) => writeln!(f, " {se:>12.6} {t:>10.3} {p:>10.4}"),
        _ => writeln!(f),
    }
}
