//! Core traits for the matrix-level estimators.

use crate::core::FitResult;
use faer::{Col, Mat};
use thiserror::Error;

/// Errors that can occur during fitting.
#[derive(Debug, Error)]
pub enum RegressionError {
    #[error("dimension mismatch: X has {x_rows} rows but y has {y_len} elements")]
    DimensionMismatch { x_rows: usize, y_len: usize },

    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    #[error("matrix is singular or nearly singular")]
    SingularMatrix,

    #[error("all features are constant")]
    AllFeaturesConstant,

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] crate::core::OptionsError),
}

/// An estimator that can be fit to a design matrix and response vector.
pub trait Regressor {
    /// The type of the fitted model.
    type Fitted: FittedRegressor;

    /// Fit the model.
    ///
    /// `x` has shape (n_samples, n_features); `y` has length n_samples.
    fn fit(&self, x: &Mat<f64>, y: &Col<f64>) -> Result<Self::Fitted, RegressionError>;
}

/// A fitted model that can predict and expose its fit result.
pub trait FittedRegressor {
    /// Predict for new rows of the design matrix.
    fn predict(&self, x: &Mat<f64>) -> Col<f64>;

    /// The fit result (coefficients, statistics, inference).
    fn result(&self) -> &FitResult;

    /// Coefficients (convenience).
    fn coefficients(&self) -> &Col<f64> {
        &self.result().coefficients
    }

    /// Intercept (convenience).
    fn intercept(&self) -> Option<f64> {
        self.result().intercept
    }

    /// R² on the training data (convenience).
    fn r_squared(&self) -> f64 {
        self.result().r_squared
    }

    /// Adjusted R² on the training data (convenience).
    fn adj_r_squared(&self) -> f64 {
        self.result().adj_r_squared
    }

    /// R² computed on new data.
    fn score(&self, x: &Mat<f64>, y: &Col<f64>) -> f64 {
        let predictions = self.predict(x);
        let n = y.nrows();

        let y_mean: f64 = y.iter().sum::<f64>() / n as f64;
        let tss: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();
        let rss: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(&yi, &pi)| (yi - pi).powi(2))
            .sum();

        if tss == 0.0 {
            if rss == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - rss / tss
        }
    }
}
