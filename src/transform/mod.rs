//! Response transformations.
//!
//! A right-skewed response is transformed before fitting; the fitted model
//! then lives on the transformed scale and predictions are inverted back.
//! Coefficients of a log-response model read multiplicatively: a one-unit
//! increase in x_k multiplies the expected response by exp(b_k).

use thiserror::Error;

/// Offset added to a response containing exact zeros before taking logs.
pub const ZERO_LOG_OFFSET: f64 = 1e-7;

/// Errors raised when a transform is applied outside its domain.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("log transform requires positive values, got {value} (consider Log {{ offset: {ZERO_LOG_OFFSET} }} for zeros)")]
    NonPositiveLog { value: f64 },

    #[error("sqrt transform requires non-negative values, got {value}")]
    NegativeSqrt { value: f64 },
}

/// Transformation applied to the response before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ResponseTransform {
    /// Fit the response as-is.
    #[default]
    Identity,
    /// Fit `ln(y + offset)`. Use an offset of [`ZERO_LOG_OFFSET`] when the
    /// response contains exact zeros; with offset 0, non-positive values are
    /// rejected.
    Log { offset: f64 },
    /// Fit `sqrt(y)`, appropriate for count responses.
    Sqrt,
}

impl ResponseTransform {
    /// A plain log transform (offset 0).
    pub fn log() -> Self {
        ResponseTransform::Log { offset: 0.0 }
    }

    /// A log transform with the conventional offset for zero counts.
    pub fn log_with_zero_offset() -> Self {
        ResponseTransform::Log {
            offset: ZERO_LOG_OFFSET,
        }
    }

    /// Apply the transform to one response value.
    ///
    /// NaN passes through untouched so missing values reach the
    /// missing-value policy instead of erroring here.
    pub fn apply(&self, value: f64) -> Result<f64, TransformError> {
        if value.is_nan() {
            return Ok(f64::NAN);
        }
        match *self {
            ResponseTransform::Identity => Ok(value),
            ResponseTransform::Log { offset } => {
                let shifted = value + offset;
                if shifted <= 0.0 {
                    Err(TransformError::NonPositiveLog { value })
                } else {
                    Ok(shifted.ln())
                }
            }
            ResponseTransform::Sqrt => {
                if value < 0.0 {
                    Err(TransformError::NegativeSqrt { value })
                } else {
                    Ok(value.sqrt())
                }
            }
        }
    }

    /// Map a prediction on the transformed scale back to the response scale.
    pub fn invert(&self, value: f64) -> f64 {
        match *self {
            ResponseTransform::Identity => value,
            ResponseTransform::Log { offset } => value.exp() - offset,
            ResponseTransform::Sqrt => value * value,
        }
    }

    /// Multiplicative effect of a one-unit predictor increase for a
    /// log-response model: exp(b). `None` for other transforms, where
    /// coefficients read additively on their own scale.
    pub fn multiplicative_effect(&self, coefficient: f64) -> Option<f64> {
        match self {
            ResponseTransform::Log { .. } => Some(coefficient.exp()),
            _ => None,
        }
    }
}
