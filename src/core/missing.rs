//! Missing-value screening applied before fitting.
//!
//! A row is unusable when the response or any design column holds a NaN.
//! `Omit` drops such rows (R's `na.omit`); `Fail` aborts the fit instead
//! (R's `na.fail`). The indices of kept rows are preserved so residuals
//! can still be related to original observation order.

use faer::{Col, Mat};
use thiserror::Error;

/// How rows containing missing values are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Drop rows containing missing values before fitting.
    #[default]
    Omit,
    /// Return an error if any missing value is present.
    Fail,
}

/// Errors raised during missing-value screening.
#[derive(Debug, Error)]
pub enum MissingError {
    #[error("missing values found in data: {n_missing} rows contain NaN")]
    MissingValuesPresent { n_missing: usize },

    #[error("all rows contain missing values")]
    AllMissing,
}

/// Outcome of screening a design matrix and response for missing values.
#[derive(Debug, Clone)]
pub struct ScreenedData {
    /// Design matrix with unusable rows removed.
    pub x: Mat<f64>,
    /// Response with unusable rows removed.
    pub y: Col<f64>,
    /// Original indices of the rows that were kept.
    pub kept_rows: Vec<usize>,
    /// Number of rows dropped.
    pub n_dropped: usize,
}

/// Screen `x` and `y` for missing values under the given policy.
pub fn screen_missing(
    x: &Mat<f64>,
    y: &Col<f64>,
    policy: MissingPolicy,
) -> Result<ScreenedData, MissingError> {
    let n = y.nrows();
    let p = x.ncols();

    let kept_rows: Vec<usize> = (0..n)
        .filter(|&i| !y[i].is_nan() && (0..p).all(|j| !x[(i, j)].is_nan()))
        .collect();
    let n_dropped = n - kept_rows.len();

    if n_dropped > 0 && policy == MissingPolicy::Fail {
        return Err(MissingError::MissingValuesPresent {
            n_missing: n_dropped,
        });
    }
    if kept_rows.is_empty() {
        return Err(MissingError::AllMissing);
    }

    let x_clean = Mat::from_fn(kept_rows.len(), p, |i, j| x[(kept_rows[i], j)]);
    let y_clean = Col::from_fn(kept_rows.len(), |i| y[kept_rows[i]]);

    Ok(ScreenedData {
        x: x_clean,
        y: y_clean,
        kept_rows,
        n_dropped,
    })
}
