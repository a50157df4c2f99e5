//! Matrix-level estimators.

mod ols;
mod traits;

pub(crate) use ols::{fit_statistics, FitStatistics};
pub use ols::{FittedOls, OlsRegressor};
pub use traits::{FittedRegressor, RegressionError, Regressor};
