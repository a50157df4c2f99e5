//! Residual diagnostics for the four assumption checks.
//!
//! A fitted model supports four qualitative checks: linearity (residuals
//! vs fitted), independence (residuals vs observation order), normality
//! (QQ series and histogram), and equal variance (scale-location). This
//! module computes the series; plotting is out of scope.

mod checks;
mod residuals;

pub use checks::{DiagnosticReport, Histogram};
pub use residuals::standardized_residuals;
