//! Core types: fit options, fit results, missing-value policy.

mod missing;
mod options;
mod result;

pub use missing::{screen_missing, MissingError, MissingPolicy, ScreenedData};
pub use options::{FitOptions, FitOptionsBuilder, OptionsError};
pub use result::FitResult;
