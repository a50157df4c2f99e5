//! Linear model fitting and stepwise term selection.
//!
//! This library fits multiple linear regression models described by R-style
//! formulas, reports full coefficient inference (standard errors, t-statistics,
//! p-values, confidence intervals), produces residual diagnostic series, and
//! searches the term space by backward elimination or forward selection while
//! keeping interactions consistent with their main effects.
//!
//! # Example
//!
//! ```rust,ignore
//! use lmselect::prelude::*;
//!
//! let frame = DataFrame::from_csv("ozone.csv")?;
//! let formula = Formula::parse("ozone ~ solar + wind + temp + wind:temp")?;
//!
//! let model = LinearModel::builder()
//!     .transform(ResponseTransform::log())
//!     .build();
//! let fitted = model.fit(&frame, &formula)?;
//!
//! println!("{}", fitted.summary());
//!
//! // Drop terms that fail the p-value criterion, one per step.
//! let selected = backward_eliminate(&model, &frame, &formula, StepCriterion::default())?;
//! println!("kept: {:?}", selected.model.labels());
//! ```

pub mod core;
pub mod data;
pub mod diagnostics;
pub mod formula;
pub mod inference;
pub mod model;
pub mod selection;
pub mod solvers;
pub mod transform;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        FitOptions, FitOptionsBuilder, FitResult, MissingError, MissingPolicy, OptionsError,
    };
    pub use crate::data::{DataError, DataFrame};
    pub use crate::diagnostics::{standardized_residuals, DiagnosticReport, Histogram};
    pub use crate::formula::{Formula, FormulaError, Term, TermSet};
    pub use crate::model::{
        FittedModel, LinearModel, LinearModelBuilder, ModelError, ModelSummary,
    };
    pub use crate::selection::{
        backward_eliminate, forward_select, SelectionResult, SelectionStep, StepAction,
        StepCriterion,
    };
    pub use crate::solvers::{
        FittedOls, FittedRegressor, OlsRegressor, RegressionError, Regressor,
    };
    pub use crate::transform::{ResponseTransform, TransformError};
}

pub use crate::core::{FitOptions, FitOptionsBuilder, FitResult, MissingPolicy};
pub use crate::data::DataFrame;
pub use crate::formula::{Formula, Term, TermSet};
pub use crate::model::{FittedModel, LinearModel, ModelError};
pub use crate::selection::{backward_eliminate, forward_select, SelectionResult, StepCriterion};
pub use crate::transform::ResponseTransform;
