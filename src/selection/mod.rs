//! Stepwise variable selection.
//!
//! Both procedures are greedy: one candidate move is evaluated per
//! iteration and committed permanently, so they do not search all 2^k
//! subsets and do not guarantee the globally best adjusted R². That is the
//! documented contract, not a shortcut.
//!
//! Candidate moves respect the interaction requirement graph at every
//! intermediate model: a main effect stays while a surviving interaction
//! references it, and an interaction enters only after all of its mains.
//!
//! Ties are broken deterministically: candidates are scanned in term-set
//! order (original variable order) and an incumbent is replaced only on a
//! strictly better score, so the earliest-indexed term wins exact ties.

mod backward;
mod forward;

pub use backward::backward_eliminate;
pub use forward::forward_select;

use crate::formula::Term;
use crate::model::{FittedModel, ModelError};

/// Default significance threshold for entering or removing a term.
pub const DEFAULT_THRESHOLD: f64 = 0.10;

/// Score used to accept or reject a candidate move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepCriterion {
    /// Accept a removal that does not decrease adjusted R²; accept an
    /// addition that strictly increases it.
    AdjRSquared,
    /// Remove the weakest term with coefficient p-value above `threshold`;
    /// add the strongest term with p-value below it.
    PValue { threshold: f64 },
}

impl Default for StepCriterion {
    fn default() -> Self {
        StepCriterion::PValue {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// What a selection step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    Removed,
    Added,
}

/// One accepted step of a stepwise procedure.
#[derive(Debug, Clone)]
pub struct SelectionStep {
    /// The term that was removed or added.
    pub term: Term,
    /// Whether the term was removed or added.
    pub action: StepAction,
    /// The score that drove the decision: the term's p-value under
    /// [`StepCriterion::PValue`], or the candidate model's adjusted R²
    /// under [`StepCriterion::AdjRSquared`].
    pub criterion_value: f64,
    /// Adjusted R² before the step.
    pub adj_r_squared_before: f64,
    /// Adjusted R² after the step.
    pub adj_r_squared_after: f64,
}

/// Final model plus the ordered trace of accepted steps.
#[derive(Debug, Clone)]
pub struct SelectionResult {
    /// The model the procedure terminated with.
    pub model: FittedModel,
    /// Accepted steps, in order.
    pub steps: Vec<SelectionStep>,
}

impl SelectionResult {
    /// Labels of the stepped terms, in acceptance order.
    pub fn trace_labels(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.term.label()).collect()
    }
}

/// The p-value scoring a term for removal. Aliased terms score infinity so
/// they are the first to go.
fn removal_p_value(fitted: &FittedModel, term: &Term) -> Result<f64, ModelError> {
    if fitted.result().p_values.is_none() {
        return Err(ModelError::InferenceUnavailable);
    }
    Ok(fitted.p_value(term).unwrap_or(f64::INFINITY))
}
