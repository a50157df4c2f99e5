//! Forward selection.

use log::debug;

use crate::data::DataFrame;
use crate::formula::Formula;
use crate::model::{FittedModel, LinearModel, ModelError};
use crate::selection::{SelectionResult, SelectionStep, StepAction, StepCriterion};

/// Run forward selection from the intercept-only model.
///
/// The candidate universe is `formula`'s term set. Each iteration trials
/// every addable not-yet-included candidate alone on top of the current
/// model: under [`StepCriterion::AdjRSquared`] the addition with the
/// highest adjusted R² is accepted if it strictly improves on the current
/// model; under [`StepCriterion::PValue`] the addition whose coefficient
/// has the smallest p-value below the threshold is accepted. Terminates
/// when no addition qualifies.
pub fn forward_select(
    model: &LinearModel,
    frame: &DataFrame,
    formula: &Formula,
    criterion: StepCriterion,
) -> Result<SelectionResult, ModelError> {
    let universe = formula.terms();
    let response = formula.response();

    let mut included = vec![false; universe.len()];
    let mut current = model.fit_terms(frame, response, &universe.subset(&included))?;
    let mut steps = Vec::new();

    loop {
        // Best addable candidate, earliest index on ties.
        let mut best: Option<(usize, f64, FittedModel)> = None;
        for idx in 0..universe.len() {
            if !universe.addable(&included, idx) {
                continue;
            }
            let term = &universe.terms()[idx];

            let mut mask = included.clone();
            mask[idx] = true;
            let candidate = model.fit_terms(frame, response, &universe.subset(&mask))?;

            let score = match criterion {
                StepCriterion::AdjRSquared => candidate.adj_r_squared(),
                StepCriterion::PValue { .. } => {
                    if candidate.result().p_values.is_none() {
                        return Err(ModelError::InferenceUnavailable);
                    }
                    match candidate.p_value(term) {
                        Some(p) => p,
                        // aliased in this candidate model: never admit
                        None => continue,
                    }
                }
            };
            if !score.is_finite() {
                continue;
            }

            let improves_best = match (&best, criterion) {
                (None, _) => true,
                (Some((_, best_score, _)), StepCriterion::AdjRSquared) => score > *best_score,
                (Some((_, best_score, _)), StepCriterion::PValue { .. }) => score < *best_score,
            };
            if improves_best {
                best = Some((idx, score, candidate));
            }
        }

        let step = match (best, criterion) {
            (Some(candidate), StepCriterion::AdjRSquared)
                if candidate.1 > current.adj_r_squared() =>
            {
                Some(candidate)
            }
            (Some(candidate), StepCriterion::PValue { threshold })
                if candidate.1 < threshold =>
            {
                Some(candidate)
            }
            _ => None,
        };

        let Some((idx, criterion_value, candidate)) = step else {
            debug!(
                "forward selection done after {} additions: adj R² = {:.4}",
                steps.len(),
                current.adj_r_squared()
            );
            break;
        };
        included[idx] = true;

        let term = universe.terms()[idx].clone();
        debug!(
            "forward selection: adding {} (score {:.4}), adj R² {:.4} -> {:.4}",
            term,
            criterion_value,
            current.adj_r_squared(),
            candidate.adj_r_squared()
        );
        steps.push(SelectionStep {
            term,
            action: StepAction::Added,
            criterion_value,
            adj_r_squared_before: current.adj_r_squared(),
            adj_r_squared_after: candidate.adj_r_squared(),
        });
        current = candidate;
    }

    Ok(SelectionResult {
        model: current,
        steps,
    })
}
