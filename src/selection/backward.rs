//! Backward elimination.

use log::debug;

use crate::data::DataFrame;
use crate::formula::Formula;
use crate::model::{FittedModel, LinearModel, ModelError};
use crate::selection::{
    removal_p_value, SelectionResult, SelectionStep, StepAction, StepCriterion,
};

/// Run backward elimination from the full model over `formula`'s terms.
///
/// Starting from the model containing every candidate term, each iteration
/// finds the weakest removable term and drops it if the criterion allows:
/// under [`StepCriterion::PValue`] the highest p-value above the threshold
/// goes; under [`StepCriterion::AdjRSquared`] the removal yielding the
/// highest adjusted R² is accepted as long as it does not decrease it.
/// Terminates when no removal qualifies.
pub fn backward_eliminate(
    model: &LinearModel,
    frame: &DataFrame,
    formula: &Formula,
    criterion: StepCriterion,
) -> Result<SelectionResult, ModelError> {
    let universe = formula.terms();
    let response = formula.response();

    let mut included = vec![true; universe.len()];
    let mut current = model.fit_terms(frame, response, universe)?;
    let mut steps = Vec::new();

    loop {
        let step = match criterion {
            StepCriterion::PValue { threshold } => {
                // Weakest removable term: highest p-value, earliest index
                // on ties.
                let mut weakest: Option<(usize, f64)> = None;
                for idx in 0..universe.len() {
                    if !universe.removable(&included, idx) {
                        continue;
                    }
                    let p = removal_p_value(&current, &universe.terms()[idx])?;
                    if weakest.map_or(true, |(_, best_p)| p > best_p) {
                        weakest = Some((idx, p));
                    }
                }

                match weakest {
                    Some((idx, p)) if p > threshold => {
                        included[idx] = false;
                        let reduced =
                            model.fit_terms(frame, response, &universe.subset(&included))?;
                        Some((idx, p, reduced))
                    }
                    _ => None,
                }
            }
            StepCriterion::AdjRSquared => {
                // Best removal: highest resulting adjusted R², accepted only
                // if it does not fall below the current model's.
                let mut best: Option<(usize, FittedModel)> = None;
                for idx in 0..universe.len() {
                    if !universe.removable(&included, idx) {
                        continue;
                    }
                    let mut mask = included.clone();
                    mask[idx] = false;
                    let candidate = model.fit_terms(frame, response, &universe.subset(&mask))?;

                    let qualifies = candidate.adj_r_squared() >= current.adj_r_squared();
                    let improves_best = best
                        .as_ref()
                        .map_or(true, |(_, b)| candidate.adj_r_squared() > b.adj_r_squared());
                    if qualifies && improves_best {
                        best = Some((idx, candidate));
                    }
                }

                best.map(|(idx, reduced)| {
                    included[idx] = false;
                    (idx, reduced.adj_r_squared(), reduced)
                })
            }
        };

        let Some((idx, criterion_value, reduced)) = step else {
            debug!(
                "backward elimination done after {} removals: adj R² = {:.4}",
                steps.len(),
                current.adj_r_squared()
            );
            break;
        };

        let term = universe.terms()[idx].clone();
        debug!(
            "backward elimination: removing {} (score {:.4}), adj R² {:.4} -> {:.4}",
            term,
            criterion_value,
            current.adj_r_squared(),
            reduced.adj_r_squared()
        );
        steps.push(SelectionStep {
            term,
            action: StepAction::Removed,
            criterion_value,
            adj_r_squared_before: current.adj_r_squared(),
            adj_r_squared_after: reduced.adj_r_squared(),
        });
        current = reduced;
    }

    Ok(SelectionResult {
        model: current,
        steps,
    })
}
