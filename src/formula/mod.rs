//! Model terms and R-style formula parsing.
//!
//! A model is described by a response name and an ordered [`TermSet`] of
//! main effects and interaction terms. Interactions form a requirement
//! graph over their main effects: an interaction may only appear in a set
//! that also carries all of its mains, and the stepwise procedures respect
//! that constraint at every intermediate model.

mod design;

pub use design::build_design;

use std::fmt;
use thiserror::Error;

/// Errors raised while parsing formulas or assembling term sets.
#[derive(Debug, Error)]
pub enum FormulaError {
    #[error("malformed formula: {0}")]
    Parse(String),

    #[error("duplicate term: {0}")]
    DuplicateTerm(String),

    #[error("interaction {interaction} requires main effect {missing}")]
    OrphanInteraction {
        interaction: String,
        missing: String,
    },

    #[error("interaction needs at least two distinct factors, got {0:?}")]
    InvalidInteraction(Vec<String>),
}

/// A single model term: a main effect or an interaction of main effects.
///
/// Interaction factors are kept in sorted order so `a:b` and `b:a` compare
/// equal and render identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A single predictor column.
    Main(String),
    /// The row-wise product of two or more predictors.
    Interaction(Vec<String>),
}

impl Term {
    /// A main-effect term.
    pub fn main(name: impl Into<String>) -> Self {
        Term::Main(name.into())
    }

    /// An interaction term over two or more distinct factors.
    pub fn interaction<I, S>(factors: I) -> Result<Self, FormulaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut factors: Vec<String> = factors.into_iter().map(Into::into).collect();
        factors.sort();
        factors.dedup();
        if factors.len() < 2 {
            return Err(FormulaError::InvalidInteraction(factors));
        }
        Ok(Term::Interaction(factors))
    }

    /// The display label: the name itself, or `a:b` for interactions.
    pub fn label(&self) -> String {
        match self {
            Term::Main(name) => name.clone(),
            Term::Interaction(factors) => factors.join(":"),
        }
    }

    /// Whether this term is an interaction.
    pub fn is_interaction(&self) -> bool {
        matches!(self, Term::Interaction(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// An ordered, duplicate-free collection of model terms.
///
/// Insertion order is the original variable order; the stepwise procedures
/// use it as the deterministic tie-break when two candidates score equally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermSet {
    terms: Vec<Term>,
}

impl TermSet {
    /// The empty set (intercept-only model).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a validated set from a list of terms.
    pub fn from_terms(terms: Vec<Term>) -> Result<Self, FormulaError> {
        let set = Self { terms };
        set.validate()?;
        Ok(set)
    }

    /// Check duplicates and the interaction requirement graph.
    pub fn validate(&self) -> Result<(), FormulaError> {
        for (i, term) in self.terms.iter().enumerate() {
            if self.terms[..i].contains(term) {
                return Err(FormulaError::DuplicateTerm(term.label()));
            }
            if let Term::Interaction(factors) = term {
                for factor in factors {
                    let present = self
                        .terms
                        .iter()
                        .any(|t| matches!(t, Term::Main(name) if name == factor));
                    if !present {
                        return Err(FormulaError::OrphanInteraction {
                            interaction: term.label(),
                            missing: factor.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The terms, in order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Iterate over the terms.
    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    /// Position of a term in the set.
    pub fn index_of(&self, term: &Term) -> Option<usize> {
        self.terms.iter().position(|t| t == term)
    }

    /// Whether the set contains a term.
    pub fn contains(&self, term: &Term) -> bool {
        self.terms.contains(term)
    }

    /// Display labels for every term, in order.
    pub fn labels(&self) -> Vec<String> {
        self.terms.iter().map(Term::label).collect()
    }

    /// The subset selected by an inclusion mask, preserving order.
    ///
    /// The caller is responsible for keeping the mask dependency-consistent;
    /// the stepwise procedures do so via [`TermSet::removable`] and
    /// [`TermSet::addable`].
    pub fn subset(&self, included: &[bool]) -> TermSet {
        let terms = self
            .terms
            .iter()
            .zip(included.iter())
            .filter(|(_, &inc)| inc)
            .map(|(t, _)| t.clone())
            .collect();
        TermSet { terms }
    }

    /// Whether the term at `idx` can be removed from the masked subset
    /// without orphaning a surviving interaction.
    pub fn removable(&self, included: &[bool], idx: usize) -> bool {
        if !included[idx] {
            return false;
        }
        match &self.terms[idx] {
            Term::Interaction(_) => true,
            Term::Main(name) => !self.terms.iter().zip(included.iter()).any(|(t, &inc)| {
                inc && matches!(t, Term::Interaction(factors) if factors.contains(name))
            }),
        }
    }

    /// Whether the term at `idx` can be added to the masked subset: an
    /// interaction needs all of its main effects present first.
    pub fn addable(&self, included: &[bool], idx: usize) -> bool {
        if included[idx] {
            return false;
        }
        match &self.terms[idx] {
            Term::Main(_) => true,
            Term::Interaction(factors) => factors.iter().all(|factor| {
                self.terms.iter().zip(included.iter()).any(|(t, &inc)| {
                    inc && matches!(t, Term::Main(name) if name == factor)
                })
            }),
        }
    }
}

impl<'a> IntoIterator for &'a TermSet {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// A parsed model formula: response and candidate terms.
#[derive(Debug, Clone)]
pub struct Formula {
    response: String,
    terms: TermSet,
}

impl Formula {
    /// Build a formula from parts.
    pub fn new(response: impl Into<String>, terms: TermSet) -> Self {
        Self {
            response: response.into(),
            terms,
        }
    }

    /// Parse an R-style formula.
    ///
    /// Supported notation:
    /// - main effects joined by `+`: `y ~ a + b`
    /// - interactions with `:`: `y ~ a + b + a:b`
    /// - crossed terms with `*`: `a*b` expands to `a + b + a:b`
    ///
    /// A `:` interaction whose main effects are absent from the formula is
    /// rejected, matching the requirement graph.
    pub fn parse(input: &str) -> Result<Self, FormulaError> {
        let mut sides = input.split('~');
        let (lhs, rhs) = match (sides.next(), sides.next(), sides.next()) {
            (Some(lhs), Some(rhs), None) => (lhs.trim(), rhs.trim()),
            _ => {
                return Err(FormulaError::Parse(format!(
                    "expected exactly one '~' in {input:?}"
                )))
            }
        };

        if lhs.is_empty() {
            return Err(FormulaError::Parse("missing response".into()));
        }
        if rhs.is_empty() {
            return Err(FormulaError::Parse("missing predictors".into()));
        }

        let mut terms: Vec<Term> = Vec::new();
        let mut push_unique = |terms: &mut Vec<Term>, term: Term| {
            if !terms.contains(&term) {
                terms.push(term);
            }
        };

        for raw in rhs.split('+') {
            let raw = raw.trim();
            if raw.is_empty() {
                return Err(FormulaError::Parse(format!("empty term in {input:?}")));
            }

            if raw.contains('*') {
                // a*b expands to the mains plus the full interaction
                let factors = split_factors(raw, '*')?;
                for factor in &factors {
                    push_unique(&mut terms, Term::main(factor.clone()));
                }
                push_unique(&mut terms, Term::interaction(factors)?);
            } else if raw.contains(':') {
                let factors = split_factors(raw, ':')?;
                push_unique(&mut terms, Term::interaction(factors)?);
            } else {
                push_unique(&mut terms, Term::main(raw));
            }
        }

        Ok(Self {
            response: lhs.to_string(),
            terms: TermSet::from_terms(terms)?,
        })
    }

    /// The response variable name.
    pub fn response(&self) -> &str {
        &self.response
    }

    /// The candidate term set.
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }
}

fn split_factors(raw: &str, sep: char) -> Result<Vec<String>, FormulaError> {
    let factors: Vec<String> = raw
        .split(sep)
        .map(|f| f.trim().to_string())
        .collect();
    if factors.iter().any(String::is_empty) {
        return Err(FormulaError::Parse(format!("empty factor in {raw:?}")));
    }
    Ok(factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_main_effects() {
        let formula = Formula::parse("y ~ a + b").unwrap();
        assert_eq!(formula.response(), "y");
        assert_eq!(formula.terms().labels(), vec!["a", "b"]);
    }

    #[test]
    fn parse_explicit_interaction() {
        let formula = Formula::parse("y ~ a + b + a:b").unwrap();
        assert_eq!(formula.terms().labels(), vec!["a", "b", "a:b"]);
        assert!(formula.terms().terms()[2].is_interaction());
    }

    #[test]
    fn parse_crossed_expansion() {
        let formula = Formula::parse("y ~ a*b").unwrap();
        assert_eq!(formula.terms().labels(), vec!["a", "b", "a:b"]);
    }

    #[test]
    fn crossed_expansion_deduplicates_mains() {
        let formula = Formula::parse("y ~ a + a*b").unwrap();
        assert_eq!(formula.terms().labels(), vec!["a", "b", "a:b"]);
    }

    #[test]
    fn interaction_factors_are_canonical() {
        let ab = Term::interaction(["b", "a"]).unwrap();
        assert_eq!(ab, Term::interaction(["a", "b"]).unwrap());
        assert_eq!(ab.label(), "a:b");
    }

    #[test]
    fn orphan_interaction_is_rejected() {
        let result = Formula::parse("y ~ a + a:b");
        assert!(matches!(
            result,
            Err(FormulaError::OrphanInteraction { .. })
        ));
    }

    #[test]
    fn self_interaction_is_rejected() {
        assert!(matches!(
            Term::interaction(["a", "a"]),
            Err(FormulaError::InvalidInteraction(_))
        ));
    }

    #[test]
    fn malformed_formulas_are_rejected() {
        assert!(Formula::parse("y ~ ").is_err());
        assert!(Formula::parse(" ~ a").is_err());
        assert!(Formula::parse("y ~ a ~ b").is_err());
        assert!(Formula::parse("y ~ a + + b").is_err());
    }

    #[test]
    fn removable_respects_interactions() {
        let formula = Formula::parse("y ~ a + b + c + a:b").unwrap();
        let terms = formula.terms();
        let included = vec![true; terms.len()];

        // a and b are pinned by a:b; c and the interaction are free
        assert!(!terms.removable(&included, 0));
        assert!(!terms.removable(&included, 1));
        assert!(terms.removable(&included, 2));
        assert!(terms.removable(&included, 3));

        // once the interaction is out, a becomes removable
        let without_ab = vec![true, true, true, false];
        assert!(terms.removable(&without_ab, 0));
    }

    #[test]
    fn addable_respects_interactions() {
        let formula = Formula::parse("y ~ a + b + a:b").unwrap();
        let terms = formula.terms();

        let empty = vec![false; 3];
        assert!(terms.addable(&empty, 0));
        assert!(!terms.addable(&empty, 2));

        let mains_in = vec![true, true, false];
        assert!(terms.addable(&mains_in, 2));
    }

    #[test]
    fn subset_preserves_order() {
        let formula = Formula::parse("y ~ a + b + c").unwrap();
        let subset = formula.terms().subset(&[true, false, true]);
        assert_eq!(subset.labels(), vec!["a", "c"]);
    }
}
