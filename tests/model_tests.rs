//! Formula-driven model fitting tests.

mod common;

use approx::assert_relative_eq;
use lmselect::core::MissingPolicy;
use lmselect::model::ModelError;
use lmselect::prelude::*;

// ============================================================================
// Formula Parsing Tests
// ============================================================================

#[test]
fn test_parse_main_effects() {
    let formula = Formula::parse("y ~ x1 + x2").unwrap();

    assert_eq!(formula.response(), "y");
    assert_eq!(formula.terms().labels(), vec!["x1", "x2"]);
}

#[test]
fn test_parse_interaction() {
    let formula = Formula::parse("y ~ x1 + x2 + x1:x2").unwrap();

    let terms = formula.terms();
    assert_eq!(terms.len(), 3);
    assert!(terms.contains(&Term::interaction(["x1", "x2"]).unwrap()));
}

#[test]
fn test_parse_star_expands_to_mains_and_interaction() {
    let formula = Formula::parse("y ~ x1*x2").unwrap();

    let terms = formula.terms();
    assert!(terms.contains(&Term::main("x1")));
    assert!(terms.contains(&Term::main("x2")));
    assert!(terms.contains(&Term::interaction(["x1", "x2"]).unwrap()));
}

#[test]
fn test_interaction_factors_are_canonical() {
    // b:a and a:b name the same term
    let ab = Term::interaction(["a", "b"]).unwrap();
    let ba = Term::interaction(["b", "a"]).unwrap();

    assert_eq!(ab, ba);
    assert_eq!(ba.label(), "a:b");
}

#[test]
fn test_parse_rejects_missing_tilde() {
    assert!(matches!(
        Formula::parse("y + x1"),
        Err(FormulaError::Parse(_))
    ));
}

#[test]
fn test_orphan_interaction_rejected() {
    // x1:x2 without both main effects present
    let result = TermSet::from_terms(vec![
        Term::main("x1"),
        Term::interaction(["x1", "x2"]).unwrap(),
    ]);
    assert!(matches!(
        result,
        Err(FormulaError::OrphanInteraction { .. })
    ));
}

// ============================================================================
// Fitting Tests
// ============================================================================

#[test]
fn test_fit_recovers_coefficients() {
    let frame = common::linear_frame(80, 0.05, 13);
    let formula = Formula::parse("y ~ x1 + x2").unwrap();

    let model = LinearModel::new();
    let fitted = model.fit(&frame, &formula).unwrap();

    assert_relative_eq!(
        fitted.coefficient(&Term::main("x1")).unwrap(),
        3.0,
        epsilon = 0.05
    );
    assert_relative_eq!(
        fitted.coefficient(&Term::main("x2")).unwrap(),
        -1.5,
        epsilon = 0.05
    );
    assert_relative_eq!(fitted.intercept().unwrap(), 2.0, epsilon = 0.1);
    assert!(fitted.r_squared() > 0.99);
}

#[test]
fn test_fit_interaction_term() {
    let frame = common::interaction_frame(100, 0.02, 29);
    let formula = Formula::parse("y ~ x1*x2").unwrap();

    let fitted = LinearModel::new().fit(&frame, &formula).unwrap();

    let interaction = Term::interaction(["x1", "x2"]).unwrap();
    assert_relative_eq!(
        fitted.coefficient(&interaction).unwrap(),
        1.5,
        epsilon = 0.05
    );
    assert!(fitted.p_value(&interaction).unwrap() < 1e-6);
}

#[test]
fn test_intercept_only_fit_is_the_mean() {
    let frame = common::linear_frame(30, 0.1, 5);
    let model = LinearModel::new();

    let fitted = model.fit_terms(&frame, "y", &TermSet::empty()).unwrap();

    let y = frame.column("y").unwrap();
    let mean = y.iter().sum::<f64>() / y.len() as f64;
    assert_relative_eq!(fitted.intercept().unwrap(), mean, epsilon = 1e-10);
    assert_relative_eq!(fitted.adj_r_squared(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_unknown_column_errors() {
    let frame = common::linear_frame(20, 0.1, 1);
    let formula = Formula::parse("y ~ nope").unwrap();

    let result = LinearModel::new().fit(&frame, &formula);
    assert!(matches!(result, Err(ModelError::Data(_))));
}

// ============================================================================
// Missing Value Handling Tests
// ============================================================================

#[test]
fn test_missing_rows_are_dropped() {
    let mut y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let x = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    y[2] = f64::NAN;

    let frame = DataFrame::new(vec!["y".into(), "x".into()], vec![y, x]).unwrap();
    let formula = Formula::parse("y ~ x").unwrap();

    let fitted = LinearModel::new().fit(&frame, &formula).unwrap();

    assert_eq!(fitted.n_dropped(), 1);
    assert_eq!(fitted.kept_rows(), &[0, 1, 3, 4, 5]);
    assert_relative_eq!(fitted.coefficient(&Term::main("x")).unwrap(), 1.0, epsilon = 1e-8);
}

#[test]
fn test_missing_policy_fail() {
    let frame = DataFrame::new(
        vec!["y".into(), "x".into()],
        vec![vec![1.0, f64::NAN, 3.0], vec![0.0, 1.0, 2.0]],
    )
    .unwrap();
    let formula = Formula::parse("y ~ x").unwrap();

    let model = LinearModel::builder()
        .missing(MissingPolicy::Fail)
        .build();
    let result = model.fit(&frame, &formula);
    assert!(matches!(result, Err(ModelError::Missing(_))));
}

// ============================================================================
// Response Transformation Tests
// ============================================================================

#[test]
fn test_log_transform_rejects_non_positive_response() {
    let frame = DataFrame::new(
        vec!["y".into(), "x".into()],
        vec![vec![1.0, 0.0, 3.0], vec![0.0, 1.0, 2.0]],
    )
    .unwrap();
    let formula = Formula::parse("y ~ x").unwrap();

    let model = LinearModel::builder()
        .transform(ResponseTransform::log())
        .build();
    let result = model.fit(&frame, &formula);
    assert!(matches!(result, Err(ModelError::Transform(_))));
}

#[test]
fn test_log_with_zero_offset_accepts_zeros() {
    let frame = DataFrame::new(
        vec!["y".into(), "x".into()],
        vec![
            vec![0.0, 1.0, 2.0, 4.0, 8.0, 16.0],
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        ],
    )
    .unwrap();
    let formula = Formula::parse("y ~ x").unwrap();

    let model = LinearModel::builder()
        .transform(ResponseTransform::log_with_zero_offset())
        .build();
    assert!(model.fit(&frame, &formula).is_ok());
}

#[test]
fn test_log_model_multiplicative_effect() {
    // y = exp(0.5 + 0.3*x), exact
    let x: Vec<f64> = (0..40).map(|i| i as f64 / 4.0).collect();
    let y: Vec<f64> = x.iter().map(|&v| (0.5 + 0.3 * v).exp()).collect();
    let frame = DataFrame::new(vec!["y".into(), "x".into()], vec![y, x]).unwrap();
    let formula = Formula::parse("y ~ x").unwrap();

    let model = LinearModel::builder()
        .transform(ResponseTransform::log())
        .build();
    let fitted = model.fit(&frame, &formula).unwrap();

    let term = Term::main("x");
    let b = fitted.coefficient(&term).unwrap();
    assert_relative_eq!(b, 0.3, epsilon = 1e-10);

    // A unit increase in x multiplies the predicted response by exp(b).
    let effect = fitted.multiplicative_effect(&term).unwrap();
    assert_relative_eq!(effect, (0.3f64).exp(), epsilon = 1e-10);

    let at = DataFrame::new(
        vec!["y".into(), "x".into()],
        vec![vec![0.0, 0.0], vec![2.0, 3.0]],
    )
    .unwrap();
    let preds = fitted.predict(&at).unwrap();
    assert_relative_eq!(preds[1] / preds[0], effect, epsilon = 1e-8);
}

#[test]
fn test_sqrt_transform_round_trip() {
    let x: Vec<f64> = (0..30).map(|i| i as f64 / 2.0).collect();
    let y: Vec<f64> = x.iter().map(|&v| (1.0 + 0.4 * v).powi(2)).collect();
    let frame = DataFrame::new(vec!["y".into(), "x".into()], vec![y.clone(), x]).unwrap();
    let formula = Formula::parse("y ~ x").unwrap();

    let model = LinearModel::builder()
        .transform(ResponseTransform::Sqrt)
        .build();
    let fitted = model.fit(&frame, &formula).unwrap();

    // Predictions come back on the original scale.
    let preds = fitted.predict(&frame).unwrap();
    for (pred, actual) in preds.iter().zip(y.iter()) {
        assert_relative_eq!(pred, actual, epsilon = 1e-8);
    }
}

// ============================================================================
// Summary Tests
// ============================================================================

#[test]
fn test_summary_lists_terms() {
    let frame = common::linear_frame(50, 0.1, 3);
    let formula = Formula::parse("y ~ x1 + x2").unwrap();

    let fitted = LinearModel::new().fit(&frame, &formula).unwrap();
    let text = fitted.summary().to_string();

    assert!(text.contains("y ~ x1 + x2"));
    assert!(text.contains("(Intercept)"));
    assert!(text.contains("x1"));
    assert!(text.contains("Adjusted R-squared"));
}

// ============================================================================
// Example Scenario
// ============================================================================

#[test]
fn test_ozone_style_log_model() {
    let frame = common::ozone_frame(150, 0.05, 77);
    let formula = Formula::parse("ozone ~ solar + wind + temp").unwrap();

    let model = LinearModel::builder()
        .transform(ResponseTransform::log())
        .build();
    let fitted = model.fit(&frame, &formula).unwrap();

    let solar = fitted.coefficient(&Term::main("solar")).unwrap();
    let wind = fitted.coefficient(&Term::main("wind")).unwrap();
    let temp = fitted.coefficient(&Term::main("temp")).unwrap();

    assert!(wind < 0.0, "more wind disperses ozone");
    assert!(temp > 0.0, "warmer days mean more ozone");
    assert_relative_eq!(solar, 0.003, epsilon = 0.002);
    assert_relative_eq!(wind, -0.062, epsilon = 0.02);
    assert_relative_eq!(temp, 0.049, epsilon = 0.01);

    // All three predictors carry real signal here.
    for term in formula.terms().iter() {
        assert!(fitted.p_value(term).unwrap() < 0.01);
    }
}
