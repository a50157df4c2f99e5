//! End-to-end walkthrough: fit, diagnose, transform, select.
//!
//! Run with: cargo run --example walkthrough

use lmselect::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Synthetic air-quality style data. Ozone grows exponentially in
    // temperature and shrinks with wind, so the raw-scale fit is poor
    // and the log-scale fit is right.
    let mut state = 2024u64;
    let mut rand = |scale: f64| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (((state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0) * scale
    };

    let n = 150;
    let mut solar = Vec::with_capacity(n);
    let mut wind = Vec::with_capacity(n);
    let mut temp = Vec::with_capacity(n);
    let mut noise = Vec::with_capacity(n);
    let mut ozone = Vec::with_capacity(n);
    for _ in 0..n {
        let s = 170.0 + rand(160.0);
        let w = 10.0 + rand(8.0);
        let t = 78.0 + rand(20.0);
        let junk = rand(1.0);
        let log_y = -0.262 + 0.003 * s - 0.062 * w + 0.049 * t + rand(0.15);
        solar.push(s);
        wind.push(w);
        temp.push(t);
        noise.push(junk);
        ozone.push(log_y.exp());
    }
    let frame = DataFrame::new(
        vec![
            "ozone".into(),
            "solar".into(),
            "wind".into(),
            "temp".into(),
            "noise".into(),
        ],
        vec![ozone, solar, wind, temp, noise],
    )?;

    // 1. Fit the full model on the raw response.
    let formula = Formula::parse("ozone ~ solar + wind + temp + noise")?;
    let raw_model = LinearModel::new();
    let raw_fit = raw_model.fit(&frame, &formula)?;
    println!("--- raw response ---");
    println!("{}", raw_fit.summary());

    // 2. Residual diagnostics on the raw fit.
    let report = raw_fit.diagnostics();
    println!(
        "histogram of residuals: {} bins, counts {:?}",
        report.histogram.counts.len(),
        report.histogram.counts
    );
    let worst = report
        .residuals_vs_fitted
        .iter()
        .map(|&(_, r)| r.abs())
        .fold(0.0f64, f64::max);
    println!("largest |residual|: {worst:.2}\n");

    // 3. Refit on the log scale.
    let log_model = LinearModel::builder()
        .transform(ResponseTransform::log())
        .build();
    let log_fit = log_model.fit(&frame, &formula)?;
    println!("--- log response ---");
    println!("{}", log_fit.summary());

    let temp_term = Term::main("temp");
    if let Some(effect) = log_fit.multiplicative_effect(&temp_term) {
        println!("one extra degree multiplies expected ozone by {effect:.4}\n");
    }

    // 4. Backward elimination drops the noise predictor.
    let selected = backward_eliminate(
        &log_model,
        &frame,
        &formula,
        StepCriterion::PValue { threshold: 0.10 },
    )?;
    println!("--- backward elimination ---");
    for step in &selected.steps {
        println!(
            "removed {} (p = {:.3}), adjusted R² {:.4} -> {:.4}",
            step.term.label(),
            step.criterion_value,
            step.adj_r_squared_before,
            step.adj_r_squared_after,
        );
    }
    println!("final terms: {:?}", selected.model.labels());

    // 5. Forward selection from the intercept-only model agrees.
    let forward = forward_select(
        &log_model,
        &frame,
        &formula,
        StepCriterion::PValue { threshold: 0.10 },
    )?;
    println!("\n--- forward selection ---");
    println!("added, in order: {:?}", forward.trace_labels());

    Ok(())
}
