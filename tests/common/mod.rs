//! Common test utilities and data generators.

#![allow(dead_code)]

use lmselect::DataFrame;

/// Deterministic uniform draw in [-1, 1) for reproducible test data.
pub fn next_rand(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    ((*state >> 33) as f64) / (u32::MAX as f64) * 2.0 - 1.0
}

/// Frame with y = 2 + 3*x1 - 1.5*x2 + noise and a pure-noise column z.
pub fn linear_frame(n_rows: usize, noise_std: f64, seed: u64) -> DataFrame {
    let mut state = seed;
    let mut x1 = Vec::with_capacity(n_rows);
    let mut x2 = Vec::with_capacity(n_rows);
    let mut z = Vec::with_capacity(n_rows);
    let mut y = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let a = 5.0 * next_rand(&mut state);
        let b = 3.0 * next_rand(&mut state);
        let c = next_rand(&mut state);
        x1.push(a);
        x2.push(b);
        z.push(c);
        y.push(2.0 + 3.0 * a - 1.5 * b + noise_std * next_rand(&mut state));
    }

    DataFrame::new(
        vec!["y".into(), "x1".into(), "x2".into(), "z".into()],
        vec![y, x1, x2, z],
    )
    .unwrap()
}

/// Air-quality style frame: log(ozone) = -0.262 + 0.003*solar - 0.062*wind
/// + 0.049*temp + noise, with predictor ranges matching the real data.
pub fn ozone_frame(n_rows: usize, noise_std: f64, seed: u64) -> DataFrame {
    let mut state = seed;
    let mut solar = Vec::with_capacity(n_rows);
    let mut wind = Vec::with_capacity(n_rows);
    let mut temp = Vec::with_capacity(n_rows);
    let mut ozone = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let s = 170.0 + 160.0 * next_rand(&mut state);
        let w = 10.0 + 8.0 * next_rand(&mut state);
        let t = 78.0 + 20.0 * next_rand(&mut state);
        let log_y = -0.262 + 0.003 * s - 0.062 * w + 0.049 * t
            + noise_std * next_rand(&mut state);
        solar.push(s);
        wind.push(w);
        temp.push(t);
        ozone.push(log_y.exp());
    }

    DataFrame::new(
        vec![
            "ozone".into(),
            "solar".into(),
            "wind".into(),
            "temp".into(),
        ],
        vec![ozone, solar, wind, temp],
    )
    .unwrap()
}

/// Frame where y depends on x1, x2 and their product but not on z.
pub fn interaction_frame(n_rows: usize, noise_std: f64, seed: u64) -> DataFrame {
    let mut state = seed;
    let mut x1 = Vec::with_capacity(n_rows);
    let mut x2 = Vec::with_capacity(n_rows);
    let mut z = Vec::with_capacity(n_rows);
    let mut y = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let a = 2.0 * next_rand(&mut state);
        let b = 2.0 * next_rand(&mut state);
        let c = next_rand(&mut state);
        x1.push(a);
        x2.push(b);
        z.push(c);
        y.push(1.0 + 2.0 * a - b + 1.5 * a * b + noise_std * next_rand(&mut state));
    }

    DataFrame::new(
        vec!["y".into(), "x1".into(), "x2".into(), "z".into()],
        vec![y, x1, x2, z],
    )
    .unwrap()
}
