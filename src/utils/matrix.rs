//! Matrix helpers shared by the solvers.

use faer::{Col, Mat};

/// Flag columns with (numerically) zero variance.
pub fn detect_constant_columns(x: &Mat<f64>, tolerance: f64) -> Vec<bool> {
    let n_rows = x.nrows();

    if n_rows == 0 {
        return vec![true; x.ncols()];
    }

    (0..x.ncols())
        .map(|j| {
            let first = x[(0, j)];
            (1..n_rows).all(|i| (x[(i, j)] - first).abs() < tolerance)
        })
        .collect()
}

/// Subtract column means; returns the centered matrix and the means.
pub fn center_columns(x: &Mat<f64>) -> (Mat<f64>, Col<f64>) {
    let n_rows = x.nrows();
    let n_cols = x.ncols();

    let mut means = Col::zeros(n_cols);
    for j in 0..n_cols {
        let sum: f64 = (0..n_rows).map(|i| x[(i, j)]).sum();
        means[j] = sum / n_rows as f64;
    }

    let centered = Mat::from_fn(n_rows, n_cols, |i, j| x[(i, j)] - means[j]);

    (centered, means)
}

/// Subtract the mean; returns the centered vector and the mean.
pub fn center_vector(y: &Col<f64>) -> (Col<f64>, f64) {
    let n = y.nrows();
    let mean = y.iter().sum::<f64>() / n as f64;

    (Col::from_fn(n, |i| y[i] - mean), mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_columns_are_flagged() {
        let mut x = Mat::zeros(5, 3);
        for i in 0..5 {
            x[(i, 0)] = 1.0;
            x[(i, 1)] = i as f64;
            x[(i, 2)] = -3.5;
        }

        let constant = detect_constant_columns(&x, 1e-10);
        assert_eq!(constant, vec![true, false, true]);
    }

    #[test]
    fn constant_column_tolerance_is_respected() {
        let mut x = Mat::zeros(3, 1);
        x[(0, 0)] = 1.0;
        x[(1, 0)] = 1.000001;
        x[(2, 0)] = 1.0;

        assert!(!detect_constant_columns(&x, 1e-10)[0]);
        assert!(detect_constant_columns(&x, 1e-5)[0]);
    }

    #[test]
    fn centered_columns_sum_to_zero() {
        let x = Mat::from_fn(4, 2, |i, j| ((i + 1) * (j + 1) * 10) as f64);
        let (centered, means) = center_columns(&x);

        assert!((means[0] - 25.0).abs() < 1e-10);
        assert!((means[1] - 50.0).abs() < 1e-10);
        for j in 0..2 {
            let sum: f64 = (0..4).map(|i| centered[(i, j)]).sum();
            assert!(sum.abs() < 1e-10);
        }
    }

    #[test]
    fn centered_vector_sums_to_zero() {
        let y = Col::from_fn(4, |i| (i + 1) as f64);
        let (centered, mean) = center_vector(&y);

        assert!((mean - 2.5).abs() < 1e-10);
        assert!(centered.iter().sum::<f64>().abs() < 1e-10);
    }
}
