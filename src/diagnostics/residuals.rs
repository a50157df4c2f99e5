//! Standardized residuals.

use faer::Col;

/// Compute standardized residuals: e_i / s, where s = sqrt(MSE).
pub fn standardized_residuals(residuals: &Col<f64>, mse: f64) -> Col<f64> {
    if mse <= 0.0 || !mse.is_finite() {
        return Col::from_fn(residuals.nrows(), |i| {
            if residuals[i].abs() < 1e-14 {
                0.0
            } else {
                f64::NAN
            }
        });
    }

    let s = mse.sqrt();
    Col::from_fn(residuals.nrows(), |i| residuals[i] / s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residuals_are_scaled_by_sigma() {
        let residuals = Col::from_fn(10, |i| i as f64 - 4.5);
        let mse = 4.0;

        let standardized = standardized_residuals(&residuals, mse);
        for i in 0..10 {
            assert!((standardized[i] - residuals[i] / 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn degenerate_mse_gives_zeros_for_exact_fit() {
        let residuals = Col::from_fn(3, |_| 0.0);
        let standardized = standardized_residuals(&residuals, 0.0);
        for i in 0..3 {
            assert_eq!(standardized[i], 0.0);
        }
    }
}
