//! Design matrix construction from a frame and a term set.

use crate::data::{DataError, DataFrame};
use crate::formula::{Term, TermSet};
use faer::Mat;

/// Build the design matrix for `terms` over `frame`, one column per term.
///
/// Main effects copy their column; interactions are the row-wise product of
/// their factors' columns. Returns the matrix and the term labels in column
/// order. An empty term set yields an `n x 0` matrix (intercept-only model).
pub fn build_design(
    frame: &DataFrame,
    terms: &TermSet,
) -> Result<(Mat<f64>, Vec<String>), DataError> {
    let n = frame.n_rows();
    let mut columns: Vec<Vec<f64>> = Vec::with_capacity(terms.len());

    for term in terms {
        let column = match term {
            Term::Main(name) => frame.column(name)?.to_vec(),
            Term::Interaction(factors) => {
                let mut product = vec![1.0; n];
                for factor in factors {
                    let values = frame.column(factor)?;
                    for (p, &v) in product.iter_mut().zip(values.iter()) {
                        *p *= v;
                    }
                }
                product
            }
        };
        columns.push(column);
    }

    let x = Mat::from_fn(n, columns.len(), |i, j| columns[j][i]);
    Ok((x, terms.labels()))
}
