//! Shared utilities.

mod matrix;

pub use matrix::{center_columns, center_vector, detect_constant_columns};
