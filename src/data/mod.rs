//! Tabular data ingestion.

mod frame;

pub use frame::{DataError, DataFrame};
