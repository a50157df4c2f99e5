//! Tabular data: named numeric columns.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;

/// Errors raised while constructing or accessing a [`DataFrame`].
#[derive(Debug, Error)]
pub enum DataError {
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column {name} has {got} rows, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("data frame has no columns")]
    NoColumns,

    #[error("csv input has no header row")]
    MissingHeaders,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// An ordered collection of named columns, all `f64`.
///
/// Missing values are represented as NaN. Categorical CSV columns are one-hot
/// expanded at ingestion so everything downstream works on numeric columns.
#[derive(Debug, Clone)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl DataFrame {
    /// Build a frame from parallel name/column vectors.
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, DataError> {
        if names.is_empty() || columns.is_empty() {
            return Err(DataError::NoColumns);
        }

        let mut seen = BTreeSet::new();
        for name in &names {
            if !seen.insert(name.clone()) {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }

        let n_rows = columns[0].len();
        for (name, col) in names.iter().zip(columns.iter()) {
            if col.len() != n_rows {
                return Err(DataError::LengthMismatch {
                    name: name.clone(),
                    expected: n_rows,
                    got: col.len(),
                });
            }
        }

        Ok(Self {
            names,
            columns,
            n_rows,
        })
    }

    /// Read a frame from a CSV file with a header row.
    ///
    /// Empty cells and the literal `NA` become NaN. A column containing any
    /// other non-numeric cell is treated as categorical and expanded into
    /// indicator columns named `col=level`, dropping the first level (sorted
    /// order) as the reference.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let file = File::open(path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.is_empty() {
            return Err(DataError::MissingHeaders);
        }

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (j, cell) in record.iter().enumerate() {
                if j < cells.len() {
                    cells[j].push(cell.to_string());
                }
            }
        }

        let mut names = Vec::new();
        let mut columns = Vec::new();
        for (name, raw) in headers.into_iter().zip(cells.into_iter()) {
            expand_column(&name, &raw, &mut names, &mut columns);
        }

        Self::new(names, columns)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Borrow a column by name.
    pub fn column(&self, name: &str) -> Result<&[f64], DataError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.columns[j].as_slice())
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell == "NA"
}

/// Append one CSV column to the output, one-hot expanding categoricals.
fn expand_column(
    name: &str,
    raw: &[String],
    names: &mut Vec<String>,
    columns: &mut Vec<Vec<f64>>,
) {
    let numeric = raw
        .iter()
        .all(|cell| is_missing(cell) || cell.parse::<f64>().is_ok());

    if numeric {
        let parsed = raw
            .iter()
            .map(|cell| {
                if is_missing(cell) {
                    f64::NAN
                } else {
                    cell.parse::<f64>().unwrap_or(f64::NAN)
                }
            })
            .collect();
        names.push(name.to_string());
        columns.push(parsed);
        return;
    }

    // Sorted distinct levels; the first is the reference and gets no column.
    let levels: BTreeSet<&str> = raw
        .iter()
        .filter(|cell| !is_missing(cell))
        .map(|cell| cell.as_str())
        .collect();

    for level in levels.iter().skip(1) {
        let indicator = raw
            .iter()
            .map(|cell| {
                if is_missing(cell) {
                    f64::NAN
                } else if cell == level {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        names.push(format!("{name}={level}"));
        columns.push(indicator);
    }
}
