//! Market data file loading.
//!
//! Files are plain ASCII. Vectors hold whitespace-separated numbers in any
//! layout; matrices hold one row per line.

use pricer_models::models::{CorrelationError, CorrelationMatrix};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::DataSection;

/// Data loading error
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contains no numbers
    #[error("{}: file contains no data", path.display())]
    Empty { path: PathBuf },

    /// Token is not a number
    #[error("{}:{line}: cannot parse '{token}' as a number", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },

    /// Matrix row length differs from the first row
    #[error("{}:{line}: row has {got} values, expected {expected}", path.display())]
    RaggedRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        got: usize,
    },

    /// Matrix is not square
    #[error("{}: matrix is {rows}x{cols}, expected a square matrix", path.display())]
    NotSquare {
        path: PathBuf,
        rows: usize,
        cols: usize,
    },

    /// File length disagrees with the basket dimension
    #[error("{}: expected {expected} values, got {got}", path.display())]
    DimensionMismatch {
        path: PathBuf,
        expected: usize,
        got: usize,
    },
}

impl LoaderError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parses a whitespace-separated vector of numbers.
pub fn parse_vector(content: &str, path: &Path) -> Result<Vec<f64>, LoaderError> {
    let mut values = Vec::new();
    for (index, line) in content.lines().enumerate() {
        for token in line.split_whitespace() {
            values.push(parse_token(token, path, index + 1)?);
        }
    }
    if values.is_empty() {
        return Err(LoaderError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(values)
}

/// Parses a matrix with one row per non-blank line.
pub fn parse_matrix(content: &str, path: &Path) -> Result<Vec<Vec<f64>>, LoaderError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let row = line
            .split_whitespace()
            .map(|token| parse_token(token, path, line_no))
            .collect::<Result<Vec<_>, _>>()?;
        if row.is_empty() {
            continue;
        }
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(LoaderError::RaggedRow {
                    path: path.to_path_buf(),
                    line: line_no,
                    expected: first.len(),
                    got: row.len(),
                });
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(LoaderError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(rows)
}

fn parse_token(token: &str, path: &Path, line: usize) -> Result<f64, LoaderError> {
    token.parse().map_err(|_| LoaderError::Parse {
        path: path.to_path_buf(),
        line,
        token: token.to_string(),
    })
}

/// Loads a vector file.
pub fn load_vector(path: &Path) -> Result<Vec<f64>, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoaderError::io(path, e))?;
    parse_vector(&content, path)
}

/// Loads a matrix file.
pub fn load_matrix(path: &Path) -> Result<Vec<Vec<f64>>, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoaderError::io(path, e))?;
    parse_matrix(&content, path)
}

/// Correlation, weights, spots and volatilities of one basket.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataSet {
    /// Correlation matrix rows
    pub correlation: Vec<Vec<f64>>,
    /// Basket weights
    pub weights: Vec<f64>,
    /// Initial spots
    pub spots: Vec<f64>,
    /// Volatilities
    pub sigmas: Vec<f64>,
}

impl MarketDataSet {
    /// Loads the four data files and checks their shapes agree.
    ///
    /// The dimension is taken from `expected_dim` when given, otherwise
    /// from the correlation matrix.
    pub fn load(data: &DataSection, expected_dim: Option<usize>) -> Result<Self, LoaderError> {
        let correlation_path = data.correlation_path();
        let correlation = load_matrix(&correlation_path)?;
        let rows = correlation.len();
        let cols = correlation[0].len();
        if rows != cols {
            return Err(LoaderError::NotSquare {
                path: correlation_path,
                rows,
                cols,
            });
        }
        let dimension = expected_dim.unwrap_or(rows);
        check_len(&correlation_path, dimension, rows)?;

        let weights_path = data.weights_path();
        let weights = load_vector(&weights_path)?;
        check_len(&weights_path, dimension, weights.len())?;

        let spot_path = data.spot_path();
        let spots = load_vector(&spot_path)?;
        check_len(&spot_path, dimension, spots.len())?;

        let sigma_path = data.sigma_path();
        let sigmas = load_vector(&sigma_path)?;
        check_len(&sigma_path, dimension, sigmas.len())?;

        debug!(dimension, dir = %data.dir.display(), "Loaded market data");

        Ok(Self {
            correlation,
            weights,
            spots,
            sigmas,
        })
    }

    /// Basket dimension `d`.
    pub fn dimension(&self) -> usize {
        self.spots.len()
    }

    /// Validated correlation matrix.
    pub fn correlation_matrix(&self) -> Result<CorrelationMatrix<f64>, CorrelationError> {
        CorrelationMatrix::from_rows(&self.correlation)
    }
}

fn check_len(path: &Path, expected: usize, got: usize) -> Result<(), LoaderError> {
    if expected != got {
        return Err(LoaderError::DimensionMismatch {
            path: path.to_path_buf(),
            expected,
            got,
        });
    }
    Ok(())
}
