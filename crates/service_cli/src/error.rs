//! Error types for the basket-mc command line.

use pricer_models::models::{CorrelationError, ModelError};
use pricer_pricing::mc::EstimatorError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::loader::LoaderError;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Data loading error
    #[error("Data loading error: {0}")]
    Loader(#[from] LoaderError),

    /// Invalid market model parameters
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Invalid correlation matrix
    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    /// Estimation failure
    #[error("Estimation error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Report serialisation error
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
