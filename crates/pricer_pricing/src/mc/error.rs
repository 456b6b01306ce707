//! Error types for the basket Monte Carlo estimator.
//!
//! Configuration problems are detected eagerly, at
//! [`EstimatorConfigBuilder::build`](super::config::EstimatorConfigBuilder::build)
//! or at estimator construction, before any simulation runs.

use pricer_models::models::{CorrelationError, ModelError};
use thiserror::Error;

/// Configuration error for the Monte Carlo estimator.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Target precision not positive and finite.
    #[error("Invalid precision {0}: must be positive and finite")]
    InvalidPrecision(f64),

    /// No strikes to price.
    #[error("Strike set must not be empty")]
    EmptyStrikes,

    /// Non-finite strike.
    #[error("Invalid strike at index {index}: {value}")]
    InvalidStrike {
        /// Position in the strike list.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// A vector or matrix does not match the basket dimension.
    #[error("Dimension mismatch for '{name}': expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the mismatching input.
        name: &'static str,
        /// Basket dimension.
        expected: usize,
        /// Length received.
        got: usize,
    },

    /// Invalid parameter value with name and description.
    #[error("Invalid parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },

    /// Sample or batch count outside its valid range.
    #[error("Invalid sample count for '{name}': {value}")]
    InvalidSampleCount {
        /// Parameter name.
        name: &'static str,
        /// Offending count.
        value: usize,
    },

    /// Invalid market model parameters.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Failure of a Monte Carlo estimation run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EstimatorError {
    /// Invalid configuration or model parameters.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The correlation matrix could not be factorised.
    #[error("Factorization error: {0}")]
    Factorization(#[from] CorrelationError),

    /// A cancellation token was triggered between batches.
    #[error("Estimation cancelled after {completed} of {requested} samples")]
    Cancelled {
        /// Samples accumulated before the cancellation was observed.
        completed: usize,
        /// Samples the run was sized for.
        requested: usize,
    },
}

impl From<ModelError> for EstimatorError {
    fn from(err: ModelError) -> Self {
        Self::Configuration(ConfigError::Model(err))
    }
}
