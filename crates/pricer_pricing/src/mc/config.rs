//! Estimator configuration.
//!
//! This module provides the immutable [`EstimatorConfig`] and its builder.
//! All validation happens in [`EstimatorConfigBuilder::build`], so an
//! estimator never sees an invalid precision, strike set or weight vector.

use super::error::ConfigError;

/// Default number of pilot simulations used to estimate the index variance.
pub const DEFAULT_PILOT_SAMPLES: usize = 10_000;

/// Default number of simulations between cancellation checks.
pub const DEFAULT_BATCH_SIZE: usize = 4_096;

/// Smallest pilot size with a defined unbiased variance.
pub const MIN_PILOT_SAMPLES: usize = 2;

/// Monte Carlo estimator configuration.
///
/// Use [`EstimatorConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::EstimatorConfig;
///
/// let config = EstimatorConfig::builder()
///     .precision(0.1)
///     .strikes(vec![90.0, 100.0, 110.0])
///     .weights(vec![0.5, 0.5])
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.precision(), 0.1);
/// assert_eq!(config.strikes().len(), 3);
/// assert_eq!(config.pilot_samples(), 10_000);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Target half-width `ε` of the confidence interval.
    precision: f64,
    /// Strikes to price, in caller order.
    strikes: Vec<f64>,
    /// Basket weights `a`.
    weights: Vec<f64>,
    /// Pilot size `N0`.
    pilot_samples: usize,
    /// Simulations per batch.
    batch_size: usize,
    /// Optional upper bound on calibrated sample counts.
    max_samples: Option<usize>,
}

impl EstimatorConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EstimatorConfigBuilder {
        EstimatorConfigBuilder::default()
    }

    /// Returns the target precision `ε`.
    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Returns the strikes.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        &self.strikes
    }

    /// Returns the basket weights.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the pilot size.
    #[inline]
    pub fn pilot_samples(&self) -> usize {
        self.pilot_samples
    }

    /// Returns the batch size between cancellation checks.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the optional sample-count cap.
    #[inline]
    pub fn max_samples(&self) -> Option<usize> {
        self.max_samples
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `precision` is not positive and finite
    /// - `strikes` is empty or contains a non-finite value
    /// - `weights` is empty or contains a non-finite value
    /// - `pilot_samples` is below 2, `batch_size` or `max_samples` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.precision.is_finite() || self.precision <= 0.0 {
            return Err(ConfigError::InvalidPrecision(self.precision));
        }
        if self.strikes.is_empty() {
            return Err(ConfigError::EmptyStrikes);
        }
        if let Some((index, &value)) = self
            .strikes
            .iter()
            .enumerate()
            .find(|(_, k)| !k.is_finite())
        {
            return Err(ConfigError::InvalidStrike { index, value });
        }
        if self.weights.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "weights",
                value: "must not be empty".to_string(),
            });
        }
        if let Some(w) = self.weights.iter().find(|w| !w.is_finite()) {
            return Err(ConfigError::InvalidParameter {
                name: "weights",
                value: format!("non-finite weight {}", w),
            });
        }
        if self.pilot_samples < MIN_PILOT_SAMPLES {
            return Err(ConfigError::InvalidSampleCount {
                name: "pilot_samples",
                value: self.pilot_samples,
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidSampleCount {
                name: "batch_size",
                value: 0,
            });
        }
        if self.max_samples == Some(0) {
            return Err(ConfigError::InvalidSampleCount {
                name: "max_samples",
                value: 0,
            });
        }
        Ok(())
    }

    /// Checks that the weight vector matches a basket of `dimension` assets.
    ///
    /// # Errors
    ///
    /// `ConfigError::DimensionMismatch` if the lengths differ.
    pub fn check_dimension(&self, dimension: usize) -> Result<(), ConfigError> {
        if self.weights.len() != dimension {
            return Err(ConfigError::DimensionMismatch {
                name: "weights",
                expected: dimension,
                got: self.weights.len(),
            });
        }
        Ok(())
    }
}

/// Builder for [`EstimatorConfig`].
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::EstimatorConfig;
///
/// let config = EstimatorConfig::builder()
///     .precision(0.05)
///     .strikes(vec![100.0])
///     .weights(vec![1.0])
///     .pilot_samples(20_000)
///     .batch_size(1_024)
///     .max_samples(5_000_000)
///     .build()
///     .expect("valid config");
/// assert_eq!(config.max_samples(), Some(5_000_000));
/// ```
#[derive(Clone, Debug)]
pub struct EstimatorConfigBuilder {
    precision: Option<f64>,
    strikes: Vec<f64>,
    weights: Option<Vec<f64>>,
    pilot_samples: usize,
    batch_size: usize,
    max_samples: Option<usize>,
}

impl Default for EstimatorConfigBuilder {
    fn default() -> Self {
        Self {
            precision: None,
            strikes: Vec::new(),
            weights: None,
            pilot_samples: DEFAULT_PILOT_SAMPLES,
            batch_size: DEFAULT_BATCH_SIZE,
            max_samples: None,
        }
    }
}

impl EstimatorConfigBuilder {
    /// Sets the target precision `ε`.
    #[inline]
    pub fn precision(mut self, precision: f64) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Sets the strikes to price.
    #[inline]
    pub fn strikes(mut self, strikes: Vec<f64>) -> Self {
        self.strikes = strikes;
        self
    }

    /// Sets the basket weights, used as given.
    #[inline]
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Sets the pilot size (at least 2).
    #[inline]
    pub fn pilot_samples(mut self, pilot_samples: usize) -> Self {
        self.pilot_samples = pilot_samples;
        self
    }

    /// Sets the number of simulations between cancellation checks.
    #[inline]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Caps the calibrated sample counts.
    #[inline]
    pub fn max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the precision or weights are not set, or if
    /// [`EstimatorConfig::validate`] fails.
    pub fn build(self) -> Result<EstimatorConfig, ConfigError> {
        let precision = self.precision.ok_or(ConfigError::InvalidParameter {
            name: "precision",
            value: "must be specified".to_string(),
        })?;

        let weights = self.weights.ok_or(ConfigError::InvalidParameter {
            name: "weights",
            value: "must be specified".to_string(),
        })?;

        let config = EstimatorConfig {
            precision,
            strikes: self.strikes,
            weights,
            pilot_samples: self.pilot_samples,
            batch_size: self.batch_size,
            max_samples: self.max_samples,
        };

        config.validate()?;
        Ok(config)
    }
}
