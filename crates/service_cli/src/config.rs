//! CLI configuration management
//!
//! Handles loading configuration from a TOML file, `BASKET_*` environment
//! variables and command line arguments.

use pricer_pricing::mc::{ConfigError as EstimatorConfigError, EstimatorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Config file read when `--config` is not given. Missing means defaults.
pub const DEFAULT_CONFIG_FILE: &str = "basket.toml";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels supported by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

/// Market parameters shared by every underlying
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    /// Horizon `T` in years
    pub horizon: f64,
    /// Risk-free rate
    pub rate: f64,
    /// Expected basket dimension; inferred from the data when absent
    pub dimension: Option<usize>,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            horizon: 1.0,
            rate: 0.1,
            dimension: None,
        }
    }
}

/// Location of the market data files
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory holding the data files
    pub dir: PathBuf,
    /// Correlation matrix file name
    pub correlation: String,
    /// Basket weights file name
    pub weights: String,
    /// Initial spots file name
    pub spot: String,
    /// Volatilities file name
    pub sigma: String,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            correlation: "data_correlation.txt".to_string(),
            weights: "data_weights.txt".to_string(),
            spot: "data_spot.txt".to_string(),
            sigma: "data_sigma.txt".to_string(),
        }
    }
}

impl DataSection {
    /// Full path of the correlation file
    pub fn correlation_path(&self) -> PathBuf {
        self.dir.join(&self.correlation)
    }

    /// Full path of the weights file
    pub fn weights_path(&self) -> PathBuf {
        self.dir.join(&self.weights)
    }

    /// Full path of the spots file
    pub fn spot_path(&self) -> PathBuf {
        self.dir.join(&self.spot)
    }

    /// Full path of the volatilities file
    pub fn sigma_path(&self) -> PathBuf {
        self.dir.join(&self.sigma)
    }
}

/// Estimator settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EstimatorSection {
    /// Target precision `ε`
    pub precision: f64,
    /// Strikes to price
    pub strikes: Vec<f64>,
    /// Pilot size `N0`
    pub pilot_samples: usize,
    /// Simulations between cancellation checks
    pub batch_size: usize,
    /// Optional cap on the calibrated sample counts
    pub max_samples: Option<usize>,
    /// Fixed RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for EstimatorSection {
    fn default() -> Self {
        Self {
            precision: 0.1,
            strikes: vec![80.0, 90.0, 100.0, 110.0, 120.0],
            pilot_samples: pricer_pricing::mc::config::DEFAULT_PILOT_SAMPLES,
            batch_size: pricer_pricing::mc::config::DEFAULT_BATCH_SIZE,
            max_samples: None,
            seed: None,
        }
    }
}

/// CLI configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Market parameters
    pub market: MarketSection,
    /// Data file locations
    pub data: DataSection,
    /// Estimator settings
    pub estimator: EstimatorSection,
}

impl CliConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CliConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `BASKET_*` variables returned by `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("BASKET_LOG_LEVEL") {
            self.log_level = LogLevel::from_str(&level)?;
        }
        if let Some(dir) = lookup("BASKET_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("BASKET_HORIZON") {
            self.market.horizon = parse_env("BASKET_HORIZON", &value)?;
        }
        if let Some(value) = lookup("BASKET_RATE") {
            self.market.rate = parse_env("BASKET_RATE", &value)?;
        }
        if let Some(value) = lookup("BASKET_PRECISION") {
            self.estimator.precision = parse_env("BASKET_PRECISION", &value)?;
        }
        // Comma-separated
        if let Some(value) = lookup("BASKET_STRIKES") {
            self.estimator.strikes = value
                .split(',')
                .map(|s| parse_env::<f64>("BASKET_STRIKES", s.trim()))
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(value) = lookup("BASKET_MAX_SAMPLES") {
            self.estimator.max_samples = Some(parse_env("BASKET_MAX_SAMPLES", &value)?);
        }
        if let Some(value) = lookup("BASKET_SEED") {
            self.estimator.seed = Some(parse_env("BASKET_SEED", &value)?);
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.estimator.strikes.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "estimator.strikes",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.estimator.precision.is_finite() || self.estimator.precision <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "estimator.precision",
                reason: format!("{} is not positive", self.estimator.precision),
            });
        }
        if self.market.dimension == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "market.dimension",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(dir) = &cli.data_dir {
            self.data.dir = dir.clone();
        }
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        if let Some(precision) = cli.precision {
            self.estimator.precision = precision;
        }
        if let Some(seed) = cli.seed {
            self.estimator.seed = Some(seed);
        }
        if let Some(max_samples) = cli.max_samples {
            self.estimator.max_samples = Some(max_samples);
        }
        Ok(())
    }

    /// Estimator configuration for the given basket weights
    pub fn estimator_config(
        &self,
        weights: Vec<f64>,
    ) -> Result<EstimatorConfig, EstimatorConfigError> {
        let builder = EstimatorConfig::builder()
            .precision(self.estimator.precision)
            .strikes(self.estimator.strikes.clone())
            .weights(weights)
            .pilot_samples(self.estimator.pilot_samples)
            .batch_size(self.estimator.batch_size);
        match self.estimator.max_samples {
            Some(max) => builder.max_samples(max).build(),
            None => builder.build(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{}: cannot parse '{}'", name, value)))
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Data directory override
    pub data_dir: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Precision override
    pub precision: Option<f64>,
    /// Seed override
    pub seed: Option<u64>,
    /// Sample cap override
    pub max_samples: Option<usize>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<CliConfig, ConfigError> {
    build_config_with_env(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with_env<F>(cli: &CliArgs, lookup: F) -> Result<CliConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => CliConfig::from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                CliConfig::from_file(default_path)?
            } else {
                CliConfig::default()
            }
        }
    };

    config.apply_env_with(lookup)?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}
