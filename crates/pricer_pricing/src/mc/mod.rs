//! Monte Carlo pricing of European calls on a weighted basket.
//!
//! Components, leaves first:
//!
//! - [`CorrelatedSampler`]: Gaussian vectors with covariance `T·ρ`
//! - [`BasketPriceSimulator`]: terminal prices under correlated GBMs
//! - [`Calibration`]: pilot-run variance and sample counts
//! - [`MonteCarloEstimator`]: plain and antithetic estimators
//!
//! # Examples
//!
//! ```rust
//! use pricer_models::models::{BasketModel, CorrelationMatrix};
//! use pricer_pricing::mc::{
//!     BasketPriceSimulator, CorrelatedSampler, EstimatorConfig, MonteCarloEstimator,
//! };
//! use pricer_pricing::rng::PricerRng;
//!
//! let rho = CorrelationMatrix::new(&[1.0], 1).unwrap();
//! let sampler = CorrelatedSampler::new(&rho, 1.0, PricerRng::from_seed(42)).unwrap();
//! let model = BasketModel::new(vec![100.0], vec![0.2], 0.05, 1.0).unwrap();
//! let simulator = BasketPriceSimulator::new(model, sampler).unwrap();
//!
//! let config = EstimatorConfig::builder()
//!     .precision(0.5)
//!     .strikes(vec![100.0])
//!     .weights(vec![1.0])
//!     .build()
//!     .unwrap();
//!
//! let mut estimator = MonteCarloEstimator::new(config, simulator).unwrap();
//! let plain = estimator.price_plain().unwrap();
//! let anti = estimator.price_antithetic().unwrap();
//! println!("plain {:?} antithetic {:?}", plain.prices(), anti.prices());
//! ```

pub mod calibration;
pub mod cancel;
pub mod config;
pub mod error;
pub mod estimator;
pub mod payoff;
pub mod sampler;
pub mod simulator;

pub use calibration::{
    required_samples, Calibration, RunningMoments, ANTITHETIC_SAMPLE_FACTOR, PLAIN_SAMPLE_FACTOR,
};
pub use cancel::CancellationToken;
pub use config::{EstimatorConfig, EstimatorConfigBuilder};
pub use error::{ConfigError, EstimatorError};
pub use estimator::{EstimationMode, EstimationResult, MonteCarloEstimator, StrikeEstimate};
pub use payoff::{basket_index, call_payoff, quantise, PayoffAccumulator};
pub use sampler::CorrelatedSampler;
pub use simulator::BasketPriceSimulator;
