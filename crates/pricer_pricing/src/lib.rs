//! # Pricer Pricing (Layer 3: Monte Carlo Engine)
//!
//! Monte Carlo pricing of European calls on a weighted basket of correlated
//! lognormal underlyings, sized to a target precision.
//!
//! ## Modules
//!
//! - [`rng`]: seedable uniform and Gaussian source
//! - [`mc`]: correlated sampling, terminal price simulation, pilot
//!   calibration and the plain and antithetic estimators
//!
//! Market model types come from `pricer_models` (Layer 2).
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_models::models::{BasketModel, CorrelationMatrix};
//! use pricer_pricing::mc::{
//!     BasketPriceSimulator, CorrelatedSampler, EstimatorConfig, MonteCarloEstimator,
//! };
//! use pricer_pricing::rng::PricerRng;
//!
//! let rho = CorrelationMatrix::new(&[1.0, 0.3, 0.3, 1.0], 2).unwrap();
//! let model = BasketModel::new(vec![100.0, 90.0], vec![0.25, 0.2], 0.03, 0.5).unwrap();
//! let sampler = CorrelatedSampler::new(&rho, model.horizon(), PricerRng::from_seed(1)).unwrap();
//! let simulator = BasketPriceSimulator::new(model, sampler).unwrap();
//!
//! let config = EstimatorConfig::builder()
//!     .precision(1.0)
//!     .strikes(vec![95.0])
//!     .weights(vec![0.5, 0.5])
//!     .pilot_samples(1_000)
//!     .build()
//!     .unwrap();
//!
//! let mut estimator = MonteCarloEstimator::new(config, simulator).unwrap();
//! let result = estimator.price_plain().unwrap();
//! assert_eq!(result.estimates.len(), 1);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod mc;
pub mod rng;

pub use mc::{
    BasketPriceSimulator, CancellationToken, CorrelatedSampler, EstimationMode, EstimationResult,
    EstimatorConfig, EstimatorError, MonteCarloEstimator,
};
