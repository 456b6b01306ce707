//! Adaptive Monte Carlo estimator for basket calls.
//!
//! Construction runs the pilot [`Calibration`]; each estimation then draws
//! the calibrated number of fresh simulations, one simulation serving every
//! strike, and rounds each price to the nearest multiple of the precision.
//!
//! Prices are the undiscounted expectation `E[(aᵀ·S_T - K)⁺]`.
//!
//! # Architecture
//!
//! ```text
//! MonteCarloEstimator
//! ├── EstimatorConfig       (precision, strikes, weights, batching)
//! ├── Calibration           (pilot variance, sample counts)
//! └── BasketPriceSimulator
//!     ├── BasketModel       (exact GBM terminal solution)
//!     └── CorrelatedSampler (Cholesky factor of T·ρ, PricerRng)
//! ```

use std::fmt;

use pricer_models::models::{BasketModel, CorrelationMatrix};
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::calibration::Calibration;
use super::cancel::CancellationToken;
use super::config::EstimatorConfig;
use super::error::{ConfigError, EstimatorError};
use super::payoff::{basket_index, quantise, PayoffAccumulator};
use super::sampler::CorrelatedSampler;
use super::simulator::BasketPriceSimulator;
use crate::rng::PricerRng;

/// Estimator variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EstimationMode {
    /// Independent simulations.
    Plain,
    /// Antithetic pairs `(W, -W)`.
    Antithetic,
}

impl fmt::Display for EstimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Antithetic => write!(f, "antithetic"),
        }
    }
}

/// Estimated price for one strike.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StrikeEstimate {
    /// Strike `K`.
    pub strike: f64,
    /// Price rounded to the nearest multiple of the precision.
    pub price: f64,
    /// Standard error of the unrounded mean.
    pub std_error: f64,
}

/// Prices of one estimation run, in configured strike order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EstimationResult {
    /// Estimator variant used.
    pub mode: EstimationMode,
    /// Precision `ε` the prices are rounded to.
    pub precision: f64,
    /// Simulations (plain) or pairs (antithetic) drawn.
    pub sample_count: usize,
    /// One entry per strike.
    pub estimates: Vec<StrikeEstimate>,
}

impl EstimationResult {
    /// Rounded prices in strike order.
    pub fn prices(&self) -> Vec<f64> {
        self.estimates.iter().map(|e| e.price).collect()
    }

    /// Rounded price of the first estimate with the given strike.
    pub fn price_for(&self, strike: f64) -> Option<f64> {
        self.estimates
            .iter()
            .find(|e| e.strike == strike)
            .map(|e| e.price)
    }
}

/// Monte Carlo estimator with pilot-calibrated sample size.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::{BasketModel, CorrelationMatrix};
/// use pricer_pricing::mc::{
///     BasketPriceSimulator, CorrelatedSampler, EstimatorConfig, MonteCarloEstimator,
/// };
/// use pricer_pricing::rng::PricerRng;
///
/// let rho = CorrelationMatrix::new(&[1.0, 0.5, 0.5, 1.0], 2).unwrap();
/// let sampler = CorrelatedSampler::new(&rho, 1.0, PricerRng::from_seed(42)).unwrap();
/// let model = BasketModel::new(vec![100.0, 100.0], vec![0.2, 0.3], 0.05, 1.0).unwrap();
/// let simulator = BasketPriceSimulator::new(model, sampler).unwrap();
///
/// let config = EstimatorConfig::builder()
///     .precision(1.0)
///     .strikes(vec![90.0, 100.0, 110.0])
///     .weights(vec![0.5, 0.5])
///     .pilot_samples(2_000)
///     .build()
///     .unwrap();
///
/// let mut estimator = MonteCarloEstimator::new(config, simulator).unwrap();
/// assert!(estimator.antithetic_sample_count() <= estimator.plain_sample_count());
///
/// let result = estimator.price_antithetic().unwrap();
/// assert_eq!(result.estimates.len(), 3);
/// ```
#[derive(Debug)]
pub struct MonteCarloEstimator {
    config: EstimatorConfig,
    simulator: BasketPriceSimulator,
    calibration: Calibration,
}

impl MonteCarloEstimator {
    /// Validates the weights against the basket and runs the pilot.
    ///
    /// # Errors
    ///
    /// `EstimatorError::Configuration` if the weight vector length differs
    /// from the basket dimension. Nothing is simulated in that case.
    pub fn new(
        config: EstimatorConfig,
        mut simulator: BasketPriceSimulator,
    ) -> Result<Self, EstimatorError> {
        config.check_dimension(simulator.dimension())?;
        let calibration = Calibration::run(&mut simulator, &config);
        Ok(Self {
            config,
            simulator,
            calibration,
        })
    }

    /// Assembles sampler, simulator and estimator from market inputs.
    ///
    /// Dimensions are checked before the correlation is factorised, and the
    /// factorisation happens before any draw.
    ///
    /// # Errors
    ///
    /// - `EstimatorError::Configuration` on a weight or correlation
    ///   dimension mismatch
    /// - `EstimatorError::Factorization` if `horizon·correlation` cannot be
    ///   factorised
    pub fn from_market(
        config: EstimatorConfig,
        model: BasketModel,
        correlation: &CorrelationMatrix<f64>,
        rng: PricerRng,
    ) -> Result<Self, EstimatorError> {
        config.check_dimension(model.dimension())?;
        if correlation.dim() != model.dimension() {
            return Err(ConfigError::DimensionMismatch {
                name: "correlation",
                expected: model.dimension(),
                got: correlation.dim(),
            }
            .into());
        }
        let sampler = CorrelatedSampler::new(correlation, model.horizon(), rng)?;
        let simulator = BasketPriceSimulator::new(model, sampler)?;
        Self::new(config, simulator)
    }

    /// Calibrated number of plain simulations.
    #[inline]
    pub fn plain_sample_count(&self) -> usize {
        self.calibration.plain_samples()
    }

    /// Calibrated number of antithetic pairs.
    #[inline]
    pub fn antithetic_sample_count(&self) -> usize {
        self.calibration.antithetic_samples()
    }

    /// Result of the pilot run.
    #[inline]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Estimator configuration.
    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Target precision `ε`.
    #[inline]
    pub fn precision(&self) -> f64 {
        self.config.precision()
    }

    /// Configured strikes.
    #[inline]
    pub fn strikes(&self) -> &[f64] {
        self.config.strikes()
    }

    /// Underlying simulator.
    #[inline]
    pub fn simulator(&self) -> &BasketPriceSimulator {
        &self.simulator
    }

    /// Plain estimate of every strike.
    pub fn price_plain(&mut self) -> Result<EstimationResult, EstimatorError> {
        self.estimate(EstimationMode::Plain, None)
    }

    /// Plain estimate, polling `cancel` between batches.
    pub fn price_plain_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<EstimationResult, EstimatorError> {
        self.estimate(EstimationMode::Plain, Some(cancel))
    }

    /// Antithetic estimate of every strike.
    pub fn price_antithetic(&mut self) -> Result<EstimationResult, EstimatorError> {
        self.estimate(EstimationMode::Antithetic, None)
    }

    /// Antithetic estimate, polling `cancel` between batches.
    pub fn price_antithetic_with_cancel(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<EstimationResult, EstimatorError> {
        self.estimate(EstimationMode::Antithetic, Some(cancel))
    }

    /// Runs one estimation in the given mode.
    ///
    /// Simulations are drawn in batches of `config.batch_size()`; each batch
    /// is accumulated separately and merged into the running total.
    ///
    /// # Errors
    ///
    /// `EstimatorError::Cancelled` if `cancel` is triggered before the last
    /// batch starts. Partial sums are discarded.
    pub fn estimate(
        &mut self,
        mode: EstimationMode,
        cancel: Option<&CancellationToken>,
    ) -> Result<EstimationResult, EstimatorError> {
        let requested = match mode {
            EstimationMode::Plain => self.calibration.plain_samples(),
            EstimationMode::Antithetic => self.calibration.antithetic_samples(),
        };
        let strikes = self.config.strikes();
        let weights = self.config.weights();
        let batch_size = self.config.batch_size();
        let d = self.simulator.dimension();

        let mut up = vec![0.0; d];
        let mut down = vec![0.0; d];
        let mut total = PayoffAccumulator::new(strikes.len());

        while total.count() < requested {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                warn!(%mode, completed = total.count(), requested, "Estimation cancelled");
                return Err(EstimatorError::Cancelled {
                    completed: total.count(),
                    requested,
                });
            }

            let len = batch_size.min(requested - total.count());
            let mut batch = PayoffAccumulator::new(strikes.len());
            match mode {
                EstimationMode::Plain => {
                    for _ in 0..len {
                        self.simulator.simulate_into(&mut up);
                        batch.add_index(basket_index(weights, &up), strikes);
                    }
                }
                EstimationMode::Antithetic => {
                    for _ in 0..len {
                        self.simulator.simulate_antithetic_pair_into(&mut up, &mut down);
                        batch.add_antithetic_pair(
                            basket_index(weights, &up),
                            basket_index(weights, &down),
                            strikes,
                        );
                    }
                }
            }
            total.merge(&batch);
            debug!(%mode, completed = total.count(), requested, "Batch merged");
        }

        let precision = self.config.precision();
        let estimates = strikes
            .iter()
            .enumerate()
            .map(|(j, &strike)| StrikeEstimate {
                strike,
                price: quantise(total.mean(j), precision),
                std_error: total.std_error(j),
            })
            .collect();

        info!(%mode, samples = requested, "Estimation finished");
        Ok(EstimationResult {
            mode,
            precision,
            sample_count: requested,
            estimates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pricer_models::models::CorrelationError;

    fn simulator(vols: [f64; 2], seed: u64) -> BasketPriceSimulator {
        let rho = CorrelationMatrix::new(&[1.0, 0.5, 0.5, 1.0], 2).unwrap();
        let sampler = CorrelatedSampler::new(&rho, 1.0, PricerRng::from_seed(seed)).unwrap();
        let model = BasketModel::new(vec![100.0, 100.0], vols.to_vec(), 0.05, 1.0).unwrap();
        BasketPriceSimulator::new(model, sampler).unwrap()
    }

    fn config(precision: f64) -> EstimatorConfig {
        EstimatorConfig::builder()
            .precision(precision)
            .strikes(vec![90.0, 100.0, 110.0])
            .weights(vec![0.5, 0.5])
            .pilot_samples(2_000)
            .batch_size(512)
            .build()
            .unwrap()
    }

    #[test]
    fn test_weight_dimension_mismatch() {
        let config = EstimatorConfig::builder()
            .precision(0.5)
            .strikes(vec![100.0])
            .weights(vec![1.0, 0.0, 0.0])
            .build()
            .unwrap();
        let result = MonteCarloEstimator::new(config, simulator([0.2, 0.3], 1));
        assert!(matches!(
            result,
            Err(EstimatorError::Configuration(ConfigError::DimensionMismatch {
                name: "weights",
                expected: 2,
                got: 3
            }))
        ));
    }

    #[test]
    fn test_deterministic_basket() {
        // Zero volatility: index is the forward, variance zero, one sample
        let mut estimator =
            MonteCarloEstimator::new(config(0.01), simulator([0.0, 0.0], 3)).unwrap();
        assert_eq!(estimator.plain_sample_count(), 1);
        assert_eq!(estimator.antithetic_sample_count(), 1);

        let forward = 100.0 * 0.05_f64.exp();
        let plain = estimator.price_plain().unwrap();
        let anti = estimator.price_antithetic().unwrap();
        for (j, &k) in [90.0, 100.0, 110.0].iter().enumerate() {
            let expected = quantise((forward - k).max(0.0), 0.01);
            assert_relative_eq!(plain.estimates[j].price, expected, epsilon = 1e-12);
            assert_relative_eq!(anti.estimates[j].price, expected, epsilon = 1e-12);
            assert_eq!(plain.estimates[j].std_error, 0.0);
        }
    }

    #[test]
    fn test_result_shape() {
        let mut estimator = MonteCarloEstimator::new(config(1.0), simulator([0.2, 0.3], 5)).unwrap();
        let result = estimator.price_plain().unwrap();
        assert_eq!(result.mode, EstimationMode::Plain);
        assert_eq!(result.precision, 1.0);
        assert_eq!(result.sample_count, estimator.plain_sample_count());
        assert_eq!(
            result.estimates.iter().map(|e| e.strike).collect::<Vec<_>>(),
            vec![90.0, 100.0, 110.0]
        );
        assert_eq!(result.prices().len(), 3);
        assert_eq!(result.price_for(100.0), Some(result.estimates[1].price));
        assert_eq!(result.price_for(95.0), None);

        // Call prices decrease with strike
        let p = result.prices();
        assert!(p[0] >= p[1] && p[1] >= p[2]);
        for e in &result.estimates {
            let steps = e.price / result.precision;
            assert!((steps - steps.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_accessors() {
        let estimator = MonteCarloEstimator::new(config(0.5), simulator([0.2, 0.3], 9)).unwrap();
        assert_eq!(estimator.precision(), 0.5);
        assert_eq!(estimator.strikes(), &[90.0, 100.0, 110.0]);
        assert_eq!(estimator.config().pilot_samples(), 2_000);
        assert_eq!(estimator.calibration().pilot_samples(), 2_000);
        assert_eq!(estimator.simulator().dimension(), 2);
        assert!(estimator.calibration().pilot_variance() > 0.0);
        assert_eq!(
            estimator.plain_sample_count(),
            estimator.calibration().plain_samples()
        );
    }

    #[test]
    fn test_pre_cancelled_token() {
        let mut estimator = MonteCarloEstimator::new(config(0.5), simulator([0.2, 0.3], 11)).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let plain = estimator.price_plain_with_cancel(&token);
        assert_eq!(
            plain,
            Err(EstimatorError::Cancelled {
                completed: 0,
                requested: estimator.plain_sample_count()
            })
        );
        let anti = estimator.price_antithetic_with_cancel(&token);
        assert!(matches!(
            anti,
            Err(EstimatorError::Cancelled { completed: 0, .. })
        ));
    }

    #[test]
    fn test_live_token_completes() {
        let mut estimator = MonteCarloEstimator::new(config(1.0), simulator([0.2, 0.3], 13)).unwrap();
        let token = CancellationToken::new();
        let result = estimator.price_antithetic_with_cancel(&token).unwrap();
        assert_eq!(result.mode, EstimationMode::Antithetic);
        assert_eq!(result.sample_count, estimator.antithetic_sample_count());
    }

    #[test]
    fn test_same_seed_same_prices() {
        let mut a = MonteCarloEstimator::new(config(0.5), simulator([0.2, 0.3], 21)).unwrap();
        let mut b = MonteCarloEstimator::new(config(0.5), simulator([0.2, 0.3], 21)).unwrap();
        assert_eq!(a.calibration(), b.calibration());
        assert_eq!(a.price_plain().unwrap(), b.price_plain().unwrap());
        assert_eq!(a.price_antithetic().unwrap(), b.price_antithetic().unwrap());
    }

    #[test]
    fn test_batch_size_does_not_change_prices() {
        // Batching only regroups the same draw sequence
        let big = EstimatorConfig::builder()
            .precision(1.0)
            .strikes(vec![100.0])
            .weights(vec![0.5, 0.5])
            .pilot_samples(2_000)
            .batch_size(1_000_000)
            .build()
            .unwrap();
        let small = EstimatorConfig::builder()
            .precision(1.0)
            .strikes(vec![100.0])
            .weights(vec![0.5, 0.5])
            .pilot_samples(2_000)
            .batch_size(7)
            .build()
            .unwrap();
        let mut a = MonteCarloEstimator::new(big, simulator([0.2, 0.3], 31)).unwrap();
        let mut b = MonteCarloEstimator::new(small, simulator([0.2, 0.3], 31)).unwrap();
        let ra = a.price_plain().unwrap();
        let rb = b.price_plain().unwrap();
        assert_eq!(ra.sample_count, rb.sample_count);
        assert_relative_eq!(
            ra.estimates[0].std_error,
            rb.estimates[0].std_error,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_from_market_errors() {
        let model = BasketModel::new(vec![100.0, 100.0], vec![0.2, 0.3], 0.05, 1.0).unwrap();
        let rho3 = CorrelationMatrix::<f64>::identity(3);
        assert!(matches!(
            MonteCarloEstimator::from_market(config(0.5), model.clone(), &rho3, PricerRng::from_seed(1)),
            Err(EstimatorError::Configuration(ConfigError::DimensionMismatch {
                name: "correlation",
                ..
            }))
        ));

        let one = CorrelationMatrix::new(&[1.0, 1.0, 1.0, 1.0], 2).unwrap();
        assert!(
            MonteCarloEstimator::from_market(config(0.5), model, &one, PricerRng::from_seed(1))
                .is_ok()
        );
    }

    #[test]
    fn test_from_market_non_psd() {
        let model =
            BasketModel::new(vec![100.0; 3], vec![0.2; 3], 0.05, 1.0).unwrap();
        let rho = CorrelationMatrix::new(
            &[1.0, 0.9, -0.9, 0.9, 1.0, 0.9, -0.9, 0.9, 1.0],
            3,
        )
        .unwrap();
        let config = EstimatorConfig::builder()
            .precision(0.5)
            .strikes(vec![100.0])
            .weights(vec![1.0 / 3.0; 3])
            .build()
            .unwrap();
        assert!(matches!(
            MonteCarloEstimator::from_market(config, model, &rho, PricerRng::from_seed(1)),
            Err(EstimatorError::Factorization(
                CorrelationError::NotPositiveSemiDefinite { .. }
            ))
        ));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(EstimationMode::Plain.to_string(), "plain");
        assert_eq!(EstimationMode::Antithetic.to_string(), "antithetic");
    }
}
