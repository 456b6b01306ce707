//! Terminal prices of the basket under correlated GBMs.
//!
//! Each draw `W` of the [`CorrelatedSampler`] is mapped through the exact
//! lognormal solution of [`BasketModel`]:
//!
//! ```text
//! S_T[i] = s0[i] * exp((r - 0.5 * sigma_i^2) * T + sigma_i * W[i])
//! ```

use pricer_models::models::BasketModel;

use super::error::ConfigError;
use super::sampler::CorrelatedSampler;

/// Tolerance when matching the model horizon against the sampler horizon.
const HORIZON_TOLERANCE: f64 = 1e-12;

/// Simulator of terminal basket prices.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::{BasketModel, CorrelationMatrix};
/// use pricer_pricing::mc::{BasketPriceSimulator, CorrelatedSampler};
/// use pricer_pricing::rng::PricerRng;
///
/// let rho = CorrelationMatrix::new(&[1.0, 0.5, 0.5, 1.0], 2).unwrap();
/// let sampler = CorrelatedSampler::new(&rho, 1.0, PricerRng::from_seed(1)).unwrap();
/// let model = BasketModel::new(vec![100.0, 100.0], vec![0.2, 0.3], 0.05, 1.0).unwrap();
///
/// let mut simulator = BasketPriceSimulator::new(model, sampler).unwrap();
/// let prices = simulator.simulate();
/// assert!(prices.iter().all(|&s| s > 0.0));
/// ```
#[derive(Clone, Debug)]
pub struct BasketPriceSimulator {
    model: BasketModel,
    sampler: CorrelatedSampler,
    shocks: Vec<f64>,
    mirrored: Vec<f64>,
}

impl BasketPriceSimulator {
    /// Couples a model with a sampler of the same dimension and horizon.
    ///
    /// # Errors
    ///
    /// - `ConfigError::DimensionMismatch` if the dimensions differ
    /// - `ConfigError::InvalidParameter` if the horizons differ
    pub fn new(model: BasketModel, sampler: CorrelatedSampler) -> Result<Self, ConfigError> {
        if sampler.dimension() != model.dimension() {
            return Err(ConfigError::DimensionMismatch {
                name: "correlation",
                expected: model.dimension(),
                got: sampler.dimension(),
            });
        }
        if (sampler.horizon() - model.horizon()).abs() > HORIZON_TOLERANCE * model.horizon() {
            return Err(ConfigError::InvalidParameter {
                name: "horizon",
                value: format!(
                    "sampler horizon {} differs from model horizon {}",
                    sampler.horizon(),
                    model.horizon()
                ),
            });
        }

        let d = model.dimension();
        Ok(Self {
            model,
            sampler,
            shocks: vec![0.0; d],
            mirrored: vec![0.0; d],
        })
    }

    /// Number of underlyings.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    /// The market model.
    #[inline]
    pub fn model(&self) -> &BasketModel {
        &self.model
    }

    /// The correlated sampler.
    #[inline]
    pub fn sampler(&self) -> &CorrelatedSampler {
        &self.sampler
    }

    /// Simulates one terminal price vector.
    pub fn simulate(&mut self) -> Vec<f64> {
        let mut out = vec![0.0; self.dimension()];
        self.simulate_into(&mut out);
        out
    }

    /// Simulates one terminal price vector into `out`.
    #[inline]
    pub fn simulate_into(&mut self, out: &mut [f64]) {
        self.sampler.sample_into(&mut self.shocks);
        self.model.terminal_prices_into(&self.shocks, out);
    }

    /// Simulates the terminal prices driven by `W` and by `-W`.
    pub fn simulate_antithetic_pair(&mut self) -> (Vec<f64>, Vec<f64>) {
        let d = self.dimension();
        let mut up = vec![0.0; d];
        let mut down = vec![0.0; d];
        self.simulate_antithetic_pair_into(&mut up, &mut down);
        (up, down)
    }

    /// Allocation-free variant of
    /// [`simulate_antithetic_pair`](Self::simulate_antithetic_pair).
    #[inline]
    pub fn simulate_antithetic_pair_into(&mut self, up: &mut [f64], down: &mut [f64]) {
        self.sampler
            .sample_antithetic_pair_into(&mut self.shocks, &mut self.mirrored);
        self.model.terminal_prices_into(&self.shocks, up);
        self.model.terminal_prices_into(&self.mirrored, down);
    }
}
