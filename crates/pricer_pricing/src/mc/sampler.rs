//! Correlated Gaussian draws for the terminal Brownian vector.
//!
//! [`CorrelatedSampler`] factorises the covariance `T·ρ` once at
//! construction and maps i.i.d. standard normals `Z` through the factor:
//!
//! ```text
//! X = L·Z,   L·Lᵀ = T·ρ,   Z ~ N(0, I)
//! ```
//!
//! so every draw has mean zero and covariance exactly `T·ρ`.

use pricer_models::models::{CholeskyFactor, CorrelationError, CorrelationMatrix};
use tracing::debug;

use crate::rng::PricerRng;

/// Source of zero-mean Gaussian vectors with covariance `T·ρ`.
///
/// Owns its random stream and the Cholesky factor; the factor is read-only
/// after construction.
///
/// # Examples
///
/// ```rust
/// use pricer_models::models::CorrelationMatrix;
/// use pricer_pricing::mc::CorrelatedSampler;
/// use pricer_pricing::rng::PricerRng;
///
/// let rho = CorrelationMatrix::new(&[1.0, 0.3, 0.3, 1.0], 2).unwrap();
/// let mut sampler = CorrelatedSampler::new(&rho, 1.0, PricerRng::from_seed(7)).unwrap();
///
/// let (x, y) = sampler.sample_antithetic_pair();
/// assert_eq!(x[0], -y[0]);
/// ```
#[derive(Clone, Debug)]
pub struct CorrelatedSampler {
    factor: CholeskyFactor<f64>,
    horizon: f64,
    rng: PricerRng,
    /// Scratch buffer for the independent normals.
    normals: Vec<f64>,
}

impl CorrelatedSampler {
    /// Factorises `horizon·correlation` and takes ownership of `rng`.
    ///
    /// # Errors
    ///
    /// - `CorrelationError::InvalidScale` if `horizon` is not positive and finite
    /// - `CorrelationError::NotPositiveSemiDefinite` if the factorisation fails
    pub fn new(
        correlation: &CorrelationMatrix<f64>,
        horizon: f64,
        rng: PricerRng,
    ) -> Result<Self, CorrelationError> {
        let factor = correlation.covariance_cholesky(horizon)?;
        let dim = factor.dim();
        debug!(dimension = dim, horizon, seed = rng.seed(), "Factorised covariance");
        Ok(Self {
            factor,
            horizon,
            rng,
            normals: vec![0.0; dim],
        })
    }

    /// Dimension `d` of every draw.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.factor.dim()
    }

    /// Horizon `T` the covariance was scaled by.
    #[inline]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Lower-triangular factor of `T·ρ`.
    #[inline]
    pub fn cholesky(&self) -> &CholeskyFactor<f64> {
        &self.factor
    }

    /// Seed of the owned random stream.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Draws one correlated vector.
    pub fn sample(&mut self) -> Vec<f64> {
        let mut out = vec![0.0; self.dimension()];
        self.sample_into(&mut out);
        out
    }

    /// Draws one correlated vector into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than [`dimension`](Self::dimension).
    #[inline]
    pub fn sample_into(&mut self, out: &mut [f64]) {
        self.rng.fill_normal(&mut self.normals);
        self.factor.transform_into(&self.normals, out);
    }

    /// Draws `X` and returns `(X, -X)`.
    pub fn sample_antithetic_pair(&mut self) -> (Vec<f64>, Vec<f64>) {
        let d = self.dimension();
        let mut x = vec![0.0; d];
        let mut mirrored = vec![0.0; d];
        self.sample_antithetic_pair_into(&mut x, &mut mirrored);
        (x, mirrored)
    }

    /// Draws `X` into `x` and its exact negation into `mirrored`.
    ///
    /// # Panics
    ///
    /// Panics if either buffer is shorter than [`dimension`](Self::dimension).
    #[inline]
    pub fn sample_antithetic_pair_into(&mut self, x: &mut [f64], mirrored: &mut [f64]) {
        self.sample_into(x);
        let d = self.dimension();
        for (m, &v) in mirrored[..d].iter_mut().zip(&x[..d]) {
            *m = -v;
        }
    }
}
