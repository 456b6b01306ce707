//! Multi-asset Black-Scholes model for a basket of underlyings.
//!
//! Each underlying follows its own geometric Brownian motion,
//! ```text
//! dS_i = r * S_i * dt + sigma_i * S_i * dW_i
//! ```
//! with correlated drivers `d<W_i, W_j> = rho_ij dt`. At the horizon `T`
//! the exact solution is
//! ```text
//! S_T[i] = s0[i] * exp((r - 0.5 * sigma_i^2) * T + sigma_i * W_T[i])
//! ```
//! so terminal prices need no time discretisation: one correlated Gaussian
//! vector `W_T` with covariance `T * rho` gives one joint terminal sample.

use thiserror::Error;

/// Validation errors for [`BasketModel`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// The basket has no underlyings.
    #[error("Basket model must have at least one underlying")]
    EmptyBasket,

    /// Spot and volatility vectors disagree in length.
    #[error("Dimension mismatch: {spots} spots but {volatilities} volatilities")]
    DimensionMismatch {
        /// Number of spots.
        spots: usize,
        /// Number of volatilities.
        volatilities: usize,
    },

    /// Non-positive or non-finite spot.
    #[error("Invalid spot price at index {index}: S = {value}")]
    InvalidSpot {
        /// Underlying index.
        index: usize,
        /// Offending spot.
        value: f64,
    },

    /// Negative or non-finite volatility.
    #[error("Invalid volatility at index {index}: σ = {value}")]
    InvalidVolatility {
        /// Underlying index.
        index: usize,
        /// Offending volatility.
        value: f64,
    },

    /// Non-positive or non-finite horizon.
    #[error("Invalid horizon: T = {0}")]
    InvalidHorizon(f64),

    /// Non-finite interest rate.
    #[error("Invalid interest rate: r = {0}")]
    InvalidRate(f64),
}

/// Immutable model parameters of a basket of GBM underlyings.
///
/// # Examples
///
/// ```
/// use pricer_models::models::basket::BasketModel;
///
/// let model = BasketModel::new(vec![100.0, 50.0], vec![0.2, 0.3], 0.05, 1.0).unwrap();
/// assert_eq!(model.dimension(), 2);
///
/// // A zero shock leaves only the drift
/// let mut prices = [0.0; 2];
/// model.terminal_prices_into(&[0.0, 0.0], &mut prices);
/// assert!((prices[0] - 100.0 * (0.05_f64 - 0.02).exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BasketModel {
    spots: Vec<f64>,
    volatilities: Vec<f64>,
    rate: f64,
    horizon: f64,
    /// Cached `(r - 0.5 * sigma_i^2) * T`.
    drifts: Vec<f64>,
}

impl BasketModel {
    /// Creates a validated basket model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the basket is empty, the vectors disagree in
    /// length, a spot is not positive, a volatility is negative, the horizon
    /// is not positive or any input is not finite.
    pub fn new(
        spots: Vec<f64>,
        volatilities: Vec<f64>,
        rate: f64,
        horizon: f64,
    ) -> Result<Self, ModelError> {
        if spots.is_empty() {
            return Err(ModelError::EmptyBasket);
        }
        if spots.len() != volatilities.len() {
            return Err(ModelError::DimensionMismatch {
                spots: spots.len(),
                volatilities: volatilities.len(),
            });
        }
        if let Some((index, &value)) = spots
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s <= 0.0)
        {
            return Err(ModelError::InvalidSpot { index, value });
        }
        if let Some((index, &value)) = volatilities
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ModelError::InvalidVolatility { index, value });
        }
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(ModelError::InvalidHorizon(horizon));
        }
        if !rate.is_finite() {
            return Err(ModelError::InvalidRate(rate));
        }

        let drifts = volatilities
            .iter()
            .map(|sigma| (rate - 0.5 * sigma * sigma) * horizon)
            .collect();

        Ok(Self {
            spots,
            volatilities,
            rate,
            horizon,
            drifts,
        })
    }

    /// Number of underlyings `d`.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.spots.len()
    }

    /// Initial spot prices.
    #[inline]
    pub fn spots(&self) -> &[f64] {
        &self.spots
    }

    /// Volatilities.
    #[inline]
    pub fn volatilities(&self) -> &[f64] {
        &self.volatilities
    }

    /// Risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Horizon `T` in years.
    #[inline]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Discount factor `exp(-r * T)`.
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.horizon).exp()
    }

    /// Maps one terminal Brownian vector to terminal prices.
    ///
    /// # Panics
    ///
    /// Panics if `shocks` or `out` is shorter than [`dimension`](Self::dimension).
    #[inline]
    pub fn terminal_prices_into(&self, shocks: &[f64], out: &mut [f64]) {
        let d = self.dimension();
        assert!(
            shocks.len() >= d && out.len() >= d,
            "Buffers shorter than basket dimension {}",
            d
        );
        for i in 0..d {
            out[i] = self.spots[i] * (self.drifts[i] + self.volatilities[i] * shocks[i]).exp();
        }
    }
}
