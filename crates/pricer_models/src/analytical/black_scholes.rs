//! Black-Scholes price of a European call on one lognormal underlying.
//!
//! **Call Price**: C = S·N(d₁) - K·e^(-rT)·N(d₂)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ - σ√T
//!
//! The basket estimator computes the undiscounted expectation
//! `E[(S_T - K)⁺] = e^(rT)·C`, exposed here as
//! [`forward_call_price`](BlackScholes::forward_call_price).

use super::distributions::norm_cdf;
use super::error::AnalyticalError;

/// Black-Scholes model for one underlying.
///
/// # Examples
/// ```
/// use pricer_models::analytical::BlackScholes;
///
/// let bs = BlackScholes::new(100.0, 0.05, 0.2).unwrap();
/// let call = bs.call_price(100.0, 1.0).unwrap();
/// assert!((call - 10.4506).abs() < 1e-3);
///
/// let forward = bs.forward_call_price(100.0, 1.0).unwrap();
/// assert!((forward - call * 0.05_f64.exp()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BlackScholes {
    spot: f64,
    rate: f64,
    volatility: f64,
}

impl BlackScholes {
    /// Creates a new model.
    ///
    /// A zero volatility is accepted and prices the deterministic forward.
    ///
    /// # Errors
    /// - `AnalyticalError::InvalidSpot` if spot is not positive and finite
    /// - `AnalyticalError::InvalidVolatility` if volatility is negative or not finite
    pub fn new(spot: f64, rate: f64, volatility: f64) -> Result<Self, AnalyticalError> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(AnalyticalError::InvalidSpot { spot });
        }
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(AnalyticalError::InvalidVolatility { volatility });
        }
        Ok(Self {
            spot,
            rate,
            volatility,
        })
    }

    /// Returns the spot price.
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns the risk-free rate.
    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Present value of a European call.
    ///
    /// # Errors
    /// `AnalyticalError::InvalidExpiry` if `expiry` is not positive and finite.
    pub fn call_price(&self, strike: f64, expiry: f64) -> Result<f64, AnalyticalError> {
        if !expiry.is_finite() || expiry <= 0.0 {
            return Err(AnalyticalError::InvalidExpiry { expiry });
        }

        let discount = (-self.rate * expiry).exp();
        let vol_sqrt_t = self.volatility * expiry.sqrt();

        // Non-positive strikes are always exercised; zero volatility is the forward
        if strike <= 0.0 {
            return Ok(self.spot - strike * discount);
        }
        if vol_sqrt_t == 0.0 {
            return Ok((self.spot - strike * discount).max(0.0));
        }

        let d1 = ((self.spot / strike).ln()
            + (self.rate + 0.5 * self.volatility * self.volatility) * expiry)
            / vol_sqrt_t;
        let d2 = d1 - vol_sqrt_t;

        Ok(self.spot * norm_cdf(d1) - strike * discount * norm_cdf(d2))
    }

    /// Undiscounted call value `E[(S_T - K)⁺] = e^(rT)·C`.
    ///
    /// # Errors
    /// `AnalyticalError::InvalidExpiry` if `expiry` is not positive and finite.
    pub fn forward_call_price(&self, strike: f64, expiry: f64) -> Result<f64, AnalyticalError> {
        Ok(self.call_price(strike, expiry)? * (self.rate * expiry).exp())
    }
}
