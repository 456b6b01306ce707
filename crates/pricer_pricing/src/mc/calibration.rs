//! Pilot-run calibration of the sample counts.
//!
//! A pilot of `N0` independent basket indices `I = aᵀ·S_T` gives the
//! unbiased variance estimate `V̂`. The sample count needed for a two-sided
//! confidence interval of half-width `ε` at `z ≈ 2` is
//!
//! ```text
//! N_plain = 4·V̂ / ε²
//! N_anti  = 2·V̂ / ε²
//! ```
//!
//! The antithetic count halves the plain one. This is the usual
//! approximation for antithetic pairs and is not re-estimated from the
//! pair variance.

use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::config::EstimatorConfig;
use super::payoff::basket_index;
use super::simulator::BasketPriceSimulator;

/// `z²` for the plain estimator.
pub const PLAIN_SAMPLE_FACTOR: f64 = 4.0;

/// Factor of the antithetic estimator, half of [`PLAIN_SAMPLE_FACTOR`].
pub const ANTITHETIC_SAMPLE_FACTOR: f64 = 2.0;

/// Welford running mean and variance.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::RunningMoments;
///
/// let mut m = RunningMoments::new();
/// for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
///     m.push(x);
/// }
/// assert!((m.mean() - 5.0).abs() < 1e-12);
/// assert!((m.variance() - 32.0 / 7.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningMoments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    /// Creates empty moments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one observation.
    #[inline]
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// Number of observations.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sample mean, zero when empty.
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance `1/(n-1)·Σ(x - x̄)²`, zero below two observations.
    #[inline]
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }
}

/// Sample count `factor·variance/precision²`, truncated and at least 1.
///
/// Counts beyond `usize::MAX` saturate.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::{required_samples, PLAIN_SAMPLE_FACTOR};
///
/// assert_eq!(required_samples(PLAIN_SAMPLE_FACTOR, 25.0, 0.5), 400);
/// assert_eq!(required_samples(PLAIN_SAMPLE_FACTOR, 0.0, 0.5), 1);
/// ```
#[inline]
pub fn required_samples(factor: f64, variance: f64, precision: f64) -> usize {
    let raw = factor * variance / (precision * precision);
    // `as` truncates toward zero, saturates on overflow and maps NaN to 0
    (raw as usize).max(1)
}

/// Result of the pilot run, fixed for the life of an estimator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    pilot_samples: usize,
    pilot_mean: f64,
    pilot_variance: f64,
    plain_samples: usize,
    antithetic_samples: usize,
    capped: bool,
}

impl Calibration {
    /// Derives sample counts from pilot moments.
    ///
    /// When `max_samples` is set, both counts are clamped to it and the
    /// target precision is no longer guaranteed.
    pub fn from_moments(
        moments: &RunningMoments,
        precision: f64,
        max_samples: Option<usize>,
    ) -> Self {
        let variance = moments.variance();
        let mut plain = required_samples(PLAIN_SAMPLE_FACTOR, variance, precision);
        let mut antithetic = required_samples(ANTITHETIC_SAMPLE_FACTOR, variance, precision);
        let mut capped = false;

        if let Some(max) = max_samples {
            if plain > max || antithetic > max {
                warn!(
                    plain,
                    antithetic,
                    max_samples = max,
                    "Sample counts capped, target precision not guaranteed"
                );
                plain = plain.min(max);
                antithetic = antithetic.min(max);
                capped = true;
            }
        }

        Self {
            pilot_samples: moments.count(),
            pilot_mean: moments.mean(),
            pilot_variance: variance,
            plain_samples: plain,
            antithetic_samples: antithetic,
            capped,
        }
    }

    /// Runs the pilot simulation and derives the sample counts.
    ///
    /// Consumes `config.pilot_samples()` draws from the simulator.
    pub fn run(simulator: &mut BasketPriceSimulator, config: &EstimatorConfig) -> Self {
        let mut prices = vec![0.0; simulator.dimension()];
        let mut moments = RunningMoments::new();
        for _ in 0..config.pilot_samples() {
            simulator.simulate_into(&mut prices);
            moments.push(basket_index(config.weights(), &prices));
        }
        debug!(
            pilot_samples = moments.count(),
            mean = moments.mean(),
            variance = moments.variance(),
            "Pilot run finished"
        );

        let calibration = Self::from_moments(&moments, config.precision(), config.max_samples());
        info!(
            precision = config.precision(),
            plain = calibration.plain_samples,
            antithetic = calibration.antithetic_samples,
            "Calibrated sample counts"
        );
        calibration
    }

    /// Pilot size `N0`.
    #[inline]
    pub fn pilot_samples(&self) -> usize {
        self.pilot_samples
    }

    /// Pilot mean of the basket index.
    #[inline]
    pub fn pilot_mean(&self) -> f64 {
        self.pilot_mean
    }

    /// Unbiased pilot variance `V̂` of the basket index.
    #[inline]
    pub fn pilot_variance(&self) -> f64 {
        self.pilot_variance
    }

    /// Simulations used by the plain estimator.
    #[inline]
    pub fn plain_samples(&self) -> usize {
        self.plain_samples
    }

    /// Pairs used by the antithetic estimator.
    #[inline]
    pub fn antithetic_samples(&self) -> usize {
        self.antithetic_samples
    }

    /// Whether `max_samples` clamped either count.
    #[inline]
    pub fn is_capped(&self) -> bool {
        self.capped
    }
}
