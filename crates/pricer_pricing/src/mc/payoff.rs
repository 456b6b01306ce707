//! Basket index, call payoff and price quantisation.
//!
//! Also provides [`PayoffAccumulator`], the per-batch partial sums that the
//! estimator merges into its running total.

/// Basket index `I = Σ a_i · S_T[i]`.
///
/// Weights are used as given, without normalisation.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::basket_index;
///
/// assert_eq!(basket_index(&[0.5, 0.5], &[100.0, 110.0]), 105.0);
/// ```
#[inline]
pub fn basket_index(weights: &[f64], prices: &[f64]) -> f64 {
    weights.iter().zip(prices).map(|(a, s)| a * s).sum()
}

/// Call payoff `max(I - K, 0)`.
#[inline]
pub fn call_payoff(index: f64, strike: f64) -> f64 {
    (index - strike).max(0.0)
}

/// Rounds `value` to the nearest multiple of `precision`, halves away from zero.
///
/// # Examples
///
/// ```rust
/// use pricer_pricing::mc::quantise;
///
/// assert_eq!(quantise(12.345, 0.5), 12.5);
/// assert_eq!(quantise(12.2, 0.5), 12.0);
/// ```
#[inline]
pub fn quantise(value: f64, precision: f64) -> f64 {
    (value / precision).round() * precision
}

/// Running payoff sums per strike.
///
/// Batches are accumulated into a fresh accumulator and then
/// [`merge`](Self::merge)d into the total.
#[derive(Clone, Debug, PartialEq)]
pub struct PayoffAccumulator {
    count: usize,
    sums: Vec<f64>,
    sums_sq: Vec<f64>,
}

impl PayoffAccumulator {
    /// Creates an empty accumulator for `n_strikes` strikes.
    pub fn new(n_strikes: usize) -> Self {
        Self {
            count: 0,
            sums: vec![0.0; n_strikes],
            sums_sq: vec![0.0; n_strikes],
        }
    }

    /// Number of observations accumulated.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Adds one observation: the payoff of each strike at the given index.
    #[inline]
    pub fn add_index(&mut self, index: f64, strikes: &[f64]) {
        for ((sum, sum_sq), &k) in self.sums.iter_mut().zip(&mut self.sums_sq).zip(strikes) {
            let p = call_payoff(index, k);
            *sum += p;
            *sum_sq += p * p;
        }
        self.count += 1;
    }

    /// Adds one antithetic observation, the pair average of both legs.
    #[inline]
    pub fn add_antithetic_pair(&mut self, index: f64, mirrored_index: f64, strikes: &[f64]) {
        for ((sum, sum_sq), &k) in self.sums.iter_mut().zip(&mut self.sums_sq).zip(strikes) {
            let p = 0.5 * (call_payoff(index, k) + call_payoff(mirrored_index, k));
            *sum += p;
            *sum_sq += p * p;
        }
        self.count += 1;
    }

    /// Folds another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        for (a, b) in self.sums.iter_mut().zip(&other.sums) {
            *a += b;
        }
        for (a, b) in self.sums_sq.iter_mut().zip(&other.sums_sq) {
            *a += b;
        }
        self.count += other.count;
    }

    /// Sample mean for strike `j`, zero when empty.
    #[inline]
    pub fn mean(&self, j: usize) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sums[j] / self.count as f64
    }

    /// Standard error of the mean for strike `j`, zero below two observations.
    pub fn std_error(&self, j: usize) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let mean = self.sums[j] / n;
        let variance = ((self.sums_sq[j] - n * mean * mean) / (n - 1.0)).max(0.0);
        (variance / n).sqrt()
    }
}
