//! Standard normal distribution functions.

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Abramowitz and Stegun 7.1.26 coefficients, highest order last.
const ERFC_COEFFS: [f64; 5] = [
    0.254_829_592,
    -0.284_496_736,
    1.421_413_741,
    -1.453_152_027,
    1.061_405_429,
];
const ERFC_P: f64 = 0.327_591_1;

/// Complementary error function, absolute error below 1.5e-7.
#[inline]
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + ERFC_P * z);
    let poly = ERFC_COEFFS.iter().rev().fold(0.0, |acc, &c| c + t * acc);
    let tail = t * poly * (-z * z).exp();
    if x < 0.0 {
        2.0 - tail
    } else {
        tail
    }
}

/// Standard normal CDF, `Φ(x) = erfc(-x / √2) / 2`.
///
/// # Examples
/// ```
/// use pricer_models::analytical::norm_cdf;
///
/// assert!((norm_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(3.0) > 0.99);
/// ```
#[inline]
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal density, `φ(x) = exp(-x² / 2) / √(2π)`.
#[inline]
pub fn norm_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}
