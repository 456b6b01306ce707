//! Closed-form reference prices.
//!
//! The Monte Carlo estimator is checked against these formulas in the
//! one-asset case, where the basket collapses to a single lognormal
//! underlying:
//! - [`BlackScholes`]: European call on one GBM underlying
//! - [`norm_cdf`] / [`norm_pdf`]: standard normal distribution functions

pub mod black_scholes;
pub mod distributions;
pub mod error;

pub use black_scholes::BlackScholes;
pub use distributions::{norm_cdf, norm_pdf};
pub use error::AnalyticalError;
