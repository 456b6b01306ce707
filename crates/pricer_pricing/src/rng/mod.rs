//! # Random Number Generation
//!
//! Seedable uniform and Gaussian source for the Monte Carlo sampler.
//!
//! - **Reproducibility**: every generator carries the seed it was initialised
//!   with, so a run started from entropy can be replayed from its logged seed
//! - **Efficiency**: zero-allocation batch operations via `&mut [f64]` slices
//!
//! ## Usage Example
//!
//! ```rust
//! use pricer_pricing::rng::PricerRng;
//!
//! let mut rng = PricerRng::from_seed(12345);
//! let uniform_value = rng.gen_uniform();
//! let normal_value = rng.gen_normal();
//!
//! let mut buffer = vec![0.0; 1000];
//! rng.fill_normal(&mut buffer);
//! ```

mod prng;

pub use prng::PricerRng;

#[cfg(test)]
mod tests;
