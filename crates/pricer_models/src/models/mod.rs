//! Multi-asset lognormal model and its correlation structure.
//!
//! - [`CorrelationMatrix`]: validated correlation matrix with PSD Cholesky
//! - [`CholeskyFactor`]: lower-triangular factor used to correlate draws
//! - [`BasketModel`]: spots, volatilities, rate and horizon of a basket
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::{BasketModel, CorrelationMatrix};
//!
//! let rho = CorrelationMatrix::new(&[1.0, 0.5, 0.5, 1.0], 2).unwrap();
//! let factor = rho.covariance_cholesky(1.0).unwrap();
//! let model = BasketModel::new(vec![100.0, 100.0], vec![0.2, 0.3], 0.05, 1.0).unwrap();
//! assert_eq!(factor.dim(), model.dimension());
//! ```

pub mod basket;
pub mod correlation;

pub use basket::{BasketModel, ModelError};
pub use correlation::{CholeskyFactor, CorrelationError, CorrelationMatrix};
