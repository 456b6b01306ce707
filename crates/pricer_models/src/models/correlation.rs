//! Correlation matrices and their Cholesky factors.
//!
//! This module provides the numerical linear algebra behind correlated
//! Brownian drivers for multi-asset Monte Carlo.
//!
//! ## Mathematical Background
//!
//! Given `n` independent standard normal random variables `Z = [Z1, ..., Zn]`,
//! correlated normals `W = [W1, ..., Wn]` are obtained as
//!
//! ```text
//! W = L * Z
//! ```
//!
//! where `L` is the lower triangular Cholesky factor of the target covariance
//! matrix `C = L * L^T`. For a terminal Brownian vector at horizon `T` with
//! correlation `ρ`, the covariance is `C = T * ρ`.
//!
//! The factorisation accepts positive semi-definite input (for example two
//! perfectly correlated assets): a pivot within tolerance of zero produces a
//! zero column instead of a failure, provided the rest of the column is
//! consistent with it.
//!
//! ## Usage
//!
//! ```
//! use pricer_models::models::correlation::CorrelationMatrix;
//!
//! let corr = CorrelationMatrix::new(&[
//!     1.0_f64, 0.5,
//!     0.5, 1.0,
//! ], 2).unwrap();
//!
//! // Factor of the covariance at a two-year horizon
//! let l = corr.covariance_cholesky(2.0).unwrap();
//!
//! let w = l.transform(&[0.5_f64, 0.8]);
//! assert_eq!(w.len(), 2);
//! ```

use num_traits::Float;
use thiserror::Error;

/// Tolerance used for diagonal and symmetry checks.
const VALIDATION_TOLERANCE: f64 = 1e-10;

/// Relative pivot tolerance of the semi-definite Cholesky factorisation.
pub const PSD_TOLERANCE: f64 = 1e-12;

/// Error types for correlation operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CorrelationError {
    /// Matrix is not positive semi-definite.
    #[error("Matrix is not positive semi-definite: pivot {pivot} is {value}")]
    NotPositiveSemiDefinite {
        /// Row/column at which the factorisation broke down.
        pivot: usize,
        /// Offending residual.
        value: f64,
    },

    /// Matrix dimensions are invalid.
    #[error("Invalid matrix dimensions: expected {expected} elements, got {got}")]
    InvalidDimensions {
        /// Expected element count.
        expected: usize,
        /// Actual element count.
        got: usize,
    },

    /// Diagonal elements are not 1.0.
    #[error("Diagonal element at index {index} is {value}, expected 1.0")]
    InvalidDiagonal {
        /// Diagonal index.
        index: usize,
        /// Actual value.
        value: f64,
    },

    /// Matrix is not symmetric.
    #[error("Matrix is not symmetric at ({i}, {j})")]
    NotSymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },

    /// Correlation value out of range [-1, 1].
    #[error("Correlation at ({i}, {j}) is {value}, must be in [-1, 1]")]
    OutOfRange {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// Actual value.
        value: f64,
    },

    /// Covariance scale (horizon) is not strictly positive and finite.
    #[error("Invalid covariance scale {value}: must be positive and finite")]
    InvalidScale {
        /// Offending scale.
        value: f64,
    },
}

/// Correlation matrix with validation and Cholesky decomposition.
///
/// A correlation matrix must satisfy:
/// - Square and symmetric
/// - Diagonal elements equal to 1.0
/// - Off-diagonal elements in [-1, 1]
/// - Positive semi-definite (checked by [`CorrelationMatrix::cholesky`])
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix<T: Float> {
    /// Matrix elements in row-major order
    data: Vec<T>,
    /// Matrix dimension (n x n)
    dim: usize,
}

impl<T: Float> CorrelationMatrix<T> {
    /// Create a new correlation matrix from flat array (row-major).
    ///
    /// # Validation
    ///
    /// - Must have exactly dim*dim elements, with dim >= 1
    /// - Diagonal elements must be 1.0
    /// - Must be symmetric
    /// - Off-diagonal elements must be finite and in [-1, 1]
    pub fn new(data: &[T], dim: usize) -> Result<Self, CorrelationError> {
        let expected = dim * dim;
        if dim == 0 || data.len() != expected {
            return Err(CorrelationError::InvalidDimensions {
                expected,
                got: data.len(),
            });
        }

        let one = T::one();
        let epsilon = T::from(VALIDATION_TOLERANCE).unwrap_or_else(T::epsilon);

        for i in 0..dim {
            let diag = data[i * dim + i];
            if !diag.is_finite() || (diag - one).abs() > epsilon {
                return Err(CorrelationError::InvalidDiagonal {
                    index: i,
                    value: diag.to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        for i in 0..dim {
            for j in (i + 1)..dim {
                let val_ij = data[i * dim + j];
                let val_ji = data[j * dim + i];

                if !val_ij.is_finite() || val_ij.abs() > one {
                    return Err(CorrelationError::OutOfRange {
                        i,
                        j,
                        value: val_ij.to_f64().unwrap_or(f64::NAN),
                    });
                }

                if !val_ji.is_finite() || (val_ij - val_ji).abs() > epsilon {
                    return Err(CorrelationError::NotSymmetric { i, j });
                }
            }
        }

        Ok(Self {
            data: data.to_vec(),
            dim,
        })
    }

    /// Create a correlation matrix from a list of rows.
    ///
    /// Ragged input is reported as [`CorrelationError::InvalidDimensions`].
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, CorrelationError> {
        let dim = rows.len();
        if let Some(row) = rows.iter().find(|row| row.len() != dim) {
            return Err(CorrelationError::InvalidDimensions {
                expected: dim * dim,
                got: dim * (dim - 1) + row.len(),
            });
        }
        let data: Vec<T> = rows.iter().flatten().copied().collect();
        Self::new(&data, dim)
    }

    /// Create an identity correlation matrix (no correlation).
    pub fn identity(dim: usize) -> Self {
        let mut data = vec![T::zero(); dim * dim];
        for i in 0..dim {
            data[i * dim + i] = T::one();
        }
        Self { data, dim }
    }

    /// Get matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.data[i * self.dim + j]
    }

    /// Cholesky factor of the correlation matrix itself.
    pub fn cholesky(&self) -> Result<CholeskyFactor<T>, CorrelationError> {
        cholesky_lower_psd(&self.data, self.dim, T::one())
    }

    /// Cholesky factor of the covariance matrix `scale * ρ`.
    ///
    /// For a Brownian vector observed at horizon `T`, pass `scale = T`; the
    /// resulting factor maps independent standard normals to a draw with
    /// covariance `T * ρ`.
    ///
    /// # Errors
    ///
    /// - [`CorrelationError::InvalidScale`] if `scale` is not positive and finite
    /// - [`CorrelationError::NotPositiveSemiDefinite`] if factorisation fails
    pub fn covariance_cholesky(&self, scale: T) -> Result<CholeskyFactor<T>, CorrelationError> {
        if !scale.is_finite() || scale <= T::zero() {
            return Err(CorrelationError::InvalidScale {
                value: scale.to_f64().unwrap_or(f64::NAN),
            });
        }
        cholesky_lower_psd(&self.data, self.dim, scale)
    }
}

/// Semi-definite Cholesky factorisation of `scale * data`.
///
/// A pivot below `-tol` rejects the matrix. A pivot in `[-tol, tol]` yields a
/// zero column, and every residual below it must then vanish too.
fn cholesky_lower_psd<T: Float>(
    data: &[T],
    n: usize,
    scale: T,
) -> Result<CholeskyFactor<T>, CorrelationError> {
    let tol = T::from(PSD_TOLERANCE).unwrap_or_else(T::epsilon) * scale;
    let mut lower = vec![T::zero(); n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = scale * data[i * n + j];
            for k in 0..j {
                sum = sum - lower[i * n + k] * lower[j * n + k];
            }

            if i == j {
                if sum < -tol || sum.is_nan() {
                    return Err(CorrelationError::NotPositiveSemiDefinite {
                        pivot: i,
                        value: sum.to_f64().unwrap_or(f64::NAN),
                    });
                }
                lower[i * n + i] = sum.max(T::zero()).sqrt();
            } else {
                let l_jj = lower[j * n + j];
                if l_jj > tol {
                    lower[i * n + j] = sum / l_jj;
                } else if sum.abs() > tol.sqrt() {
                    // Zero pivot with a non-zero residual below it.
                    return Err(CorrelationError::NotPositiveSemiDefinite {
                        pivot: j,
                        value: sum.to_f64().unwrap_or(f64::NAN),
                    });
                }
            }
        }
    }

    Ok(CholeskyFactor { data: lower, dim: n })
}

/// Lower triangular Cholesky factor.
///
/// Used to transform independent standard normals into correlated normals.
#[derive(Clone, Debug, PartialEq)]
pub struct CholeskyFactor<T: Float> {
    /// Lower triangular matrix elements (row-major)
    data: Vec<T>,
    /// Matrix dimension
    dim: usize,
}

impl<T: Float> CholeskyFactor<T> {
    /// Get matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get element at (i, j).
    ///
    /// Returns zero for upper triangular elements (j > i).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        if j > i {
            T::zero()
        } else {
            self.data[i * self.dim + j]
        }
    }

    /// Transform independent standard normals to correlated normals.
    ///
    /// # Panics
    ///
    /// Panics if `z.len() < self.dim()`.
    pub fn transform(&self, z: &[T]) -> Vec<T> {
        let mut w = vec![T::zero(); self.dim];
        self.transform_into(z, &mut w);
        w
    }

    /// Computes `out = L * z` without allocating.
    ///
    /// # Panics
    ///
    /// Panics if either slice is shorter than `self.dim()`.
    pub fn transform_into(&self, z: &[T], out: &mut [T]) {
        assert!(
            z.len() >= self.dim && out.len() >= self.dim,
            "Input length {} / output length {} is less than matrix dimension {}",
            z.len(),
            out.len(),
            self.dim
        );

        let n = self.dim;
        for (i, slot) in out.iter_mut().enumerate().take(n) {
            let row = &self.data[i * n..i * n + i + 1];
            *slot = row
                .iter()
                .zip(z)
                .fold(T::zero(), |acc, (&l, &zj)| acc + l * zj);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reconstruct(l: &CholeskyFactor<f64>) -> Vec<f64> {
        let n = l.dim();
        let mut out = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                out[i * n + j] = (0..n).map(|k| l.get(i, k) * l.get(j, k)).sum();
            }
        }
        out
    }

    #[test]
    fn test_correlation_matrix_valid() {
        let m = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.get(0, 1), 0.5);
        assert_eq!(m.get(1, 0), 0.5);
    }

    #[test]
    fn test_correlation_matrix_invalid_dimensions() {
        let matrix = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5], 2);
        assert!(matches!(
            matrix,
            Err(CorrelationError::InvalidDimensions { expected: 4, got: 3 })
        ));

        let empty = CorrelationMatrix::<f64>::new(&[], 0);
        assert!(matches!(
            empty,
            Err(CorrelationError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_correlation_matrix_invalid_diagonal() {
        let matrix = CorrelationMatrix::new(&[0.9_f64, 0.5, 0.5, 1.0], 2);
        assert!(matches!(
            matrix,
            Err(CorrelationError::InvalidDiagonal { index: 0, .. })
        ));
    }

    #[test]
    fn test_correlation_matrix_not_symmetric() {
        let matrix = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.3, 1.0], 2);
        assert!(matches!(matrix, Err(CorrelationError::NotSymmetric { .. })));
    }

    #[test]
    fn test_correlation_matrix_out_of_range() {
        let matrix = CorrelationMatrix::new(&[1.0_f64, 1.5, 1.5, 1.0], 2);
        assert!(matches!(
            matrix,
            Err(CorrelationError::OutOfRange { value, .. }) if value == 1.5
        ));

        let nan = CorrelationMatrix::new(&[1.0_f64, f64::NAN, f64::NAN, 1.0], 2);
        assert!(matches!(nan, Err(CorrelationError::OutOfRange { .. })));
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![vec![1.0_f64, 0.2], vec![0.2, 1.0]];
        let m = CorrelationMatrix::from_rows(&rows).unwrap();
        assert_eq!(m, CorrelationMatrix::new(&[1.0, 0.2, 0.2, 1.0], 2).unwrap());

        let ragged = vec![vec![1.0_f64, 0.2], vec![0.2]];
        assert!(matches!(
            CorrelationMatrix::from_rows(&ragged),
            Err(CorrelationError::InvalidDimensions { expected: 4, got: 3 })
        ));
    }

    #[test]
    fn test_cholesky_identity() {
        let l = CorrelationMatrix::<f64>::identity(3).cholesky().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(l.get(i, j), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_2x2() {
        let m = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();

        // L = [[1, 0], [0.5, sqrt(0.75)]]
        assert_relative_eq!(l.get(0, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(l.get(1, 0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(l.get(1, 1), 0.75_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(l.get(0, 1), 0.0);
    }

    #[test]
    fn test_covariance_cholesky_reconstruction() {
        #[rustfmt::skip]
        let data = [
            1.0_f64, 0.3, 0.2,
            0.3, 1.0, 0.4,
            0.2, 0.4, 1.0,
        ];
        let m = CorrelationMatrix::new(&data, 3).unwrap();
        let horizon = 2.5;
        let l = m.covariance_cholesky(horizon).unwrap();

        let cov = reconstruct(&l);
        for (c, r) in cov.iter().zip(data.iter()) {
            assert_relative_eq!(*c, horizon * r, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_covariance_cholesky_invalid_scale() {
        let m = CorrelationMatrix::<f64>::identity(2);
        assert!(matches!(
            m.covariance_cholesky(0.0),
            Err(CorrelationError::InvalidScale { .. })
        ));
        assert!(matches!(
            m.covariance_cholesky(f64::INFINITY),
            Err(CorrelationError::InvalidScale { .. })
        ));
    }

    #[test]
    fn test_cholesky_semi_definite_accepted() {
        // Perfect correlation is singular but positive semi-definite
        let m = CorrelationMatrix::new(&[1.0_f64, 1.0, 1.0, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();

        assert_relative_eq!(l.get(1, 0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(l.get(1, 1), 0.0, epsilon = 1e-6);

        let w = l.transform(&[0.7, -3.0]);
        assert_relative_eq!(w[0], w[1], epsilon = 1e-6);
    }

    #[test]
    fn test_cholesky_not_positive_semi_definite() {
        // Every entry is in range, but the matrix has a negative eigenvalue
        #[rustfmt::skip]
        let data = [
            1.0_f64, 0.9, -0.9,
            0.9, 1.0, 0.9,
            -0.9, 0.9, 1.0,
        ];
        let m = CorrelationMatrix::new(&data, 3).unwrap();
        assert!(matches!(
            m.cholesky(),
            Err(CorrelationError::NotPositiveSemiDefinite { pivot: 2, .. })
        ));
    }

    #[test]
    fn test_cholesky_zero_pivot_with_residual_rejected() {
        // Leading 2x2 block is singular, third row contradicts it
        #[rustfmt::skip]
        let data = [
            1.0_f64, 1.0, 0.0,
            1.0, 1.0, 1.0,
            0.0, 1.0, 1.0,
        ];
        let m = CorrelationMatrix::new(&data, 3).unwrap();
        assert!(matches!(
            m.cholesky(),
            Err(CorrelationError::NotPositiveSemiDefinite { pivot: 1, .. })
        ));
    }

    #[test]
    fn test_transform_correlated() {
        let m = CorrelationMatrix::new(&[1.0_f64, 0.5, 0.5, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();

        let w = l.transform(&[1.0, 0.0]);
        assert_relative_eq!(w[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(w[1], 0.5, epsilon = 1e-12);

        let mut out = [0.0; 2];
        l.transform_into(&[0.0, 2.0], &mut out);
        assert_eq!(out[0], 0.0);
        assert_relative_eq!(out[1], 2.0 * 0.75_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "less than matrix dimension")]
    fn test_transform_short_input_panics() {
        let l = CorrelationMatrix::<f64>::identity(3).cholesky().unwrap();
        let _ = l.transform(&[1.0, 2.0]);
    }

    #[test]
    fn test_correlation_matrix_f32() {
        let m = CorrelationMatrix::new(&[1.0_f32, 0.5, 0.5, 1.0], 2).unwrap();
        let l = m.cholesky().unwrap();
        let w = l.transform(&[1.0_f32, 0.0]);
        assert!((w[1] - 0.5_f32).abs() < 1e-6);
    }

    #[test]
    fn test_correlation_error_display() {
        let err = CorrelationError::NotPositiveSemiDefinite {
            pivot: 1,
            value: -0.25,
        };
        assert!(err.to_string().contains("positive semi-definite"));

        let err = CorrelationError::InvalidDimensions {
            expected: 4,
            got: 3,
        };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains('3'));
    }
}
