//! # Pricer Models (L2: Business Logic)
//!
//! Market model of a basket of correlated lognormal underlyings.
//!
//! This crate provides:
//! - Correlation matrices and their positive semi-definite Cholesky factor
//! - The multi-asset Black-Scholes model with its exact terminal solution
//! - Closed-form single-asset formulas used as validation references
//!
//! Everything here is deterministic; random draws and estimation live in
//! `pricer_pricing`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod models;
