//! Sparse system matrices for finite element codes, backed by direct sparse solver engines.
//!
//! A [`DssMatrix`] derives a compressed-column sparsity pattern and an entity block map from
//! the connectivity of a [`FiniteElementDomain`](model::FiniteElementDomain), accumulates local
//! element and boundary condition contributions under a symmetric (lower-triangular) or
//! unsymmetric policy, and delegates factorization and solves to a
//! [`SolverEngine`](engine::SolverEngine).
pub mod assembly;
pub mod block_map;
pub mod compat;
pub mod connectivity;
pub mod error;
pub mod matrix;
pub mod model;
pub mod pattern;
pub mod settings;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub mod engine {
    pub use fenris_dss_engine::*;
}

pub use error::DssError;
pub use matrix::DssMatrix;
pub use settings::DssSettings;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;
