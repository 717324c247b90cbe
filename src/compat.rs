//! Element access with 1-based indices.
//!
//! [`DssMatrix`] uses 0-based indices throughout, while location arrays and finite element
//! codes built around equation numbers address entries by 1-based equation numbers.
//! [`OneBasedAccess`] offers element access in the latter convention so that such callers do
//! not need to re-base indices themselves.
//!
//! ```
//! use fenris_dss::compat::OneBasedAccess;
//! use fenris_dss::engine::FactorizationKind;
//! use fenris_dss::model::create_chain_domain;
//! use fenris_dss::DssMatrix;
//!
//! let domain = create_chain_domain(3, 1, &[]);
//! let mut matrix = DssMatrix::<f64>::new(FactorizationKind::UnsymmetricLu).unwrap();
//! matrix.build_internal_structure(&domain).unwrap();
//!
//! *matrix.at_mut(1, 2).unwrap() = 3.0;
//! assert_eq!(matrix.at(1, 2).unwrap(), 3.0);
//! assert_eq!(matrix.get(0, 1), 3.0);
//! ```
use crate::{DssError, DssMatrix};
use fenris_dss_engine::{Real, SolverEngine};

fn zero_based(row: usize, col: usize) -> Result<(usize, usize), DssError> {
    if row == 0 || col == 0 {
        Err(DssError::ZeroIndex)
    } else {
        Ok((row - 1, col - 1))
    }
}

pub trait OneBasedAccess<T> {
    /// The stored value at the 1-based entry `(row, col)`, or zero if the entry is not stored.
    fn at(&self, row: usize, col: usize) -> Result<T, DssError>;

    /// Mutable access to the stored value at the 1-based entry `(row, col)`.
    fn at_mut(&mut self, row: usize, col: usize) -> Result<&mut T, DssError>;
}

impl<T: Real, E: SolverEngine<T>> OneBasedAccess<T> for DssMatrix<T, E> {
    fn at(&self, row: usize, col: usize) -> Result<T, DssError> {
        let (row, col) = zero_based(row, col)?;
        Ok(self.get(row, col))
    }

    fn at_mut(&mut self, row: usize, col: usize) -> Result<&mut T, DssError> {
        let (row, col) = zero_based(row, col)?;
        self.get_mut(row, col)
    }
}
