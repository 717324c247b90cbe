//! The interface between finite element assembly and a direct sparse solver engine.
//!
//! An engine owns the numerical storage behind a sparsity pattern handed to it by the
//! structure builder, and is responsible for factorization, zeroing and triangular solves.
//! The assembly layer never makes assumptions about how an engine lays out its storage:
//! it only reads and writes individual entries through [`SolverEngine::element`] and
//! [`SolverEngine::element_mut`].
//!
//! [`NativeEngine`] is a reference engine that keeps values on a `nalgebra-sparse` CSC matrix
//! and delegates factorization to `nalgebra`.
use nalgebra::{DVectorView, DVectorViewMut, RealField};
use nalgebra_sparse::pattern::SparsityPattern;

mod block;
mod error;
mod kind;
mod native;

pub use block::*;
pub use error::*;
pub use kind::*;
pub use native::*;

pub use nalgebra;
pub use nalgebra_sparse;

pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// How an engine lays out its storage after the structure has been handed over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// No pattern has been set yet.
    Unallocated,
    /// Storage follows the sparsity pattern only.
    PatternOnly,
    /// Storage is aligned with a block map of the given block size.
    Blocked { block_size: usize, num_blocks: usize },
}

/// A direct sparse solver engine.
///
/// All indices are 0-based. The expected call sequence is
/// `initialize`, `set_pattern`, optionally `load_block_map`, `pre_factorize` and `load_zeros`,
/// after which entries may be written and the engine repeatedly refactorized and solved.
///
/// After `refactorize`, an engine is free to hold factor values in its element storage until the
/// next call to `load_zeros`. Callers must therefore not interpret entries read after
/// factorization as entries of the original matrix.
pub trait SolverEngine<T: Real> {
    /// Resets the engine and selects the kind of factorization it will perform.
    fn initialize(&mut self, kind: FactorizationKind) -> Result<(), EngineError>;

    /// Hands over the compressed-column sparsity pattern of a square system.
    ///
    /// The pattern may contain both triangles. Engines performing a symmetric factorization
    /// only retain entries with `row >= col`.
    fn set_pattern(&mut self, pattern: SparsityPattern, block_size: usize) -> Result<(), EngineError>;

    /// Hands over the map from entity blocks to equations. Only valid after `set_pattern`.
    fn load_block_map(&mut self, block_map: &BlockMap) -> Result<(), EngineError>;

    /// Performs the symbolic analysis of the handed-over structure.
    fn pre_factorize(&mut self) -> Result<(), EngineError>;

    /// Sets every stored value to zero and discards any factorization.
    fn load_zeros(&mut self);

    /// Numerically factorizes the currently stored values.
    fn refactorize(&mut self) -> Result<(), EngineError>;

    /// Solves `A x = b` with the current factorization.
    fn solve(&self, b: DVectorView<T>, x: DVectorViewMut<T>) -> Result<(), EngineError>;

    /// Returns the stored value at `(row, col)`, or `None` if the entry is not stored.
    fn element(&self, row: usize, col: usize) -> Option<T>;

    /// Returns a mutable reference to the stored value at `(row, col)`, or `None` if the entry
    /// is not stored.
    fn element_mut(&mut self, row: usize, col: usize) -> Option<&mut T>;

    /// Multiplies every stored value by `factor`.
    fn scale(&mut self, factor: T);

    /// The number of equations of the handed-over pattern, or zero if none was set.
    fn dimension(&self) -> usize;

    /// The number of stored entries.
    fn nnz(&self) -> usize;

    fn storage_mode(&self) -> StorageMode;
}

impl<'a, T, E> SolverEngine<T> for &'a mut E
where
    T: Real,
    E: ?Sized + SolverEngine<T>,
{
    fn initialize(&mut self, kind: FactorizationKind) -> Result<(), EngineError> {
        E::initialize(self, kind)
    }

    fn set_pattern(&mut self, pattern: SparsityPattern, block_size: usize) -> Result<(), EngineError> {
        E::set_pattern(self, pattern, block_size)
    }

    fn load_block_map(&mut self, block_map: &BlockMap) -> Result<(), EngineError> {
        E::load_block_map(self, block_map)
    }

    fn pre_factorize(&mut self) -> Result<(), EngineError> {
        E::pre_factorize(self)
    }

    fn load_zeros(&mut self) {
        E::load_zeros(self)
    }

    fn refactorize(&mut self) -> Result<(), EngineError> {
        E::refactorize(self)
    }

    fn solve(&self, b: DVectorView<T>, x: DVectorViewMut<T>) -> Result<(), EngineError> {
        E::solve(self, b, x)
    }

    fn element(&self, row: usize, col: usize) -> Option<T> {
        E::element(self, row, col)
    }

    fn element_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        E::element_mut(self, row, col)
    }

    fn scale(&mut self, factor: T) {
        E::scale(self, factor)
    }

    fn dimension(&self) -> usize {
        E::dimension(self)
    }

    fn nnz(&self) -> usize {
        E::nnz(self)
    }

    fn storage_mode(&self) -> StorageMode {
        E::storage_mode(self)
    }
}
