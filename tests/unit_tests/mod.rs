use fenris_dss::engine::{
    BlockMap, EngineError, FactorizationKind, NativeEngine, SolverEngine, StorageMode,
};
use fenris_dss::model::{create_chain_domain, DomainModel};
use fenris_dss::nalgebra::{DMatrix, DVectorView, DVectorViewMut};
use fenris_dss::nalgebra_sparse::pattern::SparsityPattern;
use fenris_dss::DssMatrix;

mod assembly;
mod block_map;

/// Two-node bar element stiffness matrix with unit stiffness.
#[rustfmt::skip]
fn bar_stiffness() -> DMatrix<f64> {
    DMatrix::from_row_slice(2, 2, &[
        1.0, -1.0,
        -1.0, 1.0,
    ])
}

/// A chain of `num_nodes` nodes with one dof each, where the first node is constrained.
fn clamped_bar(num_nodes: usize) -> DomainModel {
    create_chain_domain(num_nodes, 1, &[0])
}

fn built_matrix(kind: FactorizationKind, domain: &DomainModel) -> DssMatrix<f64> {
    let mut matrix = DssMatrix::new(kind).unwrap();
    matrix.build_internal_structure(domain).unwrap();
    matrix
}

/// Dense copy of the stored values of the matrix.
fn stored_values<E: SolverEngine<f64>>(matrix: &DssMatrix<f64, E>) -> DMatrix<f64> {
    DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |i, j| matrix.get(i, j))
}

/// Engine wrapping [`NativeEngine`] that counts refactorizations.
#[derive(Debug, Default)]
struct CountingEngine {
    inner: NativeEngine<f64>,
    refactorizations: usize,
}

impl SolverEngine<f64> for CountingEngine {
    fn initialize(&mut self, kind: FactorizationKind) -> Result<(), EngineError> {
        self.inner.initialize(kind)
    }

    fn set_pattern(&mut self, pattern: SparsityPattern, block_size: usize) -> Result<(), EngineError> {
        self.inner.set_pattern(pattern, block_size)
    }

    fn load_block_map(&mut self, block_map: &BlockMap) -> Result<(), EngineError> {
        self.inner.load_block_map(block_map)
    }

    fn pre_factorize(&mut self) -> Result<(), EngineError> {
        self.inner.pre_factorize()
    }

    fn load_zeros(&mut self) {
        self.inner.load_zeros()
    }

    fn refactorize(&mut self) -> Result<(), EngineError> {
        self.refactorizations += 1;
        self.inner.refactorize()
    }

    fn solve(&self, b: DVectorView<f64>, x: DVectorViewMut<f64>) -> Result<(), EngineError> {
        self.inner.solve(b, x)
    }

    fn element(&self, row: usize, col: usize) -> Option<f64> {
        self.inner.element(row, col)
    }

    fn element_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        self.inner.element_mut(row, col)
    }

    fn scale(&mut self, factor: f64) {
        self.inner.scale(factor)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn nnz(&self) -> usize {
        self.inner.nnz()
    }

    fn storage_mode(&self) -> StorageMode {
        self.inner.storage_mode()
    }
}
