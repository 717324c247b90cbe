use crate::{BlockMap, EngineError, FactorizationKind, Real, SolverEngine, StorageMode};
use log::debug;
use nalgebra::{Cholesky, DMatrix, DVectorView, DVectorViewMut, Dyn, LU};
use nalgebra_sparse::pattern::SparsityPattern;
use nalgebra_sparse::CscMatrix;

/// A reference solver engine built on `nalgebra` and `nalgebra-sparse`.
///
/// Values are stored in a CSC matrix with the handed-over pattern (restricted to the lower
/// triangle for symmetric kinds). Factorization densifies the stored matrix and uses
/// `nalgebra`'s LU decomposition for the $LDL^T$ and $LU$ kinds, and its Cholesky
/// decomposition for the $LL^T$ kind. Factors are kept apart from the stored values, so
/// entries remain readable after factorization.
///
/// The engine is intended for small to moderately sized systems and for testing.
#[derive(Debug, Clone)]
pub struct NativeEngine<T: Real> {
    kind: Option<FactorizationKind>,
    matrix: Option<CscMatrix<T>>,
    block_size: usize,
    block_map: Option<BlockMap>,
    analyzed: bool,
    factorization: Option<Factorization<T>>,
}

#[derive(Debug, Clone)]
enum Factorization<T: Real> {
    Lu(LU<T, Dyn, Dyn>),
    Cholesky(Cholesky<T, Dyn>),
}

impl<T: Real> Default for NativeEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> NativeEngine<T> {
    pub fn new() -> Self {
        Self {
            kind: None,
            matrix: None,
            block_size: 0,
            block_map: None,
            analyzed: false,
            factorization: None,
        }
    }

    pub fn kind(&self) -> Option<FactorizationKind> {
        self.kind
    }

    /// The stored matrix. For symmetric kinds, only the lower triangle is stored.
    pub fn matrix(&self) -> Option<&CscMatrix<T>> {
        self.matrix.as_ref()
    }

    pub fn block_map(&self) -> Option<&BlockMap> {
        self.block_map.as_ref()
    }

    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    pub fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }

    fn value_index(&self, row: usize, col: usize) -> Option<usize> {
        let matrix = self.matrix.as_ref()?;
        if col >= matrix.ncols() {
            return None;
        }
        let offsets = matrix.col_offsets();
        let (begin, end) = (offsets[col], offsets[col + 1]);
        matrix.row_indices()[begin..end]
            .binary_search(&row)
            .ok()
            .map(|local_index| begin + local_index)
    }
}

/// Returns the pattern consisting of the entries of `pattern` with `row >= col`.
fn lower_triangular_part(pattern: &SparsityPattern) -> SparsityPattern {
    let num_cols = pattern.major_dim();
    let mut offsets = Vec::with_capacity(num_cols + 1);
    let mut row_indices = Vec::new();
    offsets.push(0);
    for col in 0..num_cols {
        row_indices.extend(pattern.lane(col).iter().copied().filter(|&row| row >= col));
        offsets.push(row_indices.len());
    }
    SparsityPattern::try_from_offsets_and_indices(num_cols, pattern.minor_dim(), offsets, row_indices)
        .expect("The lower triangle of a valid pattern is a valid pattern")
}

/// Dense representation of the stored matrix, mirroring the lower triangle if `symmetric`.
fn densify<T: Real>(matrix: &CscMatrix<T>, symmetric: bool) -> DMatrix<T> {
    let mut dense = DMatrix::zeros(matrix.nrows(), matrix.ncols());
    let offsets = matrix.col_offsets();
    for col in 0..matrix.ncols() {
        let range = offsets[col]..offsets[col + 1];
        let rows = &matrix.row_indices()[range.clone()];
        let values = &matrix.values()[range];
        for (&row, &value) in rows.iter().zip(values) {
            dense[(row, col)] += value;
            if symmetric && row != col {
                dense[(col, row)] += value;
            }
        }
    }
    dense
}

impl<T: Real> SolverEngine<T> for NativeEngine<T> {
    fn initialize(&mut self, kind: FactorizationKind) -> Result<(), EngineError> {
        *self = Self::new();
        self.kind = Some(kind);
        Ok(())
    }

    fn set_pattern(&mut self, pattern: SparsityPattern, block_size: usize) -> Result<(), EngineError> {
        let kind = self.kind.ok_or(EngineError::NotInitialized)?;
        if pattern.major_dim() != pattern.minor_dim() {
            return Err(EngineError::NonSquarePattern {
                rows: pattern.minor_dim(),
                cols: pattern.major_dim(),
            });
        }

        let pattern = if kind.is_symmetric() {
            lower_triangular_part(&pattern)
        } else {
            pattern
        };
        let values = vec![T::zero(); pattern.nnz()];
        let matrix = CscMatrix::try_from_pattern_and_values(pattern, values)
            .expect("Values are allocated to match the pattern");

        self.matrix = Some(matrix);
        self.block_size = block_size;
        self.block_map = None;
        self.analyzed = false;
        self.factorization = None;
        Ok(())
    }

    fn load_block_map(&mut self, block_map: &BlockMap) -> Result<(), EngineError> {
        let dimension = self.matrix.as_ref().ok_or(EngineError::NoPattern)?.ncols();
        if block_map.block_size() != self.block_size {
            return Err(EngineError::InvalidBlockMap(format!(
                "block size {} does not match the block size {} of the pattern",
                block_map.block_size(),
                self.block_size
            )));
        }
        if let Some(max_equation) = block_map.max_equation() {
            if max_equation >= dimension {
                return Err(EngineError::InvalidBlockMap(format!(
                    "equation {} is out of bounds for {} equations",
                    max_equation, dimension
                )));
            }
        }
        self.block_map = Some(block_map.clone());
        Ok(())
    }

    fn pre_factorize(&mut self) -> Result<(), EngineError> {
        let matrix = self.matrix.as_ref().ok_or(EngineError::NoPattern)?;
        debug!(
            "Native engine analyzed structure with {} equations and {} stored entries ({:?}).",
            matrix.ncols(),
            matrix.nnz(),
            self.storage_mode()
        );
        self.analyzed = true;
        Ok(())
    }

    fn load_zeros(&mut self) {
        if let Some(matrix) = &mut self.matrix {
            matrix.values_mut().fill(T::zero());
        }
        self.factorization = None;
    }

    fn refactorize(&mut self) -> Result<(), EngineError> {
        let kind = self.kind.ok_or(EngineError::NotInitialized)?;
        let matrix = self.matrix.as_ref().ok_or(EngineError::NoPattern)?;
        self.factorization = None;

        let dense = densify(matrix, kind.is_symmetric());
        let factorization = match kind {
            FactorizationKind::SymmetricLl => dense.cholesky().map(Factorization::Cholesky),
            FactorizationKind::SymmetricLdl | FactorizationKind::UnsymmetricLu => {
                let lu = dense.lu();
                lu.is_invertible().then(|| Factorization::Lu(lu))
            }
        };
        self.factorization = Some(factorization.ok_or(EngineError::FactorizationFailed(kind))?);
        Ok(())
    }

    fn solve(&self, b: DVectorView<T>, mut x: DVectorViewMut<T>) -> Result<(), EngineError> {
        let kind = self.kind.ok_or(EngineError::NotInitialized)?;
        let dimension = self.dimension();
        for len in [b.len(), x.len()] {
            if len != dimension {
                return Err(EngineError::DimensionMismatch {
                    expected: dimension,
                    actual: len,
                });
            }
        }

        match self.factorization.as_ref().ok_or(EngineError::NotFactorized)? {
            Factorization::Lu(lu) => {
                let solution = lu.solve(&b).ok_or(EngineError::FactorizationFailed(kind))?;
                x.copy_from(&solution);
            }
            Factorization::Cholesky(cholesky) => {
                x.copy_from(&cholesky.solve(&b));
            }
        }
        Ok(())
    }

    fn element(&self, row: usize, col: usize) -> Option<T> {
        let index = self.value_index(row, col)?;
        self.matrix
            .as_ref()
            .map(|matrix| matrix.values()[index])
    }

    fn element_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        let index = self.value_index(row, col)?;
        self.matrix
            .as_mut()
            .map(|matrix| &mut matrix.values_mut()[index])
    }

    fn scale(&mut self, factor: T) {
        if let Some(matrix) = &mut self.matrix {
            for value in matrix.values_mut() {
                *value *= factor;
            }
        }
        self.factorization = None;
    }

    fn dimension(&self) -> usize {
        self.matrix
            .as_ref()
            .map(|matrix| matrix.ncols())
            .unwrap_or(0)
    }

    fn nnz(&self) -> usize {
        self.matrix
            .as_ref()
            .map(|matrix| matrix.nnz())
            .unwrap_or(0)
    }

    fn storage_mode(&self) -> StorageMode {
        match (&self.matrix, &self.block_map) {
            (None, _) => StorageMode::Unallocated,
            (Some(_), None) => StorageMode::PatternOnly,
            (Some(_), Some(block_map)) => StorageMode::Blocked {
                block_size: block_map.block_size(),
                num_blocks: block_map.num_blocks(),
            },
        }
    }
}
