use crate::block_map::{block_size, build_block_map, BlockMap};
use crate::model::{equation_index, EquationNumber, FiniteElementDomain};
use crate::pattern::build_domain_pattern;
use crate::{DssError, DssSettings};
use fenris_dss_engine::{AssemblyPolicy, FactorizationKind, NativeEngine, Real, SolverEngine, StorageMode};
use itertools::iproduct;
use log::{debug, trace};
use nalgebra::{DMatrixView, DVector, DVectorView};
use std::marker::PhantomData;

/// A square sparse system matrix whose storage and factorization are delegated to a
/// direct sparse solver engine.
///
/// The matrix is used in two phases. First, [`build_internal_structure`](Self::build_internal_structure)
/// derives the sparsity pattern and the entity block map from a finite element domain and
/// hands both to the engine. Afterwards, values are repeatedly zeroed, assembled from local
/// element and boundary condition contributions, factorized and solved against the same
/// structure. A change in topology requires rebuilding the structure from scratch.
///
/// All indices are 0-based. Location arrays passed to the assembly methods hold 1-based
/// equation numbers, where non-positive numbers mark entries that are silently skipped.
/// See [`compat`](crate::compat) for legacy 1-based element accessors.
///
/// Every mutation bumps a version counter, which callers can use to detect stale caches.
/// Any mutation after a factorization makes the factorization stale: [`solve`](Self::solve)
/// then fails until [`factorized`](Self::factorized) is called again.
#[derive(Debug)]
pub struct DssMatrix<T: Real, E: SolverEngine<T> = NativeEngine<T>> {
    engine: E,
    settings: DssSettings,
    dimension: usize,
    structure_built: bool,
    block_map: Option<BlockMap>,
    version: u64,
    factorized_version: Option<u64>,
    // Engines may overwrite values with factors, so values are only readable
    // until the next factorization
    factorized_since_zero: bool,
    marker: PhantomData<T>,
}

impl<T: Real> DssMatrix<T> {
    /// Creates a matrix backed by a [`NativeEngine`].
    pub fn new(kind: FactorizationKind) -> Result<Self, DssError> {
        Self::with_settings(DssSettings::with_kind(kind))
    }

    pub fn with_settings(settings: DssSettings) -> Result<Self, DssError> {
        Self::with_engine(NativeEngine::new(), settings)
    }

    /// Creates a matrix for the factorization kind with the given registry name,
    /// e.g. `"dss_sym_ldl"`.
    pub fn from_kind_name(name: &str) -> Result<Self, DssError> {
        let kind: FactorizationKind = name.parse()?;
        Self::new(kind)
    }
}

/// Pairs of (local index, 0-based equation index) of the live entries of a location array.
fn live_locations(locations: &[EquationNumber]) -> impl '_ + Iterator<Item = (usize, usize)> {
    locations
        .iter()
        .enumerate()
        .filter_map(|(local, &number)| equation_index(number).map(|global| (local, global)))
}

impl<T: Real, E: SolverEngine<T>> DssMatrix<T, E> {
    /// Creates a matrix backed by the given engine, which is initialized with the configured
    /// factorization kind.
    pub fn with_engine(mut engine: E, settings: DssSettings) -> Result<Self, DssError> {
        engine.initialize(settings.kind)?;
        Ok(Self {
            engine,
            settings,
            dimension: 0,
            structure_built: false,
            block_map: None,
            version: 0,
            factorized_version: None,
            factorized_since_zero: false,
            marker: PhantomData,
        })
    }

    /// Builds the sparsity pattern and block map of the domain and hands them to the engine.
    ///
    /// Afterwards all values are zero and the matrix is not factorized. If the build fails,
    /// the matrix has no usable structure and the build must be repeated.
    pub fn build_internal_structure(&mut self, domain: &dyn FiniteElementDomain) -> Result<(), DssError> {
        self.structure_built = false;
        self.block_map = None;
        self.factorized_version = None;
        self.factorized_since_zero = false;

        let num_equations = domain.num_equations();
        let pattern = build_domain_pattern(domain)?;
        let pattern_nnz = pattern.nnz();
        let block_size = block_size(domain);
        let block_map = if self.settings.use_block_map {
            build_block_map(domain)?
        } else {
            debug!("Block mapping is disabled. Using pattern-only storage.");
            None
        };

        self.engine.set_pattern(pattern, block_size)?;
        if let Some(block_map) = &block_map {
            self.engine.load_block_map(block_map)?;
        }
        self.engine.pre_factorize()?;
        self.engine.load_zeros();

        self.dimension = num_equations;
        self.block_map = block_map;
        self.structure_built = true;
        self.version += 1;

        debug!(
            "DSS matrix structure: {} equations, {} pattern entries, {} stored entries, block size {}, {:?}.",
            num_equations,
            pattern_nnz,
            self.engine.nnz(),
            block_size,
            self.engine.storage_mode()
        );
        Ok(())
    }

    fn ensure_structure(&self) -> Result<(), DssError> {
        if self.structure_built {
            Ok(())
        } else {
            Err(DssError::StructureNotBuilt)
        }
    }

    fn add_to_entry(&mut self, row: usize, col: usize, value: T) -> Result<(), DssError> {
        let entry = self
            .engine
            .element_mut(row, col)
            .ok_or(DssError::EntryNotInPattern { row, col })?;
        *entry += value;
        Ok(())
    }

    fn check_local_dimensions(
        local: &DMatrixView<T>,
        num_row_locations: usize,
        num_col_locations: usize,
    ) -> Result<(), DssError> {
        if local.nrows() != num_row_locations || local.ncols() != num_col_locations {
            Err(DssError::LocationMismatch {
                matrix: (local.nrows(), local.ncols()),
                locations: (num_row_locations, num_col_locations),
            })
        } else {
            Ok(())
        }
    }

    /// Adds a square local contribution whose rows and columns share the same location array.
    ///
    /// Under the symmetric policy, only global entries with `row >= col` are written, and the
    /// global entry `(locations[i], locations[j])` receives the local entry `(j, i)`. For the
    /// symmetric local matrices the symmetric policy is intended for, this is the same as `(i, j)`.
    pub fn assemble<'a>(
        &mut self,
        locations: &[EquationNumber],
        local: impl Into<DMatrixView<'a, T>>,
    ) -> Result<(), DssError> {
        let local = local.into();
        Self::check_local_dimensions(&local, locations.len(), locations.len())?;
        self.ensure_structure()?;
        self.version += 1;

        let policy = self.policy();
        for (j, col) in live_locations(locations) {
            for (i, row) in live_locations(locations) {
                match policy {
                    AssemblyPolicy::UnsymmetricFull => self.add_to_entry(row, col, local[(i, j)])?,
                    AssemblyPolicy::SymmetricLower => {
                        if col <= row {
                            self.add_to_entry(row, col, local[(j, i)])?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Adds a rectangular local contribution with independent row and column location arrays.
    ///
    /// Under the symmetric policy, only global entries with `row >= col` are written.
    pub fn assemble_rectangular<'a>(
        &mut self,
        row_locations: &[EquationNumber],
        col_locations: &[EquationNumber],
        local: impl Into<DMatrixView<'a, T>>,
    ) -> Result<(), DssError> {
        let local = local.into();
        Self::check_local_dimensions(&local, row_locations.len(), col_locations.len())?;
        self.ensure_structure()?;
        self.version += 1;

        let policy = self.policy();
        for (i, row) in live_locations(row_locations) {
            for (j, col) in live_locations(col_locations) {
                if policy == AssemblyPolicy::UnsymmetricFull || col <= row {
                    self.add_to_entry(row, col, local[(i, j)])?;
                }
            }
        }
        Ok(())
    }

    /// Sets all values to zero and discards the factorization.
    pub fn zero(&mut self) {
        self.engine.load_zeros();
        self.version += 1;
        self.factorized_version = None;
        self.factorized_since_zero = false;
    }

    /// Ensures that the engine holds a factorization of the current values.
    ///
    /// Does nothing if the current values have already been factorized.
    pub fn factorized(&mut self) -> Result<&mut Self, DssError> {
        if self.is_factorized() {
            trace!("DSS matrix at version {} is already factorized.", self.version);
            return Ok(self);
        }
        self.ensure_structure()?;

        debug!(
            "Factorizing DSS matrix ({}) with {} equations at version {}.",
            self.kind(),
            self.dimension,
            self.version
        );
        self.factorized_since_zero = true;
        self.engine.refactorize()?;
        self.factorized_version = Some(self.version);
        Ok(self)
    }

    /// Solves `A x = b` with the current factorization, resizing `x` to the length of `b`.
    pub fn solve<'a>(&self, b: impl Into<DVectorView<'a, T>>, x: &mut DVector<T>) -> Result<(), DssError> {
        let b = b.into();
        if !self.is_factorized() {
            return Err(DssError::FactorizationStale);
        }
        if b.len() != self.dimension {
            return Err(DssError::DimensionMismatch {
                expected: self.dimension,
                actual: b.len(),
            });
        }
        x.resize_vertically_mut(b.len(), T::zero());
        self.engine.solve(b, x.into())?;
        Ok(())
    }

    /// Same as [`solve`](Self::solve), but allocates the solution.
    pub fn solve_vector<'a>(&self, b: impl Into<DVectorView<'a, T>>) -> Result<DVector<T>, DssError> {
        let mut x = DVector::zeros(0);
        self.solve(b, &mut x)?;
        Ok(x)
    }

    /// The value of the represented matrix at `(row, col)`.
    ///
    /// Unlike [`get`](Self::get), the upper triangle of symmetric matrices is mirrored
    /// from the stored lower triangle.
    fn represented_entry(&self, row: usize, col: usize) -> T {
        let (row, col) = if self.kind().is_symmetric() && col > row {
            (col, row)
        } else {
            (row, col)
        };
        self.engine.element(row, col).unwrap_or_else(T::zero)
    }

    /// Computes the matrix-vector product `A x` by querying every entry of the matrix.
    ///
    /// This is not efficient, and only possible before factorization: once the storage has
    /// been factorized, its values are no longer available until the matrix is zeroed.
    pub fn times<'a>(&self, x: impl Into<DVectorView<'a, T>>) -> Result<DVector<T>, DssError> {
        let x = x.into();
        self.ensure_structure()?;
        if self.factorized_since_zero {
            return Err(DssError::ReadAfterFactorization);
        }
        let n = self.dimension;
        if x.len() != n {
            return Err(DssError::DimensionMismatch {
                expected: n,
                actual: x.len(),
            });
        }

        let mut answer = DVector::zeros(n);
        for (j, i) in iproduct!(0..n, 0..n) {
            answer[i] += self.represented_entry(i, j) * x[j];
        }
        Ok(answer)
    }

    /// Multiplies all values by `factor`.
    pub fn scale(&mut self, factor: T) {
        self.engine.scale(factor);
        self.version += 1;
    }

    /// The stored value at `(row, col)`, or zero if the entry is not stored.
    ///
    /// Under the symmetric policy only entries with `row >= col` are stored.
    pub fn get(&self, row: usize, col: usize) -> T {
        if !self.structure_built {
            return T::zero();
        }
        self.engine.element(row, col).unwrap_or_else(T::zero)
    }

    /// Mutable access to the stored value at `(row, col)`.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Result<&mut T, DssError> {
        self.ensure_structure()?;
        self.version += 1;
        self.engine
            .element_mut(row, col)
            .ok_or(DssError::EntryNotInPattern { row, col })
    }

    pub fn nrows(&self) -> usize {
        self.dimension
    }

    pub fn ncols(&self) -> usize {
        self.dimension
    }

    /// The number of entries stored by the engine.
    pub fn nnz(&self) -> usize {
        self.engine.nnz()
    }

    pub fn kind(&self) -> FactorizationKind {
        self.settings.kind
    }

    pub fn policy(&self) -> AssemblyPolicy {
        self.settings.kind.assembly_policy()
    }

    pub fn settings(&self) -> &DssSettings {
        &self.settings
    }

    /// The block map handed to the engine, or `None` if the engine uses pattern-only storage.
    pub fn block_map(&self) -> Option<&BlockMap> {
        self.block_map.as_ref()
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.engine.storage_mode()
    }

    pub fn has_structure(&self) -> bool {
        self.structure_built
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the engine holds a factorization of the current values.
    pub fn is_factorized(&self) -> bool {
        self.factorized_version == Some(self.version)
    }

    /// Whether the matrix has been modified since it was last factorized.
    pub fn is_factorization_stale(&self) -> bool {
        self.factorized_version
            .map(|version| version != self.version)
            .unwrap_or(false)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
