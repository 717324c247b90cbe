use fenris_dss_engine::EngineError;
use std::collections::TryReserveError;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

#[derive(Debug)]
pub enum DssError {
    /// The solver engine reported an error.
    Engine(EngineError),
    /// Memory for the named structure could not be allocated.
    AllocationFailed { what: &'static str, source: TryReserveError },
    /// A location array references an equation beyond the number of equations of the system.
    EquationOutOfBounds { equation: usize, num_equations: usize },
    /// The operation requires the internal structure to be built first.
    StructureNotBuilt,
    /// The dimensions of a local matrix do not match its location arrays.
    LocationMismatch {
        matrix: (usize, usize),
        locations: (usize, usize),
    },
    /// A vector does not match the dimension of the system.
    DimensionMismatch { expected: usize, actual: usize },
    /// The entry is not part of the stored sparsity pattern.
    EntryNotInPattern { row: usize, col: usize },
    /// A 1-based accessor was called with index zero.
    ZeroIndex,
    /// A solve was requested without a factorization of the current values.
    FactorizationStale,
    /// Matrix values were read after the storage was factorized.
    ReadAfterFactorization,
    /// A local assembler failed to compute a local contribution.
    Assembly(eyre::Report),
}

impl Display for DssError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DssError::Engine(err) => write!(f, "Solver engine error: {}", err),
            DssError::AllocationFailed { what, .. } => {
                write!(f, "Free store exhausted while allocating {}.", what)
            }
            DssError::EquationOutOfBounds {
                equation,
                num_equations,
            } => write!(
                f,
                "Equation number {} is out of bounds for a system with {} equations.",
                equation, num_equations
            ),
            DssError::StructureNotBuilt => write!(f, "Internal structure has not been built."),
            DssError::LocationMismatch { matrix, locations } => write!(
                f,
                "Local matrix of dimensions {}x{} does not match location arrays of lengths {} and {}.",
                matrix.0, matrix.1, locations.0, locations.1
            ),
            DssError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}.", expected, actual)
            }
            DssError::EntryNotInPattern { row, col } => {
                write!(f, "Entry ({}, {}) is not part of the sparsity pattern.", row, col)
            }
            DssError::ZeroIndex => write!(f, "1-based accessor called with index 0."),
            DssError::FactorizationStale => write!(
                f,
                "Matrix has been modified since the last factorization (or was never factorized)."
            ),
            DssError::ReadAfterFactorization => write!(
                f,
                "Matrix values are unavailable: storage has been factorized since it was last zeroed."
            ),
            DssError::Assembly(err) => write!(f, "Local assembly failed: {}", err),
        }
    }
}

impl Error for DssError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DssError::Engine(err) => Some(err),
            DssError::AllocationFailed { source, .. } => Some(source),
            DssError::Assembly(err) => {
                let source: &(dyn Error + 'static) = err.as_ref();
                Some(source)
            }
            _ => None,
        }
    }
}

impl From<EngineError> for DssError {
    fn from(err: EngineError) -> Self {
        DssError::Engine(err)
    }
}
