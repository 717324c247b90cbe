use crate::FactorizationKind;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A factorization kind name could not be recognized.
    UnknownFactorizationKind(String),
    /// The engine was used before `initialize` was called.
    NotInitialized,
    /// The operation requires a sparsity pattern, but none has been set.
    NoPattern,
    /// The handed-over pattern does not describe a square system.
    NonSquarePattern { rows: usize, cols: usize },
    /// A vector or map did not match the dimension of the handed-over structure.
    DimensionMismatch { expected: usize, actual: usize },
    /// The block map is inconsistent with the handed-over structure.
    InvalidBlockMap(String),
    /// The numerical factorization failed, typically because the matrix is singular
    /// or (for Cholesky) not positive definite.
    FactorizationFailed(FactorizationKind),
    /// A solve was requested, but no factorization is available.
    NotFactorized,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownFactorizationKind(name) => {
                write!(f, "Unknown factorization kind \"{}\".", name)
            }
            EngineError::NotInitialized => write!(f, "Engine has not been initialized."),
            EngineError::NoPattern => write!(f, "No sparsity pattern has been set."),
            EngineError::NonSquarePattern { rows, cols } => {
                write!(f, "Sparsity pattern must be square, but has dimensions {}x{}.", rows, cols)
            }
            EngineError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}.", expected, actual)
            }
            EngineError::InvalidBlockMap(reason) => write!(f, "Invalid block map: {}", reason),
            EngineError::FactorizationFailed(kind) => {
                write!(f, "Numerical factorization ({}) failed.", kind)
            }
            EngineError::NotFactorized => write!(f, "No factorization available."),
        }
    }
}

impl Error for EngineError {}
