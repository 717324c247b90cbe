use crate::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

/// The factorization performed by a solver engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorizationKind {
    /// Symmetric indefinite $LDL^T$ factorization.
    #[serde(rename = "dss_sym_ldl")]
    SymmetricLdl,
    /// Symmetric positive definite $LL^T$ (Cholesky) factorization.
    #[serde(rename = "dss_sym_ll")]
    SymmetricLl,
    /// Unsymmetric $LU$ factorization.
    #[serde(rename = "dss_unsym_lu")]
    UnsymmetricLu,
}

impl Default for FactorizationKind {
    fn default() -> Self {
        FactorizationKind::SymmetricLdl
    }
}

impl FactorizationKind {
    pub const ALL: [FactorizationKind; 3] = [
        FactorizationKind::SymmetricLdl,
        FactorizationKind::SymmetricLl,
        FactorizationKind::UnsymmetricLu,
    ];

    /// The registry name of the kind, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            FactorizationKind::SymmetricLdl => "dss_sym_ldl",
            FactorizationKind::SymmetricLl => "dss_sym_ll",
            FactorizationKind::UnsymmetricLu => "dss_unsym_lu",
        }
    }

    pub fn is_symmetric(self) -> bool {
        match self {
            FactorizationKind::SymmetricLdl | FactorizationKind::SymmetricLl => true,
            FactorizationKind::UnsymmetricLu => false,
        }
    }

    pub fn assembly_policy(self) -> AssemblyPolicy {
        if self.is_symmetric() {
            AssemblyPolicy::SymmetricLower
        } else {
            AssemblyPolicy::UnsymmetricFull
        }
    }
}

impl Display for FactorizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FactorizationKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactorizationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| EngineError::UnknownFactorizationKind(s.to_string()))
    }
}

/// How local contributions are accumulated into global storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssemblyPolicy {
    /// Only entries with `row >= col` are stored and written.
    SymmetricLower,
    /// Every entry is stored, regardless of ordering.
    UnsymmetricFull,
}
