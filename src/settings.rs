use fenris_dss_engine::FactorizationKind;
use serde::{Deserialize, Serialize};

/// Settings of a [`DssMatrix`](crate::DssMatrix).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DssSettings {
    pub kind: FactorizationKind,
    /// Whether the entity block map is handed to the engine. If disabled, the engine always
    /// uses pattern-only storage.
    pub use_block_map: bool,
}

impl Default for DssSettings {
    fn default() -> Self {
        Self {
            kind: FactorizationKind::default(),
            use_block_map: true,
        }
    }
}

impl DssSettings {
    pub fn with_kind(kind: FactorizationKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}
