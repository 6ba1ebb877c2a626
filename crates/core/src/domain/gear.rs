use serde::{Deserialize, Serialize};

use super::units::{Dimensions, Weight};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GearId(pub String);

impl GearId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GearId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A piece of equipment to be protected. Owned by the external catalog;
/// read-only to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gear {
    pub id: GearId,
    pub name: String,
    /// Free text, e.g. "synthesizer" or "effects-pedal". Drives the
    /// protection heuristics.
    pub category: String,
    /// Free-text sub-type, e.g. "analog" or "audio-interface".
    pub gear_type: String,
    pub dimensions: Dimensions,
    pub weight: Weight,
    /// Default catalog ordering only; never a scoring input.
    pub popularity: i64,
}
