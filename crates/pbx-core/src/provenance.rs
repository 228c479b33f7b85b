//! Provenance and schema descriptors shared across pbx artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Records how a generated particle system was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemProvenance {
    /// Schema version of the serialized system payload.
    #[serde(default)]
    pub schema_version: SchemaVersion,
    /// Resolved replica counts along each lattice vector.
    pub replicas: [u32; 3],
    /// Uniform linear scale applied to lattice and positions.
    pub scale: f64,
    /// Standard deviation of the positional noise.
    pub sigma_noise: f64,
    /// Seed of the RNG handle used for noise, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Substream of `seed` the noise was drawn from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<u64>,
    /// Version map for the tools involved in producing the system.
    #[serde(default)]
    pub tool_versions: BTreeMap<String, String>,
}

impl Default for SystemProvenance {
    fn default() -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            replicas: [1, 1, 1],
            scale: 1.0,
            sigma_noise: 0.0,
            seed: None,
            stream: None,
            tool_versions: BTreeMap::new(),
        }
    }
}
