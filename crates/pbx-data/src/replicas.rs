use pbx_core::errors::{ErrorInfo, PbxError};
use serde::{Deserialize, Serialize};

/// Number of unit cell copies along each lattice vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplicaCount {
    /// Same count along every in-plane axis; z stays 1 for 2D cells.
    Uniform(u32),
    /// Explicit `(nx, ny, nz)`.
    PerAxis([u32; 3]),
}

impl Default for ReplicaCount {
    fn default() -> Self {
        ReplicaCount::Uniform(1)
    }
}

impl ReplicaCount {
    /// Resolves the count into `[nx, ny, nz]` for a cell of the given dimensionality.
    ///
    /// A 2D cell cannot be replicated out of plane, so an explicit `nz != 1`
    /// is rejected. Zero counts are rejected for every cell.
    pub fn resolve(&self, is_2d: bool) -> Result<[u32; 3], PbxError> {
        let counts = match *self {
            ReplicaCount::Uniform(n) => [n, n, if is_2d { 1 } else { n }],
            ReplicaCount::PerAxis(counts) => counts,
        };
        if is_2d && counts[2] != 1 {
            return Err(PbxError::Geometry(
                ErrorInfo::new(
                    "replicas-2d",
                    "the number of replicas in z must be 1 for a 2D unit cell",
                )
                .with_context("nz", counts[2].to_string()),
            ));
        }
        if counts.contains(&0) {
            return Err(PbxError::Geometry(
                ErrorInfo::new("replicas-zero", "replica counts must be positive")
                    .with_context("counts", format!("{counts:?}")),
            ));
        }
        Ok(counts)
    }
}

impl From<u32> for ReplicaCount {
    fn from(value: u32) -> Self {
        ReplicaCount::Uniform(value)
    }
}

impl From<[u32; 3]> for ReplicaCount {
    fn from(value: [u32; 3]) -> Self {
        ReplicaCount::PerAxis(value)
    }
}

impl From<(u32, u32, u32)> for ReplicaCount {
    fn from((nx, ny, nz): (u32, u32, u32)) -> Self {
        ReplicaCount::PerAxis([nx, ny, nz])
    }
}
