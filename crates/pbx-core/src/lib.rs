#![deny(missing_docs)]
#![doc = "Core types shared by the pbx crates: the error taxonomy, the deterministic RNG handle and provenance descriptors."]

pub mod errors;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, PbxError};
pub use provenance::{SchemaVersion, SystemProvenance};
pub use rng::{derive_substream_seed, RngHandle};

/// Convenience alias used throughout the workspace.
pub type PbxResult<T> = Result<T, PbxError>;
