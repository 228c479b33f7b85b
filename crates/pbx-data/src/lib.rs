#![deny(missing_docs)]

//! Crystal unit cells and replicated sample systems.
//!
//! A [`UnitCell`] pairs a lattice with a fractional basis. [`UnitCell::to_system`]
//! tiles it into a [`GeneratedSystem`] centered on the origin, optionally
//! perturbed by Gaussian noise drawn from a seeded
//! [`RngHandle`](pbx_core::RngHandle).

mod cell;
pub mod config;
mod generate;
mod hash;
pub mod io;
mod replicas;

pub use cell::UnitCell;
pub use config::{CellConfig, CellKind, OutputConfig, RunConfig};
pub use generate::{
    generate_system, generate_system_stream, GenerateOptions, GeneratedSystem, MAX_PARTICLES,
};
pub use hash::canonical_hash;
pub use io::{system_from_json, system_to_json, write_system, write_xyz, OutputFormat};
pub use replicas::ReplicaCount;
