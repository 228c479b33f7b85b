use pbx_box::PeriodicBox;
use sha2::{Digest, Sha256};

use crate::generate::GeneratedSystem;

/// Computes the canonical hash of a generated system.
///
/// The digest covers the box parameters, the periodic flags and every
/// position in order. Floats are hashed by their bit patterns, so two systems
/// share a hash exactly when they are bitwise identical. Provenance is not
/// part of the hash.
pub fn canonical_hash(system: &GeneratedSystem) -> String {
    let mut hasher = Sha256::new();
    encode_box(&system.sim_box, &mut hasher);
    hasher.update((system.positions.len() as u64).to_le_bytes());
    for position in &system.positions {
        for value in position.iter() {
            hasher.update(value.to_bits().to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}

fn encode_box(sim_box: &PeriodicBox, hasher: &mut Sha256) {
    if sim_box.is_2d() {
        hasher.update(b"box:2d");
    } else {
        hasher.update(b"box:3d");
    }
    let lengths = sim_box.lengths();
    for value in lengths.iter().chain(sim_box.tilts().iter()) {
        hasher.update(value.to_bits().to_le_bytes());
    }
    for flag in sim_box.periodic() {
        hasher.update([u8::from(flag)]);
    }
}
