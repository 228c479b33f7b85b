use nalgebra::Vector3;
use ndarray::Array2;
use pbx_array::convert_points;
use pbx_box::PeriodicBox;
use pbx_core::errors::{ErrorInfo, PbxError};
use pbx_core::provenance::SystemProvenance;
use pbx_core::rng::RngHandle;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cell::UnitCell;
use crate::replicas::ReplicaCount;

/// Parameters of [`UnitCell::to_system`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Replicas along each lattice vector.
    #[serde(default)]
    pub num_replicas: ReplicaCount,
    /// Uniform linear scale applied to the lattice and the positions.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Standard deviation of the Gaussian positional noise (0 disables it).
    #[serde(default)]
    pub sigma_noise: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            num_replicas: ReplicaCount::default(),
            scale: default_scale(),
            sigma_noise: 0.0,
        }
    }
}

impl GenerateOptions {
    /// Options with the given replica count and default scale and noise.
    pub fn replicas(num_replicas: impl Into<ReplicaCount>) -> Self {
        Self {
            num_replicas: num_replicas.into(),
            ..Self::default()
        }
    }

    /// Sets the scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the noise standard deviation.
    pub fn with_sigma_noise(mut self, sigma_noise: f64) -> Self {
        self.sigma_noise = sigma_noise;
        self
    }

    fn validate(&self) -> Result<(), PbxError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PbxError::Geometry(
                ErrorInfo::new("scale-invalid", "scale must be finite and positive")
                    .with_context("scale", self.scale.to_string()),
            ));
        }
        if !self.sigma_noise.is_finite() {
            return Err(PbxError::Geometry(
                ErrorInfo::new("sigma-invalid", "sigma_noise must be finite")
                    .with_context("sigma_noise", self.sigma_noise.to_string()),
            ));
        }
        Ok(())
    }
}

/// Replicated periodic particle system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSystem {
    /// Box enclosing every replica.
    #[serde(rename = "box")]
    pub sim_box: PeriodicBox,
    /// Positions ordered by replica cell (x outermost), then basis site.
    pub positions: Vec<Vector3<f64>>,
    /// How the system was produced.
    pub provenance: SystemProvenance,
}

impl GeneratedSystem {
    /// Number of particles.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the system has no particles.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions as a canonical `N x 3` `f32` array.
    pub fn positions_array(&self) -> Result<Array2<f32>, PbxError> {
        let raw: Vec<[f64; 3]> = self.positions.iter().map(|p| [p.x, p.y, p.z]).collect();
        convert_points(&raw)
    }

    /// Splits the system into its box and positions.
    pub fn into_parts(self) -> (PeriodicBox, Vec<Vector3<f64>>) {
        (self.sim_box, self.positions)
    }
}

impl UnitCell {
    /// Tiles the cell into a periodic system.
    ///
    /// Basis site `b` of replica `(i, j, k)` sits at fractional coordinate
    /// `b + (i, j, k)`. Every coordinate is shifted by `-1/2`, scaled, and
    /// mapped through this cell's lattice, which centers the tiled lattice on
    /// the origin (a single replica is shifted by half a lattice vector too).
    /// The returned box is the lattice scaled by `scale` and by the replica
    /// counts. With non-zero `sigma_noise`, each position receives an
    /// independent Gaussian displacement (none along z for 2D cells) and is
    /// wrapped back into the returned box.
    pub fn to_system(
        &self,
        options: &GenerateOptions,
        rng: &mut RngHandle,
    ) -> Result<GeneratedSystem, PbxError> {
        let counts = options.num_replicas.resolve(self.sim_box().is_2d())?;
        options.validate()?;
        let total = particle_count(counts, self.num_basis())?;
        let sim_box = self.sim_box().scaled(options.scale)?.replicated(counts)?;
        let [nx, ny, nz] = counts;
        debug!(
            nx,
            ny,
            nz,
            basis = self.num_basis(),
            scale = options.scale,
            "replicating unit cell"
        );

        let shift = Vector3::repeat(0.5);
        let mut positions: Vec<Vector3<f64>> = Vec::new();
        positions.try_reserve_exact(total).map_err(|err| {
            PbxError::Geometry(
                ErrorInfo::new("replicas-too-many", err.to_string())
                    .with_context("particles", total.to_string()),
            )
        })?;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let offset = Vector3::new(i as f64, j as f64, k as f64);
                    for site in self.basis_positions() {
                        let fractional = (site + offset - shift) * options.scale;
                        positions.push(self.sim_box().make_absolute(&fractional));
                    }
                }
            }
        }

        if options.sigma_noise != 0.0 {
            add_noise(
                &mut positions,
                &sim_box,
                options.sigma_noise,
                self.sim_box().is_2d(),
                rng,
            )?;
        }

        let provenance = SystemProvenance {
            replicas: counts,
            scale: options.scale,
            sigma_noise: options.sigma_noise,
            tool_versions: [("pbx-data".to_string(), env!("CARGO_PKG_VERSION").to_string())]
                .into_iter()
                .collect(),
            ..SystemProvenance::default()
        };
        Ok(GeneratedSystem {
            sim_box,
            positions,
            provenance,
        })
    }
}

/// Upper bound on the number of particles a single call may generate.
pub const MAX_PARTICLES: usize = 1 << 30;

fn particle_count(counts: [u32; 3], num_basis: usize) -> Result<usize, PbxError> {
    let total = counts
        .iter()
        .try_fold(num_basis, |acc, &n| acc.checked_mul(n as usize));
    match total {
        Some(total) if total <= MAX_PARTICLES => Ok(total),
        _ => Err(PbxError::Geometry(
            ErrorInfo::new(
                "replicas-too-many",
                format!("replicated system would exceed {MAX_PARTICLES} particles"),
            )
            .with_context("counts", format!("{counts:?}"))
            .with_context("basis", num_basis.to_string()),
        )),
    }
}

fn add_noise(
    positions: &mut [Vector3<f64>],
    sim_box: &PeriodicBox,
    sigma: f64,
    is_2d: bool,
    rng: &mut RngHandle,
) -> Result<(), PbxError> {
    let normal = Normal::new(0.0, sigma.abs()).map_err(|err| {
        PbxError::Rng(
            ErrorInfo::new("noise-distribution", err.to_string())
                .with_context("sigma_noise", sigma.to_string()),
        )
    })?;
    debug!(sigma, particles = positions.len(), "adding positional noise");
    for position in positions.iter_mut() {
        let dx = normal.sample(rng);
        let dy = normal.sample(rng);
        let dz = if is_2d { 0.0 } else { normal.sample(rng) };
        let displaced = *position + Vector3::new(dx, dy, dz);
        *position = sim_box.wrap(&displaced);
    }
    Ok(())
}

/// Generates a system with a fresh RNG seeded from `seed`.
///
/// The seed is recorded in the provenance, so the same cell, options and seed
/// always reproduce the same system.
pub fn generate_system(
    cell: &UnitCell,
    options: &GenerateOptions,
    seed: u64,
) -> Result<GeneratedSystem, PbxError> {
    let mut rng = RngHandle::from_seed(seed);
    let mut system = cell.to_system(options, &mut rng)?;
    system.provenance.seed = Some(seed);
    Ok(system)
}

/// Generates a system whose noise is drawn from substream `stream` of
/// `master_seed`.
///
/// Independent samples of one ensemble share a master seed and differ only in
/// their stream. Both values are recorded in the provenance.
pub fn generate_system_stream(
    cell: &UnitCell,
    options: &GenerateOptions,
    master_seed: u64,
    stream: u64,
) -> Result<GeneratedSystem, PbxError> {
    let mut rng = RngHandle::substream(master_seed, stream);
    debug!(master_seed, stream, derived = rng.seed(), "using noise substream");
    let mut system = cell.to_system(options, &mut rng)?;
    system.provenance.seed = Some(master_seed);
    system.provenance.stream = Some(stream);
    Ok(system)
}
