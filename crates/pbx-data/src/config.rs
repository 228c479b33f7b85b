//! YAML and JSON run configuration: which cell to build, how to replicate it and
//! where the result goes.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use pbx_box::BoxLike;
use pbx_core::errors::{ErrorInfo, PbxError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cell::UnitCell;
use crate::generate::{generate_system, generate_system_stream, GenerateOptions, GeneratedSystem};
use crate::io::OutputFormat;

/// File-configurable description of a generation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Unit cell to replicate.
    #[serde(default)]
    pub cell: CellConfig,
    /// Replication parameters.
    #[serde(default)]
    pub generate: GenerateOptions,
    /// Seed of the noise RNG.
    #[serde(default)]
    pub seed: u64,
    /// Draw the noise from this substream of `seed` instead of `seed` itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<u64>,
    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Named unit cell kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellKind {
    /// Face-centered cubic.
    Fcc,
    /// Body-centered cubic.
    Bcc,
    /// Simple cubic.
    #[default]
    Sc,
    /// Two-dimensional square.
    Square,
    /// User-supplied box and basis.
    Custom,
}

impl FromStr for CellKind {
    type Err = PbxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fcc" => Ok(CellKind::Fcc),
            "bcc" => Ok(CellKind::Bcc),
            "sc" => Ok(CellKind::Sc),
            "square" => Ok(CellKind::Square),
            "custom" => Ok(CellKind::Custom),
            other => Err(PbxError::Geometry(
                ErrorInfo::new("unknown-cell", format!("unknown cell kind '{other}'"))
                    .with_hint("expected one of: fcc, bcc, sc, square, custom"),
            )),
        }
    }
}

/// Unit cell section of a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellConfig {
    /// Which cell to build.
    #[serde(default)]
    pub kind: CellKind,
    /// Lattice of a custom cell, in any box-like form.
    #[serde(default, rename = "box", skip_serializing_if = "Option::is_none")]
    pub sim_box: Option<BoxLike>,
    /// Fractional basis of a custom cell; defaults to a single site at the origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis: Option<Vec<[f64; 3]>>,
}

impl CellConfig {
    /// Builds the configured unit cell.
    pub fn build(&self) -> Result<UnitCell, PbxError> {
        if self.kind != CellKind::Custom && (self.sim_box.is_some() || self.basis.is_some()) {
            return Err(PbxError::Geometry(
                ErrorInfo::new(
                    "cell-overspecified",
                    "box and basis are only accepted for custom cells",
                )
                .with_context("kind", format!("{:?}", self.kind)),
            ));
        }
        match self.kind {
            CellKind::Fcc => Ok(UnitCell::fcc()),
            CellKind::Bcc => Ok(UnitCell::bcc()),
            CellKind::Sc => Ok(UnitCell::sc()),
            CellKind::Square => Ok(UnitCell::square()),
            CellKind::Custom => {
                let Some(sim_box) = self.sim_box else {
                    return Err(PbxError::Geometry(
                        ErrorInfo::new("cell-missing-box", "custom cells require a box")
                            .with_hint("add a `box` entry under `cell`"),
                    ));
                };
                let basis = self.basis.clone().unwrap_or_else(|| vec![[0.0; 3]]);
                UnitCell::new(sim_box, basis)
            }
        }
    }
}

/// Output section of a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Serialization format.
    #[serde(default)]
    pub format: OutputFormat,
    /// Element label used for XYZ output.
    #[serde(default = "default_element")]
    pub element: String,
}

fn default_element() -> String {
    "A".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            element: default_element(),
        }
    }
}

impl RunConfig {
    /// Loads a configuration file, JSON when the extension is `.json` and YAML otherwise.
    pub fn load(path: &Path) -> Result<Self, PbxError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            PbxError::from(err).with_context("path", path.display().to_string())
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Parses a YAML configuration.
    pub fn from_yaml_str(contents: &str) -> Result<Self, PbxError> {
        serde_yaml::from_str(contents)
            .map_err(|err| PbxError::Serde(ErrorInfo::new("deserialize-yaml", err.to_string())))
    }

    /// Parses a JSON configuration.
    pub fn from_json_str(contents: &str) -> Result<Self, PbxError> {
        serde_json::from_str(contents)
            .map_err(|err| PbxError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))
    }

    /// Serializes the configuration as YAML.
    pub fn to_yaml_string(&self) -> Result<String, PbxError> {
        serde_yaml::to_string(self)
            .map_err(|err| PbxError::Serde(ErrorInfo::new("serialize-yaml", err.to_string())))
    }

    /// Builds the cell and generates the system.
    pub fn run(&self) -> Result<GeneratedSystem, PbxError> {
        let cell = self.cell.build()?;
        info!(kind = ?self.cell.kind, seed = self.seed, stream = ?self.stream, "generating system");
        match self.stream {
            Some(stream) => generate_system_stream(&cell, &self.generate, self.seed, stream),
            None => generate_system(&cell, &self.generate, self.seed),
        }
    }
}
