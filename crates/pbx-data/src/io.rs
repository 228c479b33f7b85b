//! Writers and readers for generated systems: pretty JSON and extended XYZ.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use pbx_core::errors::{ErrorInfo, PbxError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::generate::GeneratedSystem;

/// On-disk representation of a generated system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON including provenance.
    #[default]
    Json,
    /// Extended XYZ with the lattice in the comment line.
    Xyz,
}

impl OutputFormat {
    /// Conventional file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Xyz => "xyz",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PbxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "xyz" => Ok(OutputFormat::Xyz),
            other => Err(PbxError::Serde(
                ErrorInfo::new("unknown-format", format!("unsupported output format '{other}'"))
                    .with_hint("expected one of: json, xyz"),
            )),
        }
    }
}

/// Serializes the system to a pretty JSON string.
pub fn system_to_json(system: &GeneratedSystem) -> Result<String, PbxError> {
    serde_json::to_string_pretty(system)
        .map_err(|err| PbxError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a system from a JSON string.
pub fn system_from_json(json: &str) -> Result<GeneratedSystem, PbxError> {
    serde_json::from_str(json)
        .map_err(|err| PbxError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))
}

/// Writes the system as extended XYZ, labelling every particle with `element`.
///
/// The comment line carries the lattice vectors (row by row) and the
/// periodic flags so that readers such as ASE can rebuild the box.
pub fn write_xyz<W: Write>(
    system: &GeneratedSystem,
    writer: &mut W,
    element: &str,
) -> Result<(), PbxError> {
    let [a1, a2, a3] = system.sim_box.lattice_vectors();
    let lattice = [a1, a2, a3]
        .iter()
        .flat_map(|v| v.iter().copied())
        // adding 0.0 turns -0.0 into 0.0
        .map(|value| format!("{:.6}", value + 0.0))
        .collect::<Vec<_>>()
        .join(" ");
    let pbc = system
        .sim_box
        .periodic()
        .iter()
        .map(|&flag| if flag { "T" } else { "F" })
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{}", system.len())?;
    writeln!(
        writer,
        "Lattice=\"{lattice}\" Properties=species:S:1:pos:R:3 pbc=\"{pbc}\""
    )?;
    for p in &system.positions {
        writeln!(writer, "{} {:.6} {:.6} {:.6}", element, p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Writes the system to `path` in the requested format, creating parent directories.
pub fn write_system(
    system: &GeneratedSystem,
    path: &Path,
    format: OutputFormat,
    element: &str,
) -> Result<(), PbxError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    match format {
        OutputFormat::Json => fs::write(path, system_to_json(system)?)?,
        OutputFormat::Xyz => {
            let mut file = BufWriter::new(File::create(path)?);
            write_xyz(system, &mut file, element)?;
            file.flush()?;
        }
    }
    info!(path = %path.display(), particles = system.len(), ?format, "wrote system");
    Ok(())
}
