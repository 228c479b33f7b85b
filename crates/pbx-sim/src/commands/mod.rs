pub mod box_cmd;
pub mod cell;
pub mod generate;
pub mod version;

use std::error::Error;
use std::io::{self, Write};
use std::path::Path;

use pbx_data::{
    canonical_hash, system_to_json, write_system, write_xyz, GeneratedSystem, OutputFormat,
};
use serde_json::json;

pub(crate) fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse().map_err(|err: pbx_core::PbxError| err.to_string())
}

/// Writes the system to `out`, or to stdout when no path is given.
///
/// With an output path a short JSON summary is printed instead.
pub(crate) fn emit_system(
    system: &GeneratedSystem,
    out: Option<&Path>,
    format: OutputFormat,
    element: &str,
) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            write_system(system, path, format, element)?;
            let summary = json!({
                "path": path.display().to_string(),
                "format": format,
                "particles": system.len(),
                "dimensions": system.sim_box.dimensions(),
                "hash": canonical_hash(system),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            match format {
                OutputFormat::Json => writeln!(handle, "{}", system_to_json(system)?)?,
                OutputFormat::Xyz => write_xyz(system, &mut handle, element)?,
            }
            handle.flush()?;
        }
    }
    Ok(())
}
