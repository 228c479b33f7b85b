use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use pbx_data::{OutputFormat, RunConfig};
use tracing::info;

use super::{emit_system, parse_format};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Run configuration (`.json`, otherwise parsed as YAML).
    #[arg(long)]
    pub config: PathBuf,
    /// Output file; the system is printed to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Overrides the configured output format (`json` or `xyz`).
    #[arg(long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,
    /// Overrides the configured seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Overrides the configured noise substream.
    #[arg(long)]
    pub stream: Option<u64>,
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let mut config = RunConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.stream.is_some() {
        config.stream = args.stream;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    info!(config = %args.config.display(), "loaded run configuration");
    let system = config.run()?;
    emit_system(
        &system,
        args.out.as_deref(),
        config.output.format,
        &config.output.element,
    )
}
