use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use pbx_box::BoxLike;
use pbx_data::{
    generate_system, generate_system_stream, CellConfig, CellKind, GenerateOptions, OutputFormat,
    ReplicaCount,
};

use super::{emit_system, parse_format};

#[derive(Args, Debug)]
pub struct CellArgs {
    /// Cell kind: fcc, bcc, sc, square or custom.
    #[arg(value_parser = parse_kind)]
    pub kind: CellKind,
    /// Replicas along every axis (z stays 1 for 2D cells).
    #[arg(long, conflicts_with = "per_axis")]
    pub replicas: Option<u32>,
    /// Replicas per axis as `NX,NY,NZ`.
    #[arg(long, value_parser = parse_per_axis)]
    pub per_axis: Option<[u32; 3]>,
    /// Linear scale factor.
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
    /// Standard deviation of the positional noise.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub sigma: f64,
    /// Seed of the noise RNG.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Draw the noise from this substream of `--seed`.
    #[arg(long)]
    pub stream: Option<u64>,
    /// Box-like JSON value for custom cells, e.g. `[2, 3, 4]`.
    #[arg(long = "box")]
    pub sim_box: Option<String>,
    /// Fractional basis of a custom cell as JSON, e.g. `[[0,0,0],[0.5,0.5,0.5]]`.
    #[arg(long)]
    pub basis: Option<String>,
    /// Output format (`json` or `xyz`).
    #[arg(long, value_parser = parse_format, default_value = "json")]
    pub format: OutputFormat,
    /// Element label for XYZ output.
    #[arg(long, default_value = "A")]
    pub element: String,
    /// Output file; the system is printed to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

fn parse_kind(value: &str) -> Result<CellKind, String> {
    value.parse().map_err(|err: pbx_core::PbxError| err.to_string())
}

fn parse_per_axis(value: &str) -> Result<[u32; 3], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<u32>().map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    <[u32; 3]>::try_from(parts)
        .map_err(|parts| format!("expected NX,NY,NZ, got {} values", parts.len()))
}

pub fn run(args: &CellArgs) -> Result<(), Box<dyn Error>> {
    let sim_box: Option<BoxLike> = args
        .sim_box
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    let basis: Option<Vec<[f64; 3]>> = args
        .basis
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;
    let cell = CellConfig {
        kind: args.kind,
        sim_box,
        basis,
    }
    .build()?;

    let num_replicas = match (args.replicas, args.per_axis) {
        (_, Some(counts)) => ReplicaCount::PerAxis(counts),
        (Some(n), None) => ReplicaCount::Uniform(n),
        (None, None) => ReplicaCount::default(),
    };
    let options = GenerateOptions {
        num_replicas,
        scale: args.scale,
        sigma_noise: args.sigma,
    };
    let system = match args.stream {
        Some(stream) => generate_system_stream(&cell, &options, args.seed, stream)?,
        None => generate_system(&cell, &options, args.seed)?,
    };
    emit_system(&system, args.out.as_deref(), args.format, &args.element)
}
