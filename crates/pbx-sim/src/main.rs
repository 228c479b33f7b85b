use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    box_cmd::{self, BoxArgs},
    cell::{self, CellArgs},
    generate::{self, GenerateArgs},
    version::{self, VersionArgs},
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "pbx-sim", about = "Periodic boxes and replicated crystal systems")]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `debug`, `pbx_data=trace`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a system from a YAML or JSON run configuration.
    Generate(GenerateArgs),
    /// Replicate a named or custom unit cell directly from flags.
    Cell(CellArgs),
    /// Canonicalize a box-like JSON value and describe the resulting box.
    Box(BoxArgs),
    /// Print the tool version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Cell(args) => cell::run(&args),
        Command::Box(args) => box_cmd::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
