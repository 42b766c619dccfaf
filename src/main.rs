use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod docker;
mod mpi;
mod recipe;
mod scheduler;
mod utils;

use commands::batch::handle_batch;
use commands::make::{handle_make, MakeArgs};
use commands::targets::handle_targets;
use config::Settings;

fn main() -> Result<()> {
    let Cli { debug, command } = Cli::parse();

    utils::set_debug_mode(debug);
    let settings = Settings::load(debug)?;

    if settings.debug {
        utils::print_debug(&format!("Settings: {:#?}", settings));
    }

    run_command(command, &settings)
}

fn run_command(command: Command, settings: &Settings) -> Result<()> {
    match command {
        Command::Make(args) => handle_make(&args, settings),
        Command::Targets => handle_targets(settings),
        Command::Batch => handle_batch(settings),
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Make Docker images for various MPI implementations",
    long_about = "Generate Dockerfiles and sample SLURM batch files for building the \
yandasoft imaging stack across machine and MPI targets.

The target matrix, source branch and library versions are read from an optional \
`yandagen` config file (working directory or user config directory) and \
YANDAGEN_* environment variables."
)]
struct Cli {
    #[arg(short, long, help = "Enable debug mode with verbose output")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Generate Dockerfiles and optionally build the images", alias = "mk")]
    Make(MakeArgs),
    #[command(about = "Show the configured build targets", alias = "ls")]
    Targets,
    #[command(about = "Write sample SLURM batch files for the generic targets")]
    Batch,
}
