use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::units::VolumeUnit;

#[derive(Debug, Parser)]
/// Splits models that are too large for a printer into a tree of parts.
pub struct Args {
    #[arg(short, long, action = clap::ArgAction::Count)]
    /// Log more. Pass twice to also log tracing output.
    pub verbose: u8,

    #[arg(long)]
    /// Directory holding config.toml. Defaults to the platform config dir.
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the bounds, display offset, volume and mass of a model.
    Inspect {
        /// Path to a .stl or .obj file.
        mesh: PathBuf,

        #[command(flatten)]
        part: PartArgs,
    },
    /// Repeatedly split a model and print the resulting provenance tree.
    Split {
        /// Path to a .stl or .obj file.
        mesh: PathBuf,

        #[arg(short, long, default_value_t = 1)]
        /// Number of times every open part gets split.
        generations: u32,
        #[arg(long)]
        /// Force cuts perpendicular to this axis (x, y or z).
        axis: Option<String>,
        #[arg(long)]
        /// Base url of the split service, overrides the config file.
        server: Option<String>,
        #[arg(long)]
        /// Printer id to assign to the model.
        printer: Option<String>,
        #[arg(long)]
        /// Ask the service to add alignment keys to cut faces.
        add_keys: bool,
        #[arg(long)]
        /// Run a print failure analysis on every final part.
        analyze: bool,
        #[arg(long, default_value_t = 600)]
        /// Seconds to wait for each round of server requests.
        timeout: u64,

        #[command(flatten)]
        part: PartArgs,
    },
    /// List the printers in the catalog.
    Printers {
        #[arg(long)]
        /// Ask the split service for its printers instead.
        remote: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct PartArgs {
    #[arg(long)]
    /// Material id used for the mass estimate.
    pub material: Option<String>,
    #[arg(long)]
    /// Infill percentage used for the mass estimate.
    pub infill: Option<i32>,
    #[arg(long)]
    /// Unit to print volumes in (mm, cm or m).
    pub unit: Option<VolumeUnit>,
}
