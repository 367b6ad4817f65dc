//! CLI command implementations
//!
//! This module contains implementations of the commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod inspect_command;
pub mod list_indices_command;
pub mod process_command;

pub use command_traits::{Command, CommandFactory};
pub use inspect_command::InspectCommand;
pub use list_indices_command::ListIndicesCommand;
pub use process_command::ProcessCommand;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use crate::batch::errors::BatchResult;

/// Command-line definition of the `spectrakit` binary
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("spectrakit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compute spectral indices for batches of multi-band GeoTIFF scenes")
        .arg(
            Arg::new("scene")
                .long("scene")
                .help("Process only this scene folder")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("input")
                .long("input")
                .help("Input folder containing one folder per scene [default: data/input]")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .help("Output folder for index rasters and the summary [default: data/output]")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("indices")
                .long("indices")
                .help("Indices to compute (NDVI SAVI EVI ARVI NBR NBWI NDBI GCI); all if omitted")
                .value_name("NAME")
                .num_args(1..)
                .action(ArgAction::Append)
                .required(false),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .help("Worker threads for multi-scene runs [default: available cores]")
                .value_name("N")
                .required(false),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .help("Folder for run logs [default: logs]")
                .value_name("DIR")
                .required(false),
        )
        .arg(
            Arg::new("compression")
                .long("compression")
                .help("Compression of index rasters (none, deflate, zstd) [default: deflate]")
                .value_name("NAME")
                .required(false),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with run settings; command-line values take precedence")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Do not draw the progress bar")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-indices")
                .long("list-indices")
                .help("List supported indices and the bands they need")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inspect")
                .long("inspect")
                .help("Print the profile of a band file")
                .value_name("FILE")
                .required(false),
        )
}

/// Factory for creating command instances based on CLI arguments
pub struct SpectrakitCommandFactory;

impl SpectrakitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        SpectrakitCommandFactory
    }
}

impl Default for SpectrakitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for SpectrakitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> BatchResult<Box<dyn Command>> {
        if args.get_flag("list-indices") {
            Ok(Box::new(ListIndicesCommand))
        } else if args.contains_id("inspect") {
            Ok(Box::new(InspectCommand::new(args)?))
        } else {
            // Default to the batch run
            Ok(Box::new(ProcessCommand::new(args)?))
        }
    }
}
