//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application.

use crate::batch::errors::BatchResult;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    fn execute(&self) -> BatchResult<()>;
}

/// Factory for creating commands from CLI arguments
///
/// Argument problems are reported when the command is created, so a
/// command that exists is ready to run.
pub trait CommandFactory {
    /// Create a new Command instance based on CLI arguments
    fn create_command(&self, args: &clap::ArgMatches) -> BatchResult<Box<dyn Command>>;
}
