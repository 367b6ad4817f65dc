//! Batch processing command
//!
//! Builds the run configuration from an optional TOML file and the
//! command line, then runs the batch with a fresh run log.

use std::path::PathBuf;

use clap::ArgMatches;
use log::info;

use crate::batch::config::{parse_indices, BatchConfig};
use crate::batch::errors::{BatchError, BatchResult};
use crate::batch;
use crate::commands::command_traits::Command;
use crate::utils::logger::RunLog;

/// Command running the index batch
pub struct ProcessCommand {
    config: BatchConfig,
}

impl ProcessCommand {
    /// Create the command; the configuration is validated here
    pub fn new(args: &ArgMatches) -> BatchResult<Self> {
        let config = Self::build_config(args)?;
        config.validate()?;
        Ok(ProcessCommand { config })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    fn build_config(args: &ArgMatches) -> BatchResult<BatchConfig> {
        let mut config = match args.get_one::<String>("config") {
            Some(path) => BatchConfig::from_toml_file(&PathBuf::from(path))?,
            None => BatchConfig::default(),
        };

        if let Some(input) = args.get_one::<String>("input") {
            config.input_root = PathBuf::from(input);
        }
        if let Some(output) = args.get_one::<String>("output") {
            config.output_root = PathBuf::from(output);
        }
        if let Some(scene) = args.get_one::<String>("scene") {
            config.scene = Some(scene.clone());
        }
        if let Some(names) = args.get_many::<String>("indices") {
            let names: Vec<&String> = names.collect();
            config.indices = parse_indices(&names)?;
        }
        if let Some(workers) = args.get_one::<String>("workers") {
            let count = workers.parse::<usize>().map_err(|_| {
                BatchError::ConfigError(format!("Invalid worker count '{}'", workers))
            })?;
            config.workers = Some(count);
        }
        if let Some(log_dir) = args.get_one::<String>("log-dir") {
            config.log_dir = PathBuf::from(log_dir);
        }
        if let Some(compression) = args.get_one::<String>("compression") {
            config.compression = compression.clone();
        }
        if args.get_flag("no-progress") {
            config.show_progress = false;
        }

        Ok(config)
    }
}

impl Command for ProcessCommand {
    fn execute(&self) -> BatchResult<()> {
        let log = RunLog::create(&self.config.log_dir).map_err(|e| {
            BatchError::ConfigError(format!("Cannot open run log in {}: {}", self.config.log_dir.display(), e))
        })?;
        if let Some(path) = log.path() {
            info!("Run log: {}", path.display());
        }

        let report = batch::run(self.config.clone(), &log)?;
        println!("Processed {} scene(s); summary written to {}",
                 report.results.len(), report.summary_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;
    use crate::indices::IndexKind;

    #[test]
    fn test_cli_overrides_config_file() {
        let input = tempfile::tempdir().unwrap();
        let config_path = input.path().join("run.toml");
        std::fs::write(&config_path, "workers = 8\ncompression = \"zstd\"\nindices = [\"GCI\"]\n").unwrap();

        let input_arg = input.path().to_string_lossy().to_string();
        let config_arg = config_path.to_string_lossy().to_string();
        let args = build_cli().get_matches_from([
            "spectrakit", "--input", input_arg.as_str(), "--config", config_arg.as_str(),
            "--workers", "2", "--indices", "ndvi", "EVI", "--no-progress",
        ]);

        let command = ProcessCommand::new(&args).unwrap();
        let config = command.config();
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.compression, "zstd");
        assert_eq!(config.indices, vec![IndexKind::Ndvi, IndexKind::Evi]);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        let input = tempfile::tempdir().unwrap();
        let input_arg = input.path().to_string_lossy().to_string();

        let args = build_cli().get_matches_from(["spectrakit", "--input", input_arg.as_str(), "--workers", "0"]);
        assert!(ProcessCommand::new(&args).is_err());

        let args = build_cli().get_matches_from(["spectrakit", "--input", input_arg.as_str(), "--indices", "NDWI"]);
        assert!(ProcessCommand::new(&args).is_err());

        let args = build_cli().get_matches_from(["spectrakit", "--input", "/no/such/dir"]);
        assert!(ProcessCommand::new(&args).is_err());
    }
}
