//! Batch configuration
//!
//! `BatchConfig` is built once, from defaults, an optional TOML file and
//! the command line (in increasing precedence), validated, and then
//! passed by value to the run.
//!
//! File layout (every key optional):
//!
//! ```toml
//! input = "data/input"
//! output = "data/output"
//! scene = "LC08_20240601"
//! indices = ["NDVI", "EVI"]
//! workers = 4
//! log_dir = "logs"
//! compression = "deflate"
//! progress = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::batch::errors::{BatchError, BatchResult};
use crate::compression::COMPRESSION_NAMES;
use crate::indices::{IndexKind, INDEX_TABLE};

/// Settings of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Process only this scene instead of every subdirectory
    pub scene: Option<String>,
    pub indices: Vec<IndexKind>,
    /// Worker threads; `None` uses the available parallelism
    pub workers: Option<usize>,
    pub log_dir: PathBuf,
    /// Output compression name
    pub compression: String,
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            input_root: PathBuf::from("data/input"),
            output_root: PathBuf::from("data/output"),
            scene: None,
            indices: IndexKind::ALL.to_vec(),
            workers: None,
            log_dir: PathBuf::from("logs"),
            compression: "deflate".to_string(),
            show_progress: true,
        }
    }
}

impl BatchConfig {
    /// Defaults overridden by the keys of a TOML document
    pub fn from_toml_str(content: &str) -> BatchResult<Self> {
        let value: toml::Value = content
            .parse()
            .map_err(|e| BatchError::ConfigError(format!("Failed to parse TOML: {}", e)))?;

        let mut config = BatchConfig::default();
        config.apply_toml(&value)?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> BatchResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BatchError::ConfigError(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    fn apply_toml(&mut self, value: &toml::Value) -> BatchResult<()> {
        if let Some(input) = string_key(value, "input")? {
            self.input_root = PathBuf::from(input);
        }
        if let Some(output) = string_key(value, "output")? {
            self.output_root = PathBuf::from(output);
        }
        if let Some(scene) = string_key(value, "scene")? {
            self.scene = Some(scene);
        }
        if let Some(log_dir) = string_key(value, "log_dir")? {
            self.log_dir = PathBuf::from(log_dir);
        }
        if let Some(compression) = string_key(value, "compression")? {
            self.compression = compression;
        }

        if let Some(workers) = value.get("workers") {
            let count = workers
                .as_integer()
                .filter(|n| *n >= 0)
                .ok_or_else(|| BatchError::ConfigError("'workers' must be a non-negative integer".to_string()))?;
            self.workers = Some(count as usize);
        }

        if let Some(progress) = value.get("progress") {
            self.show_progress = progress
                .as_bool()
                .ok_or_else(|| BatchError::ConfigError("'progress' must be a boolean".to_string()))?;
        }

        if let Some(indices) = value.get("indices") {
            let names = indices
                .as_array()
                .and_then(|items| items.iter().map(|v| v.as_str().map(str::to_string)).collect::<Option<Vec<_>>>())
                .ok_or_else(|| BatchError::ConfigError("'indices' must be a list of names".to_string()))?;
            self.indices = parse_indices(&names)?;
        }

        Ok(())
    }

    /// Reject settings the run cannot start with
    pub fn validate(&self) -> BatchResult<()> {
        if !self.input_root.is_dir() {
            return Err(BatchError::ConfigError(format!(
                "Input root {} is not a directory", self.input_root.display())));
        }
        if self.indices.is_empty() {
            return Err(BatchError::ConfigError("No index selected".to_string()));
        }
        if self.workers == Some(0) {
            return Err(BatchError::ConfigError("Worker count must be at least 1".to_string()));
        }
        if !COMPRESSION_NAMES.contains(&self.compression.to_lowercase().as_str()) {
            return Err(BatchError::ConfigError(format!(
                "Unknown compression '{}', expected one of: {}",
                self.compression, COMPRESSION_NAMES.join(", "))));
        }
        if let Some(scene) = &self.scene {
            if scene.is_empty() || Path::new(scene).components().count() != 1 {
                return Err(BatchError::ConfigError(format!("Invalid scene name '{}'", scene)));
            }
        }
        Ok(())
    }

    /// Worker threads to run with
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        })
    }
}

fn string_key(value: &toml::Value, key: &str) -> BatchResult<Option<String>> {
    match value.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| BatchError::ConfigError(format!("'{}' must be a string", key))),
    }
}

/// Resolve index names, keeping table order and dropping duplicates
pub fn parse_indices<S: AsRef<str>>(names: &[S]) -> BatchResult<Vec<IndexKind>> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind = IndexKind::from_name(name.as_ref()).ok_or_else(|| {
            let known: Vec<&str> = INDEX_TABLE.iter().map(|spec| spec.name).collect();
            BatchError::ConfigError(format!(
                "Unknown index '{}', expected one of: {}", name.as_ref(), known.join(", ")))
        })?;
        kinds.push(kind);
    }
    kinds.sort();
    kinds.dedup();
    Ok(kinds)
}
