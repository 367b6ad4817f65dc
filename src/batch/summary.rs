//! Summary report
//!
//! One CSV row per processed scene, in completion order. Index cells are
//! `true`/`false` for attempted indices and empty for the others.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::batch::errors::BatchResult;
use crate::indices::IndexKind;
use crate::scene::SceneResult;

/// Collects scene results and writes them once
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Vec<SceneResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: SceneResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[SceneResult] {
        &self.results
    }

    /// Column names of the report
    pub fn header() -> Vec<&'static str> {
        let mut header = vec!["scene"];
        header.extend(IndexKind::ALL.iter().map(|kind| kind.name()));
        header.push("time_sec");
        header
    }

    fn row(result: &SceneResult) -> Vec<String> {
        let mut row = Vec::with_capacity(IndexKind::ALL.len() + 2);
        row.push(result.scene.clone());
        for kind in IndexKind::ALL {
            row.push(match result.succeeded(kind) {
                Some(true) => "true".to_string(),
                Some(false) => "false".to_string(),
                None => String::new(),
            });
        }
        row.push(format!("{:.2}", result.elapsed_secs));
        row
    }

    /// Write `summary_<run_stamp>.csv` into `output_root`. An existing
    /// summary is never replaced: the name gets a `_1`, `_2`, ... suffix.
    pub fn write(self, output_root: &Path, run_stamp: &str) -> BatchResult<PathBuf> {
        fs::create_dir_all(output_root)?;
        let (path, file) = Self::create_unique(output_root, run_stamp)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(Self::header())?;
        for result in &self.results {
            writer.write_record(Self::row(result))?;
        }
        writer.flush()?;

        Ok(path)
    }

    fn create_unique(output_root: &Path, run_stamp: &str) -> BatchResult<(PathBuf, File)> {
        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => format!("summary_{}.csv", run_stamp),
                n => format!("summary_{}_{}.csv", run_stamp, n),
            };
            let path = output_root.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
