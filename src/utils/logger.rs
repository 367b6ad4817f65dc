//! Per-run log
//!
//! `RunLog` is the append-only record of one batch run. Every entry is
//! written to the run's log file as `<timestamp> — <LEVEL> — <message>`
//! and mirrored to the `log` facade so the console backend sees it too.
//! The sink is shared between worker threads behind a `Mutex`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use log::Level;

/// Timestamp format of the run stamp used in file names
const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp format of log lines
const LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

enum Sink {
    File(File),
    Memory(Vec<String>),
}

/// Log of a single batch run
pub struct RunLog {
    run_stamp: String,
    path: Option<PathBuf>,
    sink: Mutex<Sink>,
}

impl RunLog {
    /// Open `batch_run_<stamp>.log` in `log_dir`, creating the directory
    pub fn create(log_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let run_stamp = Local::now().format(RUN_STAMP_FORMAT).to_string();
        let path = log_dir.join(format!("batch_run_{}.log", run_stamp));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(RunLog {
            run_stamp,
            path: Some(path),
            sink: Mutex::new(Sink::File(file)),
        })
    }

    /// Log that keeps its lines in memory, for tests and dry runs
    pub fn in_memory() -> Self {
        RunLog {
            run_stamp: Local::now().format(RUN_STAMP_FORMAT).to_string(),
            path: None,
            sink: Mutex::new(Sink::Memory(Vec::new())),
        }
    }

    /// `YYYYmmdd_HHMMSS` stamp of the run start
    pub fn run_stamp(&self) -> &str {
        &self.run_stamp
    }

    /// Log file path, if the log is file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    pub fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    fn record(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);

        let line = format!(
            "{} — {} — {}",
            Local::now().format(LINE_TIME_FORMAT),
            level,
            message
        );

        // A poisoned lock only means another thread panicked mid-write
        let mut sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &mut *sink {
            Sink::File(file) => {
                if let Err(e) = writeln!(file, "{}", line).and_then(|_| file.flush()) {
                    eprintln!("Failed to write run log: {}", e);
                }
            }
            Sink::Memory(lines) => lines.push(line),
        }
    }

    /// Lines captured so far by an in-memory log
    pub fn entries(&self) -> Vec<String> {
        let sink = match self.sink.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &*sink {
            Sink::Memory(lines) => lines.clone(),
            Sink::File(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_log_line_format() {
        let log = RunLog::in_memory();
        log.warn("[scene_a] Band B2 not found");

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with(" — WARN — [scene_a] Band B2 not found"));
        assert_eq!(log.run_stamp().len(), 15);
    }

    #[test]
    fn test_file_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::create(&dir.path().join("logs")).unwrap();
        log.info("first");
        log.error("second");

        let path = log.path().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("batch_run_") && name.ends_with(".log"));

        let text = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("— INFO — first"));
        assert!(lines[1].ends_with("— ERROR — second"));
    }
}
