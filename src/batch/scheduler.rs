//! Batch scheduling
//!
//! Runs the scene processor over the work set. A single scene runs on
//! the calling thread; several scenes run on a rayon pool, one task per
//! scene, and report back through a channel as they finish. A panic in
//! a scene is caught at the task boundary and the scene is left out of
//! the results.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc;

use log::debug;
use rayon::ThreadPoolBuilder;

use crate::batch::errors::BatchResult;
use crate::scene::{SceneProcessor, SceneResult};
use crate::utils::logger::RunLog;
use crate::utils::progress::ProgressTracker;

/// Scene directories to process: the named one, or every subdirectory
/// of `input_root` sorted by name
///
/// Only a failure to list `input_root` is an error. Entries that cannot
/// be read, or whose names are not UTF-8, are logged and skipped.
pub fn discover_scenes(input_root: &Path, scene: Option<&str>, log: &RunLog) -> BatchResult<Vec<String>> {
    if let Some(scene) = scene {
        return Ok(vec![scene.to_string()]);
    }

    let mut scenes = Vec::new();
    for entry in fs::read_dir(input_root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log.error(&format!("Skipping unreadable entry in {}: {}", input_root.display(), e));
                continue;
            }
        };
        // Follows symlinks
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => scenes.push(name),
            Err(name) => {
                log.warn(&format!("Skipping scene directory {:?}: name is not valid UTF-8", name));
            }
        }
    }
    scenes.sort();
    Ok(scenes)
}

/// Runs scenes through a processor
pub struct BatchScheduler<'a> {
    processor: &'a SceneProcessor<'a>,
    log: &'a RunLog,
    workers: usize,
    show_progress: bool,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(processor: &'a SceneProcessor<'a>, log: &'a RunLog, workers: usize, show_progress: bool) -> Self {
        BatchScheduler {
            processor,
            log,
            workers: workers.max(1),
            show_progress,
        }
    }

    /// Process `scenes`, returning results in completion order
    pub fn run(&self, scenes: &[String]) -> BatchResult<Vec<SceneResult>> {
        match scenes.len() {
            0 => {
                self.log.warn("No scenes to process");
                Ok(Vec::new())
            }
            1 => Ok(self.run_one(&scenes[0]).into_iter().collect()),
            _ => self.run_pool(scenes),
        }
    }

    fn run_one(&self, scene: &str) -> Option<SceneResult> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.processor.process(scene)));
        self.accept(scene, outcome)
    }

    fn run_pool(&self, scenes: &[String]) -> BatchResult<Vec<SceneResult>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("scene-worker-{}", i))
            .build()?;
        self.log.info(&format!("Processing {} scenes on {} worker(s)", scenes.len(), self.workers));

        let progress = if self.show_progress {
            ProgressTracker::new(scenes.len() as u64, "Processing scenes")
        } else {
            ProgressTracker::hidden(scenes.len() as u64)
        };

        let processor = self.processor;
        let results = pool.in_place_scope(|scope| {
            let (tx, rx) = mpsc::channel();
            for scene in scenes {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.process(scene)));
                    // The receiver outlives every task of the scope
                    let _ = tx.send((scene.as_str(), outcome));
                });
            }
            drop(tx);

            let mut results = Vec::with_capacity(scenes.len());
            for (scene, outcome) in rx {
                debug!("Scene {} reported back", scene);
                progress.increment(1);
                progress.set_message(scene);
                if let Some(result) = self.accept(scene, outcome) {
                    results.push(result);
                }
            }
            results
        });
        progress.finish();

        Ok(results)
    }

    fn accept(&self, scene: &str, outcome: std::thread::Result<SceneResult>) -> Option<SceneResult> {
        match outcome {
            Ok(result) => Some(result),
            Err(payload) => {
                self.log.error(&format!("[{}] Scene aborted: {}", scene, panic_message(payload.as_ref())));
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_sorted_directories_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c", "a", "b"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"not a scene").unwrap();

        let log = RunLog::in_memory();
        let scenes = discover_scenes(dir.path(), None, &log).unwrap();
        assert_eq!(scenes, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_named_scene_is_the_only_one() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        let log = RunLog::in_memory();
        assert_eq!(discover_scenes(dir.path(), Some("x"), &log).unwrap(), vec!["x"]);
    }

    #[test]
    fn test_missing_input_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::in_memory();
        assert!(discover_scenes(&dir.path().join("absent"), None, &log).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_scene_is_discovered() {
        let input = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        fs::create_dir(input.path().join("a")).unwrap();
        fs::create_dir(elsewhere.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join("linked"), input.path().join("linked")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path().join("gone"), input.path().join("dangling")).unwrap();

        let log = RunLog::in_memory();
        let scenes = discover_scenes(input.path(), None, &log).unwrap();
        assert_eq!(scenes, vec!["a", "linked"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_scene_name_is_skipped_and_logged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("good")).unwrap();
        fs::create_dir(dir.path().join(OsStr::from_bytes(b"bad\xff"))).unwrap();

        let log = RunLog::in_memory();
        let scenes = discover_scenes(dir.path(), None, &log).unwrap();
        assert_eq!(scenes, vec!["good"]);
        assert!(log.entries().iter().any(|line| line.contains(" — WARN — ") && line.contains("not valid UTF-8")));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("band exploded");
        assert_eq!(panic_message(payload.as_ref()), "band exploded");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
    }
}
