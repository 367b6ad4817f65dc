//! Batch orchestration
//!
//! Ties a validated `BatchConfig` to the scene processor, the scheduler
//! and the summary report.

pub mod config;
pub mod errors;
pub mod scheduler;
pub mod summary;

use std::path::PathBuf;
use std::time::Instant;

pub use config::BatchConfig;
pub use errors::{BatchError, BatchResult};
pub use scheduler::{discover_scenes, BatchScheduler};
pub use summary::ResultAggregator;

use crate::raster::{BandStore, GeoTiffBandStore};
use crate::scene::{SceneProcessor, SceneResult};
use crate::utils::logger::RunLog;

/// What a finished run produced
#[derive(Debug)]
pub struct BatchReport {
    pub summary_path: PathBuf,
    /// Scene results in completion order
    pub results: Vec<SceneResult>,
}

/// Run a batch with GeoTIFF band storage
pub fn run(config: BatchConfig, log: &RunLog) -> BatchResult<BatchReport> {
    let store = GeoTiffBandStore::new(&config.compression)?;
    run_with_store(config, &store, log)
}

/// Run a batch against any band store
pub fn run_with_store(config: BatchConfig, store: &dyn BandStore, log: &RunLog) -> BatchResult<BatchReport> {
    let started = Instant::now();
    log.info("Batch index processing started");
    log.info(&format!(
        "Input: {}, output: {}, indices: {}",
        config.input_root.display(),
        config.output_root.display(),
        config.indices.iter().map(|kind| kind.name()).collect::<Vec<_>>().join(", ")
    ));

    let scenes = discover_scenes(&config.input_root, config.scene.as_deref(), log)?;
    log.info(&format!("Found {} scene(s)", scenes.len()));

    let processor = SceneProcessor::new(store, log, &config.input_root, &config.output_root, &config.indices);
    let scheduler = BatchScheduler::new(&processor, log, config.worker_count(), config.show_progress);

    let mut aggregator = ResultAggregator::new();
    for result in scheduler.run(&scenes)? {
        aggregator.push(result);
    }
    let results = aggregator.results().to_vec();

    let summary_path = aggregator.write(&config.output_root, log.run_stamp())?;
    log.info(&format!("Summary CSV saved to {}", summary_path.display()));
    log.info(&format!(
        "All scenes processed: {} of {} in {:.2}s",
        results.len(), scenes.len(), started.elapsed().as_secs_f64()
    ));

    Ok(BatchReport { summary_path, results })
}
