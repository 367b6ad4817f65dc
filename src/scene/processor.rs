//! Scene processing
//!
//! Load, select, compute+persist, aggregate. Band load and persist
//! failures are recovered where they happen; anything else ends the
//! scene and the partially filled result is returned. Each index output
//! is georeferenced on the profile of its first input band.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::batch::errors::{BatchError, BatchResult};
use crate::indices::{bands, IndexKind};
use crate::raster::BandStore;
use crate::scene::band_set::{Band, BandSet, BandStatus};
use crate::scene::{IndexOutcome, SceneResult};
use crate::utils::logger::RunLog;

/// Processes scenes of one input root into one output root
pub struct SceneProcessor<'a> {
    store: &'a dyn BandStore,
    log: &'a RunLog,
    input_root: PathBuf,
    output_root: PathBuf,
    indices: Vec<IndexKind>,
}

impl<'a> SceneProcessor<'a> {
    /// `indices` are computed in table order whatever order they are given in
    pub fn new(
        store: &'a dyn BandStore,
        log: &'a RunLog,
        input_root: &Path,
        output_root: &Path,
        indices: &[IndexKind],
    ) -> Self {
        let mut indices = indices.to_vec();
        indices.sort();
        indices.dedup();

        SceneProcessor {
            store,
            log,
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            indices,
        }
    }

    /// Process one scene; never fails, errors end up in the log
    pub fn process(&self, scene: &str) -> SceneResult {
        self.log.info(&format!("[{}] Processing scene", scene));
        let start = Instant::now();
        let mut result = SceneResult::new(scene);

        if let Err(e) = self.run(scene, &mut result) {
            self.log.error(&format!("[{}] Unexpected error: {}", scene, e));
        }

        result.elapsed_secs = start.elapsed().as_secs_f64();
        self.log.info(&format!(
            "[{}] Finished in {:.2}s ({} index(es) attempted)",
            scene, result.elapsed_secs, result.attempted()
        ));
        result
    }

    fn run(&self, scene: &str, result: &mut SceneResult) -> BatchResult<()> {
        let band_set = self.load_bands(scene);
        let feasible = self.select(scene, &band_set);
        if feasible.is_empty() {
            self.log.info(&format!("[{}] No requested index is computable", scene));
            return Ok(());
        }

        let out_dir = self.output_root.join(scene);
        fs::create_dir_all(&out_dir)?;

        for kind in feasible {
            let spec = kind.spec();
            let (inputs, profile) = match (band_set.grids(spec.bands), band_set.input_profile(spec.bands)) {
                (Some(inputs), Some(profile)) => (inputs, profile),
                _ => return Err(BatchError::SceneError(format!("{} selected without its bands", kind))),
            };
            let grid = spec.compute(&inputs)?;
            let out_profile = profile.for_index_output();

            let path = out_dir.join(kind.file_name());
            match self.store.save_grid(&grid, &out_profile, &path) {
                Ok(()) => {
                    self.log.info(&format!("[{}] {} saved to {}", scene, kind, path.display()));
                    result.record(kind, IndexOutcome::Persisted(path));
                }
                Err(e) => {
                    self.log.error(&format!("[{}] Failed to save {}: {}", scene, kind, e));
                    result.record(kind, IndexOutcome::Failed(e.to_string()));
                }
            }
        }

        Ok(())
    }

    /// Load every band file present in the scene directory
    pub fn load_bands(&self, scene: &str) -> BandSet {
        let scene_dir = self.input_root.join(scene);
        let mut band_set = BandSet::new();

        for name in bands::ALL {
            let path = scene_dir.join(format!("{}.tif", name));
            if !path.is_file() {
                self.log.warn(&format!("[{}] Missing {}.tif", scene, name));
                band_set.mark_absent(name, BandStatus::Missing);
                continue;
            }

            match self.store.load_band(&path) {
                Ok((grid, profile)) => band_set.insert(name, Band { grid, profile }),
                Err(e) => {
                    self.log.error(&format!("[{}] Failed to load band {}: {}", scene, path.display(), e));
                    self.log.warn(&format!("[{}] Could not load {}.tif", scene, name));
                    band_set.mark_absent(name, BandStatus::Unreadable(e.to_string()));
                }
            }
        }

        band_set
    }

    /// Requested indices whose bands are all loaded
    fn select(&self, scene: &str, band_set: &BandSet) -> Vec<IndexKind> {
        self.indices
            .iter()
            .copied()
            .filter(|kind| {
                let missing = band_set.missing(kind.required_bands());
                if !missing.is_empty() {
                    self.log.debug(&format!("[{}] Skipping {}: missing {}", scene, kind, missing.join(", ")));
                }
                missing.is_empty()
            })
            .collect()
    }
}
