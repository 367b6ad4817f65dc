//! Per-scene processing
//!
//! A scene is one directory of band files. `SceneProcessor` loads what is
//! there into a `BandSet`, computes the requested indices the bands allow
//! and reports the outcome of each in a `SceneResult`.

pub mod band_set;
pub mod processor;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use band_set::{Band, BandSet, BandStatus};
pub use processor::SceneProcessor;

use crate::indices::IndexKind;

/// Outcome of one attempted index
#[derive(Debug, Clone, PartialEq)]
pub enum IndexOutcome {
    /// Written to the given path
    Persisted(PathBuf),
    /// Computed but could not be written
    Failed(String),
}

impl IndexOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, IndexOutcome::Persisted(_))
    }
}

/// Result of processing one scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneResult {
    pub scene: String,
    /// One entry per attempted index; infeasible indices are absent
    pub outcomes: BTreeMap<IndexKind, IndexOutcome>,
    pub elapsed_secs: f64,
}

impl SceneResult {
    pub fn new(scene: &str) -> Self {
        SceneResult {
            scene: scene.to_string(),
            outcomes: BTreeMap::new(),
            elapsed_secs: 0.0,
        }
    }

    pub fn record(&mut self, kind: IndexKind, outcome: IndexOutcome) {
        self.outcomes.insert(kind, outcome);
    }

    /// `Some(persisted?)` for attempted indices, `None` otherwise
    pub fn succeeded(&self, kind: IndexKind) -> Option<bool> {
        self.outcomes.get(&kind).map(IndexOutcome::succeeded)
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }
}
