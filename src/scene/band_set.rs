use std::collections::BTreeMap;

use crate::raster::{Grid, Profile};

/// A loaded band grid with its profile
#[derive(Debug, Clone)]
pub struct Band {
    pub grid: Grid,
    pub profile: Profile,
}

/// Load status of one band file
#[derive(Debug, Clone, PartialEq)]
pub enum BandStatus {
    Loaded,
    /// No file for the band in the scene
    Missing,
    /// The file exists but could not be read
    Unreadable(String),
}

/// Bands of one scene, keyed by band name
#[derive(Debug, Default)]
pub struct BandSet {
    bands: BTreeMap<&'static str, Band>,
    status: BTreeMap<&'static str, BandStatus>,
}

impl BandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, band: Band) {
        self.bands.insert(name, band);
        self.status.insert(name, BandStatus::Loaded);
    }

    /// Record a band that did not load; it stays absent from the set
    pub fn mark_absent(&mut self, name: &'static str, status: BandStatus) {
        self.bands.remove(name);
        self.status.insert(name, status);
    }

    pub fn get(&self, name: &str) -> Option<&Band> {
        self.bands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bands.contains_key(name)
    }

    pub fn status(&self, name: &str) -> Option<&BandStatus> {
        self.status.get(name)
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Bands of `required` that are not loaded
    pub fn missing<'b>(&self, required: &[&'b str]) -> Vec<&'b str> {
        required.iter().copied().filter(|name| !self.contains(name)).collect()
    }

    /// Grids of `names`, in that order, if all are loaded
    pub fn grids(&self, names: &[&str]) -> Option<Vec<&Grid>> {
        names.iter().map(|name| self.get(name).map(|band| &band.grid)).collect()
    }

    /// Profile of the first of `names`, the band an index output is georeferenced on
    pub fn input_profile(&self, names: &[&str]) -> Option<&Profile> {
        names.first().and_then(|name| self.get(name)).map(|band| &band.profile)
    }
}
