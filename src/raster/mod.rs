//! Band grids, their georeferencing profiles and their storage

use ndarray::Array2;

pub mod decoder;
pub mod profile;
pub mod store;

pub use profile::{GeoReference, Profile, SampleType};
pub use store::{BandStore, GeoTiffBandStore};

/// A 2-D grid of band or index values, `(rows, cols)`
pub type Grid = Array2<f32>;
