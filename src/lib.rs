pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod raster;
pub mod indices;
pub mod scene;
pub mod batch;
pub mod commands;

pub use batch::{BatchConfig, BatchError, BatchReport, BatchResult};
pub use indices::{IndexKind, IndexSpec, INDEX_TABLE};
pub use raster::{BandStore, GeoTiffBandStore, Grid, Profile};
pub use scene::{IndexOutcome, SceneProcessor, SceneResult};
pub use utils::logger::RunLog;
