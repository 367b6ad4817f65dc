//! Spectral index library
//!
//! `IndexKind` names the eight supported indices; `INDEX_TABLE` binds each
//! one to the bands it reads and the formula that computes it. An index is
//! computable for a scene exactly when all of its bands were loaded.

pub mod errors;
pub mod formulas;

use std::fmt;

pub use errors::{IndexError, IndexResult};
pub use formulas::safe_divide;

use crate::raster::Grid;

/// Band file names of a scene and the role each plays in the formulas
pub mod bands {
    pub const BLUE: &str = "B2";
    pub const GREEN: &str = "B3";
    pub const RED: &str = "B4";
    pub const NIR: &str = "B5";
    pub const SWIR1: &str = "B6";
    pub const SWIR2: &str = "B7";

    /// Load order of a scene's bands
    pub const ALL: [&str; 6] = [BLUE, GREEN, RED, NIR, SWIR1, SWIR2];
}

/// Supported spectral indices, in report column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKind {
    Ndvi,
    Savi,
    Evi,
    Arvi,
    Nbr,
    Nbwi,
    Ndbi,
    Gci,
}

/// Table entry binding an index to its bands and formula
pub struct IndexSpec {
    pub kind: IndexKind,
    pub name: &'static str,
    /// Band names, in the order `compute` expects its inputs
    pub bands: &'static [&'static str],
    pub description: &'static str,
    compute: fn(&[&Grid]) -> IndexResult<Grid>,
}

impl IndexSpec {
    /// Run the formula on grids given in `bands` order
    pub fn compute(&self, inputs: &[&Grid]) -> IndexResult<Grid> {
        if let Some(band) = self.bands.get(inputs.len()) {
            return Err(IndexError::MissingInput { index: self.name, band });
        }
        (self.compute)(inputs)
    }
}

pub static INDEX_TABLE: [IndexSpec; 8] = [
    IndexSpec {
        kind: IndexKind::Ndvi,
        name: "NDVI",
        bands: &[bands::NIR, bands::RED],
        description: "Normalized Difference Vegetation Index",
        compute: |b| formulas::ndvi(b[0], b[1]),
    },
    IndexSpec {
        kind: IndexKind::Savi,
        name: "SAVI",
        bands: &[bands::NIR, bands::RED],
        description: "Soil Adjusted Vegetation Index (L = 0.5)",
        compute: |b| formulas::savi(b[0], b[1]),
    },
    IndexSpec {
        kind: IndexKind::Evi,
        name: "EVI",
        bands: &[bands::NIR, bands::RED, bands::BLUE],
        description: "Enhanced Vegetation Index",
        compute: |b| formulas::evi(b[0], b[1], b[2]),
    },
    IndexSpec {
        kind: IndexKind::Arvi,
        name: "ARVI",
        bands: &[bands::NIR, bands::RED, bands::BLUE],
        description: "Atmospherically Resistant Vegetation Index",
        compute: |b| formulas::arvi(b[0], b[1], b[2]),
    },
    IndexSpec {
        kind: IndexKind::Nbr,
        name: "NBR",
        bands: &[bands::NIR, bands::SWIR2],
        description: "Normalized Burn Ratio",
        compute: |b| formulas::nbr(b[0], b[1]),
    },
    IndexSpec {
        kind: IndexKind::Nbwi,
        name: "NBWI",
        bands: &[bands::GREEN, bands::NIR],
        description: "Normalized Difference Water Index",
        compute: |b| formulas::nbwi(b[0], b[1]),
    },
    IndexSpec {
        kind: IndexKind::Ndbi,
        name: "NDBI",
        bands: &[bands::SWIR1, bands::NIR],
        description: "Normalized Difference Built-up Index",
        compute: |b| formulas::ndbi(b[0], b[1]),
    },
    IndexSpec {
        kind: IndexKind::Gci,
        name: "GCI",
        bands: &[bands::NIR, bands::GREEN],
        description: "Green Chlorophyll Index",
        compute: |b| formulas::gci(b[0], b[1]),
    },
];

impl IndexKind {
    /// All indices, in table order
    pub const ALL: [IndexKind; 8] = [
        IndexKind::Ndvi,
        IndexKind::Savi,
        IndexKind::Evi,
        IndexKind::Arvi,
        IndexKind::Nbr,
        IndexKind::Nbwi,
        IndexKind::Ndbi,
        IndexKind::Gci,
    ];

    pub fn spec(&self) -> &'static IndexSpec {
        &INDEX_TABLE[*self as usize]
    }

    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    pub fn required_bands(&self) -> &'static [&'static str] {
        self.spec().bands
    }

    /// Look up an index by name, ignoring case
    pub fn from_name(name: &str) -> Option<IndexKind> {
        INDEX_TABLE
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
            .map(|spec| spec.kind)
    }

    /// Output file name of this index within a scene directory
    pub fn file_name(&self) -> String {
        format!("{}.tif", self.name())
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_table_matches_kind_order() {
        for (position, kind) in IndexKind::ALL.iter().enumerate() {
            assert_eq!(INDEX_TABLE[position].kind, *kind);
            assert_eq!(kind.spec().kind, *kind);
        }
    }

    #[test]
    fn test_band_roles() {
        assert_eq!(IndexKind::Evi.required_bands(), &["B5", "B4", "B2"]);
        assert_eq!(IndexKind::Arvi.required_bands(), &["B5", "B4", "B2"]);
        assert_eq!(IndexKind::Gci.required_bands(), &["B5", "B3"]);
        assert_eq!(IndexKind::Nbr.required_bands(), &["B5", "B7"]);
        assert_eq!(IndexKind::Ndbi.required_bands(), &["B6", "B5"]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(IndexKind::from_name("ndvi"), Some(IndexKind::Ndvi));
        assert_eq!(IndexKind::from_name(" GCI "), Some(IndexKind::Gci));
        assert_eq!(IndexKind::from_name("NDWI"), None);
    }

    #[test]
    fn test_compute_through_table() {
        let nir = array![[0.8f32]];
        let red = array![[0.2f32]];
        let ndvi = IndexKind::Ndvi.spec().compute(&[&nir, &red]).unwrap();
        assert!((ndvi[[0, 0]] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_compute_with_missing_input() {
        let nir = array![[0.8f32]];
        let err = IndexKind::Evi.spec().compute(&[&nir]).unwrap_err();
        assert_eq!(err, IndexError::MissingInput { index: "EVI", band: "B4" });
    }
}
