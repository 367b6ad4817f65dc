//! Georeferencing profile of a band grid
//!
//! A `Profile` carries everything needed to write a derived grid on the
//! same pixel grid as its source band: dimensions, sample type and the
//! GeoTIFF tags, which are kept verbatim so outputs are georeferenced
//! exactly like their inputs.

use std::fmt;

use crate::tiff::constants::{geo_keys, sample_format};
use crate::tiff::errors::{TiffError, TiffResult};

/// Pixel sample type of a grid on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl SampleType {
    /// Resolve from the SampleFormat and BitsPerSample tag values
    pub fn from_tags(format: u16, bits: u16) -> TiffResult<Self> {
        match (format, bits) {
            (sample_format::UNSIGNED, 8) => Ok(SampleType::U8),
            (sample_format::SIGNED, 8) => Ok(SampleType::I8),
            (sample_format::UNSIGNED, 16) => Ok(SampleType::U16),
            (sample_format::SIGNED, 16) => Ok(SampleType::I16),
            (sample_format::UNSIGNED, 32) => Ok(SampleType::U32),
            (sample_format::SIGNED, 32) => Ok(SampleType::I32),
            (sample_format::IEEEFP, 32) => Ok(SampleType::F32),
            (sample_format::IEEEFP, 64) => Ok(SampleType::F64),
            _ => Err(TiffError::UnsupportedSampleType(format, bits)),
        }
    }

    pub fn bits(&self) -> u16 {
        (self.bytes() * 8) as u16
    }

    pub fn bytes(&self) -> usize {
        match self {
            SampleType::U8 | SampleType::I8 => 1,
            SampleType::U16 | SampleType::I16 => 2,
            SampleType::U32 | SampleType::I32 | SampleType::F32 => 4,
            SampleType::F64 => 8,
        }
    }

    pub fn sample_format(&self) -> u16 {
        match self {
            SampleType::U8 | SampleType::U16 | SampleType::U32 => sample_format::UNSIGNED,
            SampleType::I8 | SampleType::I16 | SampleType::I32 => sample_format::SIGNED,
            SampleType::F32 | SampleType::F64 => sample_format::IEEEFP,
        }
    }

    pub fn is_float(&self) -> bool {
        self.sample_format() == sample_format::IEEEFP
    }

    pub fn name(&self) -> &'static str {
        match self {
            SampleType::U8 => "uint8",
            SampleType::I8 => "int8",
            SampleType::U16 => "uint16",
            SampleType::I16 => "int16",
            SampleType::U32 => "uint32",
            SampleType::I32 => "int32",
            SampleType::F32 => "float32",
            SampleType::F64 => "float64",
        }
    }
}

/// GeoTIFF tags of a band, as read from the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoReference {
    pub geo_key_directory: Option<Vec<u16>>,
    pub geo_double_params: Option<Vec<f64>>,
    pub geo_ascii_params: Option<String>,
    pub pixel_scale: Option<Vec<f64>>,
    pub tiepoints: Option<Vec<f64>>,
    pub transformation: Option<Vec<f64>>,
}

impl GeoReference {
    pub fn is_empty(&self) -> bool {
        *self == GeoReference::default()
    }
}

/// Georeferencing profile of a grid
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
    /// Samples per pixel
    pub count: usize,
    pub dtype: SampleType,
    /// GDAL nodata value, as text
    pub nodata: Option<String>,
    pub geo: GeoReference,
}

impl Profile {
    /// `(rows, cols)`, the shape of the grid in memory
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Profile for an index output: same grid, one float32 band
    pub fn for_index_output(&self) -> Profile {
        Profile {
            count: 1,
            dtype: SampleType::F32,
            ..self.clone()
        }
    }

    /// Affine transform in GDAL coefficient order
    /// `(x0, pixel_width, row_rotation, y0, col_rotation, pixel_height)`
    pub fn transform(&self) -> Option<[f64; 6]> {
        if let Some(m) = self.geo.transformation.as_deref() {
            if m.len() >= 8 {
                return Some([m[3], m[0], m[1], m[7], m[4], m[5]]);
            }
        }

        let scale = self.geo.pixel_scale.as_deref()?;
        let tie = self.geo.tiepoints.as_deref()?;
        if scale.len() < 2 || tie.len() < 6 {
            return None;
        }

        // Tiepoint (i, j, k, x, y, z): raster (i, j) maps to model (x, y)
        let x0 = tie[3] - tie[0] * scale[0];
        let y0 = tie[4] + tie[1] * scale[1];
        Some([x0, scale[0], 0.0, y0, 0.0, -scale[1]])
    }

    /// EPSG code from the GeoKey directory, if one is declared
    pub fn epsg(&self) -> Option<u16> {
        let dir = self.geo.geo_key_directory.as_deref()?;
        if dir.len() < 4 {
            return None;
        }

        let key_count = dir[3] as usize;
        let mut geographic = None;
        for key in dir[4..].chunks_exact(4).take(key_count) {
            // Location 0 means the value is stored in the entry itself
            if key[1] != 0 || key[3] == 0 || key[3] == 32767 {
                continue;
            }
            match key[0] {
                geo_keys::PROJECTED_CS_TYPE => return Some(key[3]),
                geo_keys::GEOGRAPHIC_TYPE => geographic = Some(key[3]),
                _ => {}
            }
        }
        geographic
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Size: {}x{} ({} band(s), {})", self.width, self.height, self.count, self.dtype.name())?;
        match self.epsg() {
            Some(code) => writeln!(f, "CRS: EPSG:{}", code)?,
            None if self.geo.is_empty() => writeln!(f, "CRS: none")?,
            None => writeln!(f, "CRS: user-defined")?,
        }
        match self.transform() {
            Some(t) => writeln!(f, "Transform: origin ({}, {}), pixel size ({}, {})", t[0], t[3], t[1], t[5])?,
            None => writeln!(f, "Transform: none")?,
        }
        write!(f, "NoData: {}", self.nodata.as_deref().unwrap_or("none"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm_profile() -> Profile {
        Profile {
            width: 4,
            height: 3,
            count: 1,
            dtype: SampleType::U16,
            nodata: Some("0".to_string()),
            geo: GeoReference {
                geo_key_directory: Some(vec![1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32633]),
                pixel_scale: Some(vec![30.0, 30.0, 0.0]),
                tiepoints: Some(vec![0.0, 0.0, 0.0, 500000.0, 4200000.0, 0.0]),
                ..GeoReference::default()
            },
        }
    }

    #[test]
    fn test_transform_from_tiepoint() {
        let t = utm_profile().transform().unwrap();
        assert_eq!(t, [500000.0, 30.0, 0.0, 4200000.0, 0.0, -30.0]);
    }

    #[test]
    fn test_epsg_from_directory() {
        assert_eq!(utm_profile().epsg(), Some(32633));
    }

    #[test]
    fn test_index_output_profile() {
        let out = utm_profile().for_index_output();
        assert_eq!(out.dtype, SampleType::F32);
        assert_eq!(out.count, 1);
        assert_eq!(out.shape(), utm_profile().shape());
        assert_eq!(out.transform(), utm_profile().transform());
        assert_eq!(out.geo, utm_profile().geo);
    }

    #[test]
    fn test_sample_type_resolution() {
        assert_eq!(SampleType::from_tags(1, 16).unwrap(), SampleType::U16);
        assert_eq!(SampleType::from_tags(3, 32).unwrap().bits(), 32);
        assert!(SampleType::from_tags(3, 16).is_err());
    }
}
