//! Band storage
//!
//! `BandStore` is the I/O seam of the scene processor: it loads one band
//! grid with its profile and persists one derived grid. `GeoTiffBandStore`
//! implements it on top of the crate's TIFF reader and builder.

use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::SeekableReader;
use crate::raster::decoder;
use crate::raster::profile::{GeoReference, Profile};
use crate::raster::Grid;
use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::{TiffBuilder, TiffReader};

/// Target uncompressed size of one output strip
const STRIP_TARGET_BYTES: usize = 256 * 1024;

/// Payload size above which outputs are written as BigTIFF
const BIG_TIFF_THRESHOLD: u64 = u32::MAX as u64 - 16 * 1024 * 1024;

/// Loads band grids and persists derived grids
pub trait BandStore: Send + Sync {
    /// Load the first band of the raster at `path`
    fn load_band(&self, path: &Path) -> TiffResult<(Grid, Profile)>;

    /// Persist `grid` at `path` as a single float32 band on `profile`'s grid
    fn save_grid(&self, grid: &Grid, profile: &Profile, path: &Path) -> TiffResult<()>;
}

/// GeoTIFF-backed band store
pub struct GeoTiffBandStore {
    compression: Box<dyn CompressionHandler>,
}

impl GeoTiffBandStore {
    /// Create a store writing outputs with the named compression
    pub fn new(compression: &str) -> TiffResult<Self> {
        Ok(GeoTiffBandStore {
            compression: CompressionFactory::get_handler_by_name(compression)?,
        })
    }

    /// Read only the profile of a raster file
    pub fn read_profile(path: &Path) -> TiffResult<Profile> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut tiff = TiffReader::new();
        let ifd = tiff.read(&mut reader)?;
        read_profile(&mut reader, &tiff, &ifd)
    }

    /// Encode a grid into a ready-to-write TIFF
    pub fn encode(&self, grid: &Grid, profile: &Profile) -> TiffResult<TiffBuilder> {
        let out = profile.for_index_output();
        if grid.dim() != out.shape() {
            return Err(TiffError::GenericError(format!(
                "Grid shape {:?} does not match profile shape {:?}", grid.dim(), out.shape())));
        }

        let (rows, cols) = grid.dim();
        if rows == 0 || cols == 0 {
            return Err(TiffError::MissingDimensions);
        }

        let row_bytes = cols * out.dtype.bytes();
        let rows_per_strip = (STRIP_TARGET_BYTES / row_bytes).clamp(1, rows);
        let raw_size = (rows * row_bytes) as u64;

        let mut builder = TiffBuilder::new(raw_size > BIG_TIFF_THRESHOLD);
        BasicTagsBuilder::add_single_band_tags(
            &mut builder,
            cols as u32,
            rows as u32,
            out.dtype,
            rows_per_strip as u32,
            self.compression.code(),
        );
        GeoTagsBuilder::copy_geo_reference(&mut builder, &out.geo);
        GeoTagsBuilder::add_nodata_tag(&mut builder, out.nodata.as_deref());

        let mut strips = Vec::with_capacity(rows.div_ceil(rows_per_strip));
        let mut row = 0;
        while row < rows {
            let end = (row + rows_per_strip).min(rows);
            let mut raw = Vec::with_capacity((end - row) * row_bytes);
            for value in grid.slice(ndarray::s![row..end, ..]).iter() {
                raw.extend_from_slice(&value.to_le_bytes());
            }
            strips.push(self.compression.compress(&raw)?);
            row = end;
        }
        builder.set_strips(strips);

        Ok(builder)
    }
}

impl BandStore for GeoTiffBandStore {
    fn load_band(&self, path: &Path) -> TiffResult<(Grid, Profile)> {
        debug!("Loading band {}", path.display());
        let mut reader = BufReader::with_capacity(1024 * 1024, File::open(path)?);
        let mut tiff = TiffReader::new();
        let ifd = tiff.read(&mut reader)?;

        let profile = read_profile(&mut reader, &tiff, &ifd)?;
        let grid = decoder::decode_band(&mut reader, &tiff, &ifd)?;
        Ok((grid, profile))
    }

    fn save_grid(&self, grid: &Grid, profile: &Profile, path: &Path) -> TiffResult<()> {
        self.encode(grid, profile)?.write(path)
    }
}

/// Build a profile from an IFD's structure and GeoTIFF tags
pub fn read_profile(reader: &mut dyn SeekableReader, tiff: &TiffReader, ifd: &IFD) -> TiffResult<Profile> {
    let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
    let (dtype, count) = decoder::sample_layout(reader, tiff, ifd)?;

    let geo_key_directory = if ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
        let values = tiff.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
        Some(values.into_iter().map(|v| v as u16).collect())
    } else {
        None
    };
    let geo_ascii_params = if ifd.has_tag(tags::GEO_ASCII_PARAMS_TAG) {
        Some(tiff.read_ascii(reader, ifd, tags::GEO_ASCII_PARAMS_TAG)?)
    } else {
        None
    };
    let nodata = if ifd.has_tag(tags::GDAL_NODATA) {
        Some(tiff.read_ascii(reader, ifd, tags::GDAL_NODATA)?.trim().to_string())
    } else {
        None
    };

    Ok(Profile {
        width: width as usize,
        height: height as usize,
        count,
        dtype,
        nodata,
        geo: GeoReference {
            geo_key_directory,
            geo_double_params: optional_doubles(reader, tiff, ifd, tags::GEO_DOUBLE_PARAMS_TAG)?,
            geo_ascii_params,
            pixel_scale: optional_doubles(reader, tiff, ifd, tags::MODEL_PIXEL_SCALE_TAG)?,
            tiepoints: optional_doubles(reader, tiff, ifd, tags::MODEL_TIEPOINT_TAG)?,
            transformation: optional_doubles(reader, tiff, ifd, tags::MODEL_TRANSFORMATION_TAG)?,
        },
    })
}

fn optional_doubles(reader: &mut dyn SeekableReader, tiff: &TiffReader, ifd: &IFD, tag: u16) -> TiffResult<Option<Vec<f64>>> {
    if ifd.has_tag(tag) {
        tiff.read_f64_values(reader, ifd, tag).map(Some)
    } else {
        Ok(None)
    }
}
