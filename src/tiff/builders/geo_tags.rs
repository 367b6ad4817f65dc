//! GeoTIFF tag strategies
//!
//! Carries a source band's georeferencing onto a derived grid. Tags are
//! copied value for value; nothing is reprojected or resampled.

use log::debug;

use crate::raster::profile::GeoReference;
use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::tags;

/// Handles GeoTIFF and GDAL metadata tags
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Copy every GeoTIFF tag present in `geo`
    pub fn copy_geo_reference(builder: &mut TiffBuilder, geo: &GeoReference) {
        if geo.is_empty() {
            debug!("Source has no georeferencing, writing plain TIFF");
            return;
        }

        if let Some(scale) = &geo.pixel_scale {
            builder.set_doubles(tags::MODEL_PIXEL_SCALE_TAG, scale);
        }
        if let Some(tiepoints) = &geo.tiepoints {
            builder.set_doubles(tags::MODEL_TIEPOINT_TAG, tiepoints);
        }
        if let Some(matrix) = &geo.transformation {
            builder.set_doubles(tags::MODEL_TRANSFORMATION_TAG, matrix);
        }
        if let Some(directory) = &geo.geo_key_directory {
            builder.set_shorts(tags::GEO_KEY_DIRECTORY_TAG, directory);
        }
        if let Some(params) = &geo.geo_double_params {
            builder.set_doubles(tags::GEO_DOUBLE_PARAMS_TAG, params);
        }
        if let Some(params) = &geo.geo_ascii_params {
            // The stored string already ends with its own separators
            builder.set_ascii(tags::GEO_ASCII_PARAMS_TAG, params);
        }
    }

    /// GDAL_NODATA tag, stored as NUL-terminated text
    pub fn add_nodata_tag(builder: &mut TiffBuilder, nodata: Option<&str>) {
        if let Some(value) = nodata.map(str::trim).filter(|v| !v.is_empty()) {
            debug!("Adding GDAL NoData tag: {}", value);
            builder.set_ascii(tags::GDAL_NODATA, value);
        }
    }
}
