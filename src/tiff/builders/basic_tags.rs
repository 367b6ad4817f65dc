//! Basic image structure tags
//!
//! Index outputs are always single-band float32 grayscale grids.

use log::debug;

use crate::raster::profile::SampleType;
use crate::tiff::builder::TiffBuilder;
use crate::tiff::constants::{photometric, planar_config, tags};

/// Adds image structure tags to a builder
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Structure tags for a single-band grid of `dtype` samples
    pub fn add_single_band_tags(
        builder: &mut TiffBuilder,
        width: u32,
        height: u32,
        dtype: SampleType,
        rows_per_strip: u32,
        compression: u16,
    ) {
        debug!("Adding {} single-band tags for {}x{} image", dtype.name(), width, height);

        builder.set_long(tags::IMAGE_WIDTH, width);
        builder.set_long(tags::IMAGE_LENGTH, height);
        builder.set_short(tags::BITS_PER_SAMPLE, dtype.bits());
        builder.set_short(tags::COMPRESSION, compression);
        builder.set_short(tags::PHOTOMETRIC_INTERPRETATION, photometric::BLACK_IS_ZERO);
        builder.set_short(tags::SAMPLES_PER_PIXEL, 1);
        builder.set_long(tags::ROWS_PER_STRIP, rows_per_strip);
        builder.set_short(tags::PLANAR_CONFIGURATION, planar_config::CHUNKY);
        builder.set_short(tags::SAMPLE_FORMAT, dtype.sample_format());
    }
}
