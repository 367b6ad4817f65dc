//! Pixel data decoding
//!
//! Turns the strips or tiles of a band's first IFD into an `f32` grid.
//! Multi-sample files yield their first sample, matching how a band is
//! addressed as "band 1" of its file.

use log::debug;
use std::io::{Read, SeekFrom};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::byte_order::ByteOrder;
use crate::io::SeekableReader;
use crate::raster::profile::SampleType;
use crate::raster::Grid;
use crate::tiff::constants::{planar_config, predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Chunk geometry shared by strips and tiles
struct ChunkLayout {
    chunk_width: usize,
    chunk_height: usize,
    chunks_across: usize,
    chunks_down: usize,
    offsets: Vec<u64>,
    byte_counts: Vec<u64>,
}

impl ChunkLayout {
    fn read(reader: &mut dyn SeekableReader, tiff: &TiffReader, ifd: &IFD, width: usize, height: usize) -> TiffResult<Self> {
        if ifd.is_tiled() {
            let chunk_width = ifd.get_tag_value(tags::TILE_WIDTH).ok_or(TiffError::TagNotFound(tags::TILE_WIDTH))? as usize;
            let chunk_height = ifd.get_tag_value(tags::TILE_LENGTH).ok_or(TiffError::TagNotFound(tags::TILE_LENGTH))? as usize;
            if chunk_width == 0 || chunk_height == 0 {
                return Err(TiffError::GenericError("Zero tile size".to_string()));
            }
            Ok(ChunkLayout {
                chunk_width,
                chunk_height,
                chunks_across: width.div_ceil(chunk_width),
                chunks_down: height.div_ceil(chunk_height),
                offsets: tiff.read_tag_values(reader, ifd, tags::TILE_OFFSETS)?,
                byte_counts: tiff.read_tag_values(reader, ifd, tags::TILE_BYTE_COUNTS)?,
            })
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP)
                .map(|rows| (rows as usize).clamp(1, height.max(1)))
                .unwrap_or(height.max(1));
            Ok(ChunkLayout {
                chunk_width: width,
                chunk_height: rows_per_strip,
                chunks_across: 1,
                chunks_down: height.div_ceil(rows_per_strip),
                offsets: tiff.read_tag_values(reader, ifd, tags::STRIP_OFFSETS)?,
                byte_counts: tiff.read_tag_values(reader, ifd, tags::STRIP_BYTE_COUNTS)?,
            })
        }
    }

    fn chunks_per_plane(&self) -> usize {
        self.chunks_across * self.chunks_down
    }
}

/// Sample type and first-sample stride of an IFD
pub fn sample_layout(reader: &mut dyn SeekableReader, tiff: &TiffReader, ifd: &IFD) -> TiffResult<(SampleType, usize)> {
    let samples_per_pixel = ifd.get_samples_per_pixel().max(1) as usize;
    let bits = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
        tiff.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?.first().copied().unwrap_or(1)
    } else {
        1
    };
    let format = if ifd.has_tag(tags::SAMPLE_FORMAT) {
        tiff.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?.first().copied().unwrap_or(1)
    } else {
        1
    };

    let dtype = SampleType::from_tags(format as u16, bits as u16)?;
    Ok((dtype, samples_per_pixel))
}

/// Decode the first sample of every pixel of `ifd` into a grid
pub fn decode_band(reader: &mut dyn SeekableReader, tiff: &TiffReader, ifd: &IFD) -> TiffResult<Grid> {
    let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
    let (width, height) = (width as usize, height as usize);
    let (dtype, samples_per_pixel) = sample_layout(reader, tiff, ifd)?;

    let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64);
    // Interleaved pixels carry every sample; planar chunks only the first
    let stride = if planar == planar_config::PLANAR as u64 { 1 } else { samples_per_pixel };

    let predictor_code = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64);
    let use_predictor = match predictor_code {
        p if p == predictor::NONE as u64 => false,
        p if p == predictor::HORIZONTAL_DIFFERENCING as u64 && !dtype.is_float() => true,
        other => return Err(TiffError::UnsupportedPredictor(other)),
    };

    let compression_code = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(1);
    let handler = CompressionFactory::create_handler(compression_code)?;
    let layout = ChunkLayout::read(reader, tiff, ifd, width, height)?;
    let byte_order = tiff.byte_order()?;

    debug!("Decoding {}x{} {} grid: {} chunk(s) of {}x{}, compression {}",
           width, height, dtype.name(), layout.chunks_per_plane(),
           layout.chunk_width, layout.chunk_height, handler.name());

    if layout.offsets.len() < layout.chunks_per_plane() || layout.byte_counts.len() < layout.chunks_per_plane() {
        return Err(TiffError::GenericError(format!(
            "Expected {} data chunks, found {}", layout.chunks_per_plane(), layout.offsets.len())));
    }

    let mut grid = Grid::zeros((height, width));
    for chunk_index in 0..layout.chunks_per_plane() {
        let row0 = (chunk_index / layout.chunks_across) * layout.chunk_height;
        let col0 = (chunk_index % layout.chunks_across) * layout.chunk_width;
        let rows = if ifd.is_tiled() {
            layout.chunk_height
        } else {
            layout.chunk_height.min(height - row0)
        };

        let expected = layout.chunk_width * rows * stride * dtype.bytes();
        let mut data = read_chunk(
            reader,
            &*handler,
            layout.offsets[chunk_index],
            layout.byte_counts[chunk_index],
            expected,
        )?;
        if data.len() < expected {
            return Err(TiffError::TruncatedData { expected, actual: data.len() });
        }
        data.truncate(expected);

        let sample_order = if use_predictor {
            byte_order.to_native_words(&mut data, dtype.bytes());
            undo_horizontal_predictor(&mut data, dtype, layout.chunk_width, stride);
            native_order()
        } else {
            byte_order
        };

        let samples = decode_samples(&data, dtype, sample_order);
        for r in 0..rows {
            let y = row0 + r;
            if y >= height {
                break;
            }
            for c in 0..layout.chunk_width {
                let x = col0 + c;
                if x >= width {
                    break;
                }
                grid[[y, x]] = samples[(r * layout.chunk_width + c) * stride];
            }
        }
    }

    Ok(grid)
}

fn read_chunk(
    reader: &mut dyn SeekableReader,
    handler: &dyn CompressionHandler,
    offset: u64,
    byte_count: u64,
    expected: usize,
) -> TiffResult<Vec<u8>> {
    let mut compressed = vec![0u8; byte_count as usize];
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(&mut compressed)?;
    handler.decompress(&compressed, expected)
}

fn native_order() -> ByteOrder {
    if cfg!(target_endian = "little") {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    }
}

/// Reverse horizontal differencing on native-order integer words
fn undo_horizontal_predictor(data: &mut [u8], dtype: SampleType, chunk_width: usize, stride: usize) {
    let row_len = chunk_width * stride * dtype.bytes();
    if row_len == 0 {
        return;
    }

    for row in data.chunks_exact_mut(row_len) {
        match dtype.bytes() {
            1 => {
                for i in stride..row.len() {
                    row[i] = row[i].wrapping_add(row[i - stride]);
                }
            }
            2 => {
                let mut prev = vec![0u16; stride];
                for (i, word) in row.chunks_exact_mut(2).enumerate() {
                    let value = u16::from_ne_bytes([word[0], word[1]]);
                    let restored = if i < stride { value } else { value.wrapping_add(prev[i % stride]) };
                    prev[i % stride] = restored;
                    word.copy_from_slice(&restored.to_ne_bytes());
                }
            }
            4 => {
                let mut prev = vec![0u32; stride];
                for (i, word) in row.chunks_exact_mut(4).enumerate() {
                    let value = u32::from_ne_bytes([word[0], word[1], word[2], word[3]]);
                    let restored = if i < stride { value } else { value.wrapping_add(prev[i % stride]) };
                    prev[i % stride] = restored;
                    word.copy_from_slice(&restored.to_ne_bytes());
                }
            }
            _ => {}
        }
    }
}

/// Convert raw sample bytes into `f32` values
pub fn decode_samples(data: &[u8], dtype: SampleType, order: ByteOrder) -> Vec<f32> {
    match dtype {
        SampleType::U8 => data.iter().map(|b| *b as f32).collect(),
        SampleType::I8 => data.iter().map(|b| *b as i8 as f32).collect(),
        SampleType::U16 => data.chunks_exact(2).map(|c| order.u16_from(c) as f32).collect(),
        SampleType::I16 => data.chunks_exact(2).map(|c| order.u16_from(c) as i16 as f32).collect(),
        SampleType::U32 => data.chunks_exact(4).map(|c| order.u32_from(c) as f32).collect(),
        SampleType::I32 => data.chunks_exact(4).map(|c| order.u32_from(c) as i32 as f32).collect(),
        SampleType::F32 => data.chunks_exact(4).map(|c| f32::from_bits(order.u32_from(c))).collect(),
        SampleType::F64 => data.chunks_exact(8).map(|c| f64::from_bits(order.u64_from(c)) as f32).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_big_endian_u16() {
        let data = [0x01, 0x00, 0x00, 0x02];
        let samples = decode_samples(&data, SampleType::U16, ByteOrder::BigEndian);
        assert_eq!(samples, vec![256.0, 2.0]);
    }

    #[test]
    fn test_decode_signed_and_float() {
        let data = (-3i16).to_le_bytes();
        assert_eq!(decode_samples(&data, SampleType::I16, ByteOrder::LittleEndian), vec![-3.0]);

        let data = 0.25f32.to_le_bytes();
        assert_eq!(decode_samples(&data, SampleType::F32, ByteOrder::LittleEndian), vec![0.25]);
    }

    #[test]
    fn test_horizontal_predictor_u16() {
        // Row of 3 pixels: 100, +5, -2
        let mut data = Vec::new();
        for v in [100u16, 5, 65534] {
            data.extend_from_slice(&v.to_ne_bytes());
        }
        undo_horizontal_predictor(&mut data, SampleType::U16, 3, 1);
        let samples = decode_samples(&data, SampleType::U16, native_order());
        assert_eq!(samples, vec![100.0, 105.0, 103.0]);
    }

    #[test]
    fn test_horizontal_predictor_u8_interleaved() {
        // Two pixels of two samples each
        let mut data = vec![10u8, 20, 1, 2];
        undo_horizontal_predictor(&mut data, SampleType::U8, 2, 2);
        assert_eq!(data, vec![10, 20, 11, 22]);
    }
}
