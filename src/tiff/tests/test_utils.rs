use std::io::Cursor;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};

/// Classic big-endian TIFF holding a 2x2 uint16 image in one strip,
/// values 1, 2, 3, 4, with a pixel scale and a GDAL nodata tag
pub fn create_big_endian_u16_tiff() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    // Header
    buffer.write_u16::<BigEndian>(0x4D4D).unwrap(); // MM for big-endian
    buffer.write_u16::<BigEndian>(42).unwrap();     // TIFF magic number
    buffer.write_u32::<BigEndian>(8).unwrap();      // IFD offset

    // IFD at 8: 9 entries -> 2 + 9 * 12 + 4 = 114 bytes, data starts at 122
    let entries: [(u16, u16, u32, u32); 9] = [
        (256, 3, 1, 2),        // ImageWidth SHORT (value in the high half)
        (257, 3, 1, 2),        // ImageLength SHORT
        (258, 3, 1, 16),       // BitsPerSample
        (259, 3, 1, 1),        // Compression none
        (273, 4, 1, 146),      // StripOffsets
        (278, 4, 1, 2),        // RowsPerStrip
        (279, 4, 1, 8),        // StripByteCounts
        (33550, 12, 3, 122),   // ModelPixelScale -> 24 bytes at 122
        (42113, 2, 2, 0),      // GDAL_NODATA "0\0" inline
    ];
    buffer.write_u16::<BigEndian>(entries.len() as u16).unwrap();
    for (tag, field_type, count, value) in entries {
        buffer.write_u16::<BigEndian>(tag).unwrap();
        buffer.write_u16::<BigEndian>(field_type).unwrap();
        buffer.write_u32::<BigEndian>(count).unwrap();
        match field_type {
            3 => {
                buffer.write_u16::<BigEndian>(value as u16).unwrap();
                buffer.write_u16::<BigEndian>(0).unwrap();
            }
            2 => buffer.extend_from_slice(&[b'0', 0, 0, 0]),
            _ => buffer.write_u32::<BigEndian>(value).unwrap(),
        }
    }
    buffer.write_u32::<BigEndian>(0).unwrap(); // No next IFD
    assert_eq!(buffer.len(), 122);

    for scale in [30.0f64, 30.0, 0.0] {
        buffer.write_f64::<BigEndian>(scale).unwrap();
    }
    assert_eq!(buffer.len(), 146);

    for value in [1u16, 2, 3, 4] {
        buffer.write_u16::<BigEndian>(value).unwrap();
    }

    Cursor::new(buffer)
}

/// BigTIFF little-endian header followed by an IFD with only dimensions
pub fn create_test_bigtiff_buffer() -> Cursor<Vec<u8>> {
    let mut buffer = Vec::new();

    buffer.write_u16::<LittleEndian>(0x4949).unwrap(); // II for little-endian
    buffer.write_u16::<LittleEndian>(43).unwrap();     // BigTIFF version
    buffer.write_u16::<LittleEndian>(8).unwrap();      // Offset size
    buffer.write_u16::<LittleEndian>(0).unwrap();      // Reserved
    buffer.write_u64::<LittleEndian>(16).unwrap();     // IFD offset

    buffer.write_u64::<LittleEndian>(2).unwrap();      // Entry count

    buffer.write_u16::<LittleEndian>(256).unwrap();    // ImageWidth
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(1024).unwrap();

    buffer.write_u16::<LittleEndian>(257).unwrap();    // ImageLength
    buffer.write_u16::<LittleEndian>(4).unwrap();      // LONG
    buffer.write_u64::<LittleEndian>(1).unwrap();
    buffer.write_u64::<LittleEndian>(768).unwrap();

    buffer.write_u64::<LittleEndian>(0).unwrap();      // No next IFD

    Cursor::new(buffer)
}

/// One directory entry for `assemble_le_tiff`: tag, field type, count and
/// the little-endian payload bytes
pub type RawEntry = (u16, u16, u32, Vec<u8>);

pub fn le_shorts(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub fn le_longs(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Classic little-endian TIFF with one IFD holding `entries` plus the
/// offset and byte-count tags for `blocks`, which follow the payloads
pub fn assemble_le_tiff(
    mut entries: Vec<RawEntry>,
    blocks: &[Vec<u8>],
    offsets_tag: u16,
    counts_tag: u16,
) -> Cursor<Vec<u8>> {
    let out_of_line = |len: usize| if len > 4 { len } else { 0 };
    let entry_count = entries.len() + 2;
    let ifd_end = 8 + 2 + entry_count * 12 + 4;
    let payload_bytes = entries.iter().map(|e| out_of_line(e.3.len())).sum::<usize>()
        + 2 * out_of_line(4 * blocks.len());

    let mut block_offsets = Vec::with_capacity(blocks.len());
    let mut next_block = ifd_end + payload_bytes;
    for block in blocks {
        block_offsets.push(next_block as u32);
        next_block += block.len();
    }
    let block_counts: Vec<u32> = blocks.iter().map(|b| b.len() as u32).collect();
    entries.push((offsets_tag, 4, blocks.len() as u32, le_longs(&block_offsets)));
    entries.push((counts_tag, 4, blocks.len() as u32, le_longs(&block_counts)));
    entries.sort_by_key(|e| e.0);

    let mut buffer = Vec::new();
    buffer.write_u16::<LittleEndian>(0x4949).unwrap();
    buffer.write_u16::<LittleEndian>(42).unwrap();
    buffer.write_u32::<LittleEndian>(8).unwrap();

    buffer.write_u16::<LittleEndian>(entry_count as u16).unwrap();
    let mut next_payload = ifd_end;
    for (tag, field_type, count, bytes) in &entries {
        buffer.write_u16::<LittleEndian>(*tag).unwrap();
        buffer.write_u16::<LittleEndian>(*field_type).unwrap();
        buffer.write_u32::<LittleEndian>(*count).unwrap();
        if bytes.len() > 4 {
            buffer.write_u32::<LittleEndian>(next_payload as u32).unwrap();
            next_payload += bytes.len();
        } else {
            let mut field = [0u8; 4];
            field[..bytes.len()].copy_from_slice(bytes);
            buffer.extend_from_slice(&field);
        }
    }
    buffer.write_u32::<LittleEndian>(0).unwrap(); // No next IFD
    assert_eq!(buffer.len(), ifd_end);

    for (_, _, _, bytes) in &entries {
        if bytes.len() > 4 {
            buffer.extend_from_slice(bytes);
        }
    }
    assert_eq!(buffer.len(), ifd_end + payload_bytes);

    for block in blocks {
        buffer.extend_from_slice(block);
    }

    Cursor::new(buffer)
}

/// 5x3 uint8 image in 4x2 tiles, so the right and bottom tiles are
/// partial; pixel (y, x) holds `y * 10 + x` and tile padding holds 255
pub fn create_tiled_u8_tiff() -> Cursor<Vec<u8>> {
    let (width, height, tile_width, tile_height) = (5usize, 3usize, 4usize, 2usize);

    let mut tiles = Vec::new();
    for tile_row in 0..height.div_ceil(tile_height) {
        for tile_col in 0..width.div_ceil(tile_width) {
            let mut tile = Vec::with_capacity(tile_width * tile_height);
            for r in 0..tile_height {
                for c in 0..tile_width {
                    let (y, x) = (tile_row * tile_height + r, tile_col * tile_width + c);
                    tile.push(if y < height && x < width { (y * 10 + x) as u8 } else { 255 });
                }
            }
            tiles.push(tile);
        }
    }

    let entries = vec![
        (256, 3, 1, le_shorts(&[width as u16])),       // ImageWidth
        (257, 3, 1, le_shorts(&[height as u16])),      // ImageLength
        (258, 3, 1, le_shorts(&[8])),                  // BitsPerSample
        (259, 3, 1, le_shorts(&[1])),                  // Compression none
        (322, 3, 1, le_shorts(&[tile_width as u16])),  // TileWidth
        (323, 3, 1, le_shorts(&[tile_height as u16])), // TileLength
    ];
    assemble_le_tiff(entries, &tiles, 324, 325)
}

/// 3x2 uint16 image with two samples per pixel in one strip per sample
/// plane (PlanarConfiguration 2); the first plane holds 1..=6 and the
/// second 101..=106
pub fn create_planar_u16_tiff() -> Cursor<Vec<u8>> {
    let first: Vec<u16> = (1..=6).collect();
    let second: Vec<u16> = (101..=106).collect();

    let entries = vec![
        (256, 3, 1, le_shorts(&[3])),       // ImageWidth
        (257, 3, 1, le_shorts(&[2])),       // ImageLength
        (258, 3, 2, le_shorts(&[16, 16])),  // BitsPerSample, per sample
        (259, 3, 1, le_shorts(&[1])),       // Compression none
        (277, 3, 1, le_shorts(&[2])),       // SamplesPerPixel
        (278, 3, 1, le_shorts(&[2])),       // RowsPerStrip
        (284, 3, 1, le_shorts(&[2])),       // PlanarConfiguration separate
    ];
    assemble_le_tiff(entries, &[le_shorts(&first), le_shorts(&second)], 273, 279)
}

/// The same two-sample image interleaved in one strip
pub fn create_chunky_u16_tiff() -> Cursor<Vec<u8>> {
    let interleaved: Vec<u16> = (1..=6).flat_map(|v| [v, v + 100]).collect();

    let entries = vec![
        (256, 3, 1, le_shorts(&[3])),
        (257, 3, 1, le_shorts(&[2])),
        (258, 3, 2, le_shorts(&[16, 16])),
        (259, 3, 1, le_shorts(&[1])),
        (277, 3, 1, le_shorts(&[2])),
        (278, 3, 1, le_shorts(&[2])),
    ];
    assemble_le_tiff(entries, &[le_shorts(&interleaved)], 273, 279)
}

/// Horizontal differences of one row of uint16 samples, as written with
/// Predictor 2
pub fn horizontal_differences(row: &[u16]) -> Vec<u16> {
    let mut previous = 0u16;
    row.iter()
        .map(|&value| {
            let delta = value.wrapping_sub(previous);
            previous = value;
            delta
        })
        .collect()
}

/// uint16 image of `rows`, compressed whole as one strip with `compression`
/// after applying horizontal differencing (Predictor 2)
pub fn create_predictor_u16_tiff(rows: &[Vec<u16>], compression: u16, packed: impl Fn(&[u8]) -> Vec<u8>) -> Cursor<Vec<u8>> {
    let width = rows[0].len();
    let raw: Vec<u8> = rows.iter().flat_map(|row| le_shorts(&horizontal_differences(row))).collect();

    let entries = vec![
        (256, 3, 1, le_shorts(&[width as u16])),
        (257, 3, 1, le_shorts(&[rows.len() as u16])),
        (258, 3, 1, le_shorts(&[16])),
        (259, 3, 1, le_shorts(&[compression])),
        (278, 3, 1, le_shorts(&[rows.len() as u16])),
        (317, 3, 1, le_shorts(&[2])),       // Predictor horizontal
    ];
    assemble_le_tiff(entries, &[packed(&raw)], 273, 279)
}
