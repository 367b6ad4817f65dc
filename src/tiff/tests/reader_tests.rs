//! Tests for directory parsing and band decoding

use ndarray::array;

use super::test_utils::{
    create_big_endian_u16_tiff, create_chunky_u16_tiff, create_planar_u16_tiff, create_predictor_u16_tiff,
    create_test_bigtiff_buffer, create_tiled_u8_tiff,
};
use crate::compression::CompressionFactory;
use crate::raster::decoder::decode_band;
use crate::raster::store::read_profile;
use crate::raster::{BandStore, GeoTiffBandStore, Grid, SampleType};
use crate::tiff::constants::{compression, tags};
use crate::tiff::TiffReader;

#[test]
fn test_big_endian_inline_shorts_are_decoded() {
    let mut cursor = create_big_endian_u16_tiff();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();

    assert!(!reader.is_big_tiff());
    assert_eq!(ifd.get_dimensions(), Some((2, 2)));
    assert_eq!(ifd.get_tag_value(tags::BITS_PER_SAMPLE), Some(16));
}

#[test]
fn test_profile_and_pixels_from_big_endian_file() {
    let mut cursor = create_big_endian_u16_tiff();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();

    let profile = read_profile(&mut cursor, &reader, &ifd).unwrap();
    assert_eq!(profile.shape(), (2, 2));
    assert_eq!(profile.dtype, SampleType::U16);
    assert_eq!(profile.nodata.as_deref(), Some("0"));
    assert_eq!(profile.geo.pixel_scale, Some(vec![30.0, 30.0, 0.0]));

    let grid = decode_band(&mut cursor, &reader, &ifd).unwrap();
    assert_eq!(grid[[0, 0]], 1.0);
    assert_eq!(grid[[0, 1]], 2.0);
    assert_eq!(grid[[1, 0]], 3.0);
    assert_eq!(grid[[1, 1]], 4.0);
}

#[test]
fn test_bigtiff_header() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();

    assert!(reader.is_big_tiff());
    assert_eq!(ifd.get_dimensions(), Some((1024, 768)));
}

#[test]
fn test_missing_strips_is_an_error() {
    let mut cursor = create_test_bigtiff_buffer();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();

    // No BitsPerSample: defaults to 1 bit, which bands never use
    assert!(decode_band(&mut cursor, &reader, &ifd).is_err());
}

#[test]
fn test_tiled_band_with_partial_edge_tiles() {
    let mut cursor = create_tiled_u8_tiff();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();
    assert!(ifd.is_tiled());

    let profile = read_profile(&mut cursor, &reader, &ifd).unwrap();
    assert_eq!(profile.shape(), (3, 5));
    assert_eq!(profile.dtype, SampleType::U8);

    let grid = decode_band(&mut cursor, &reader, &ifd).unwrap();
    let expected = Grid::from_shape_fn((3, 5), |(y, x)| (y * 10 + x) as f32);
    assert_eq!(grid, expected);
    assert!(grid.iter().all(|&v| v != 255.0));
}

#[test]
fn test_planar_band_reads_first_sample_plane() {
    let mut cursor = create_planar_u16_tiff();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();

    let profile = read_profile(&mut cursor, &reader, &ifd).unwrap();
    assert_eq!(profile.count, 2);
    assert_eq!(profile.dtype, SampleType::U16);

    let grid = decode_band(&mut cursor, &reader, &ifd).unwrap();
    assert_eq!(grid, array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
}

#[test]
fn test_interleaved_band_reads_first_sample() {
    let mut cursor = create_chunky_u16_tiff();
    let mut reader = TiffReader::new();
    let ifd = reader.read(&mut cursor).unwrap();

    let grid = decode_band(&mut cursor, &reader, &ifd).unwrap();
    assert_eq!(grid, array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]);
}

#[test]
fn test_predictor_band_loads_through_store() {
    let rows = vec![
        vec![1000u16, 1010, 1005, 990, 0, 65535],
        vec![7u16, 7, 7, 7, 7, 7],
    ];
    let expected = array![
        [1000.0f32, 1010.0, 1005.0, 990.0, 0.0, 65535.0],
        [7.0, 7.0, 7.0, 7.0, 7.0, 7.0]
    ];
    let dir = tempfile::tempdir().unwrap();
    let store = GeoTiffBandStore::new("none").unwrap();

    for code in [compression::DEFLATE, compression::ZSTD] {
        let handler = CompressionFactory::create_handler(code as u64).unwrap();
        let cursor = create_predictor_u16_tiff(&rows, code, |raw| handler.compress(raw).unwrap());
        let path = dir.path().join(format!("B5_{}.tif", code));
        std::fs::write(&path, cursor.into_inner()).unwrap();

        let (grid, profile) = store.load_band(&path).unwrap();
        assert_eq!(grid, expected, "compression {}", code);
        assert_eq!(profile.dtype, SampleType::U16);
        assert_eq!(profile.shape(), (2, 6));
    }
}
