//! Handler for Adobe Deflate compressed data

use std::io::{Read, Write};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::tiff::constants::compression;
use crate::tiff::errors::TiffResult;
use super::handler::CompressionHandler;

/// Adobe Deflate (zlib) compression handler (compression code 8)
///
/// Also decodes the pre-standard code 32946, which uses the same stream.
pub struct AdobeDeflateHandler {
    level: Compression,
}

impl AdobeDeflateHandler {
    pub fn new() -> Self {
        AdobeDeflateHandler { level: Compression::default() }
    }
}

impl Default for AdobeDeflateHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for AdobeDeflateHandler {
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(data);
        let mut decompressed = Vec::with_capacity(expected_len);
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), self.level);
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn code(&self) -> u16 {
        compression::DEFLATE
    }
}
