//! Handler for ZSTD compressed data

use log::warn;

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;

/// ZSTD compression handler (compression code 50000)
pub struct ZstdHandler {
    /// Compression level (1-22)
    compression_level: i32,
}

impl ZstdHandler {
    pub fn new() -> Self {
        ZstdHandler { compression_level: 3 }
    }
}

impl Default for ZstdHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressionHandler for ZstdHandler {
    fn decompress(&self, data: &[u8], _expected_len: usize) -> TiffResult<Vec<u8>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        zstd::decode_all(data).map_err(|e| {
            warn!("ZSTD decompression error: {}", e);
            TiffError::GenericError(format!("ZSTD decompression error: {}", e))
        })
    }

    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>> {
        zstd::encode_all(data, self.compression_level)
            .map_err(|e| TiffError::GenericError(format!("ZSTD compression error: {}", e)))
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn code(&self) -> u16 {
        compression::ZSTD
    }
}
