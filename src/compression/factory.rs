//! Factory for creating compression handlers

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Names accepted for output compression
pub const COMPRESSION_NAMES: [&str; 3] = ["none", "deflate", "zstd"];

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Handler for a TIFF Compression tag value, used when decoding bands
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match code {
            c if c == compression::NONE as u64 => Ok(Box::new(UncompressedHandler)),
            c if c == compression::DEFLATE as u64 || c == compression::DEFLATE_OLD as u64 => {
                Ok(Box::new(AdobeDeflateHandler::new()))
            }
            c if c == compression::ZSTD as u64 => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(code)),
        }
    }

    /// Handler by user-facing name, used when writing index outputs
    pub fn get_handler_by_name(name: &str) -> TiffResult<Box<dyn CompressionHandler>> {
        match name.to_lowercase().as_str() {
            "none" | "uncompressed" => Ok(Box::new(UncompressedHandler)),
            "deflate" | "zip" => Ok(Box::new(AdobeDeflateHandler::new())),
            "zstd" => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::GenericError(format!("Unknown compression type: {}", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_names_resolve() {
        for name in COMPRESSION_NAMES {
            let handler = CompressionFactory::get_handler_by_name(name).unwrap();
            assert_eq!(handler.name(), name);
        }
        let zstd = CompressionFactory::get_handler_by_name("zstd").unwrap();
        assert_eq!(zstd.code(), 50000);
        assert!(CompressionFactory::get_handler_by_name("lzw").is_err());
    }

    #[test]
    fn test_codes_round_trip_data() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
        for code in [1u64, 8, 32946, 50000] {
            let handler = CompressionFactory::create_handler(code).unwrap();
            let packed = handler.compress(&data).unwrap();
            assert_eq!(handler.decompress(&packed, data.len()).unwrap(), data);
        }
        assert!(matches!(
            CompressionFactory::create_handler(5),
            Err(TiffError::UnsupportedCompression(5))
        ));
        assert!(matches!(
            CompressionFactory::create_handler(14),
            Err(TiffError::UnsupportedCompression(14))
        ));
    }
}
