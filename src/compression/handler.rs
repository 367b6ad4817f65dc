//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy for one TIFF compression scheme
pub trait CompressionHandler: Send + Sync {
    /// Decompress one strip or tile; `expected_len` is the decoded size
    /// implied by the image layout and is used as a capacity hint
    fn decompress(&self, data: &[u8], expected_len: usize) -> TiffResult<Vec<u8>>;

    /// Compress one strip
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Name of this compression method
    fn name(&self) -> &'static str;

    /// TIFF Compression tag value
    fn code(&self) -> u16;
}
