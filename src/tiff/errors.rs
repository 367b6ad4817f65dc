//! Error types for GeoTIFF band decoding and encoding

use std::fmt;
use std::io;

/// Errors raised while reading or writing band rasters
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid TIFF header
    InvalidHeader,
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// The file contains no image directory
    NoImage,
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Unsupported predictor
    UnsupportedPredictor(u64),
    /// Unsupported sample layout (format code, bits per sample)
    UnsupportedSampleType(u16, u16),
    /// Image dimensions not found
    MissingDimensions,
    /// Decoded data does not cover the declared image
    TruncatedData { expected: usize, actual: usize },
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidHeader => write!(f, "Invalid TIFF header"),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::NoImage => write!(f, "File contains no image directory"),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            TiffError::UnsupportedPredictor(p) => write!(f, "Unsupported predictor: {}", p),
            TiffError::UnsupportedSampleType(format, bits) => {
                write!(f, "Unsupported sample type: format {} with {} bits", format, bits)
            }
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::TruncatedData { expected, actual } => {
                write!(f, "Image data truncated: expected {} bytes, got {}", expected, actual)
            }
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
