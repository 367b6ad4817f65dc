use std::error::Error;
use std::fmt;
use std::io;

use crate::indices::IndexError;
use crate::tiff::errors::TiffError;

/// Errors of batch configuration, scene processing and reporting
#[derive(Debug)]
pub enum BatchError {
    /// I/O error
    IoError(io::Error),
    /// Raster codec error
    TiffError(TiffError),
    /// Index formula error
    IndexError(IndexError),
    /// Invalid configuration value
    ConfigError(String),
    /// Broken invariant inside scene processing
    SceneError(String),
    /// Summary report error
    CsvError(csv::Error),
    /// Worker pool could not be built
    PoolError(String),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::IoError(err) => write!(f, "I/O error: {}", err),
            BatchError::TiffError(err) => write!(f, "Raster error: {}", err),
            BatchError::IndexError(err) => write!(f, "Index error: {}", err),
            BatchError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            BatchError::SceneError(msg) => write!(f, "Scene error: {}", msg),
            BatchError::CsvError(err) => write!(f, "Summary error: {}", err),
            BatchError::PoolError(msg) => write!(f, "Worker pool error: {}", msg),
        }
    }
}

impl Error for BatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BatchError::IoError(err) => Some(err),
            BatchError::TiffError(err) => Some(err),
            BatchError::IndexError(err) => Some(err),
            BatchError::CsvError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BatchError {
    fn from(err: io::Error) -> Self {
        BatchError::IoError(err)
    }
}

impl From<TiffError> for BatchError {
    fn from(err: TiffError) -> Self {
        BatchError::TiffError(err)
    }
}

impl From<IndexError> for BatchError {
    fn from(err: IndexError) -> Self {
        BatchError::IndexError(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        BatchError::CsvError(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for BatchError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        BatchError::PoolError(err.to_string())
    }
}

pub type BatchResult<T> = Result<T, BatchError>;
