use std::error::Error;
use std::fmt;

/// Errors raised by the index formulas
#[derive(Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Input grids do not share one shape
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// A formula was handed fewer grids than it has band roles
    MissingInput { index: &'static str, band: &'static str },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::ShapeMismatch { expected, found } => write!(
                f,
                "Band shape mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            IndexError::MissingInput { index, band } => {
                write!(f, "{} needs band {} but it was not supplied", index, band)
            }
        }
    }
}

impl Error for IndexError {}

pub type IndexResult<T> = Result<T, IndexError>;
