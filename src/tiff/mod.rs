//! TIFF/GeoTIFF codec
//!
//! Structures and routines for reading band files and writing
//! single-band index outputs.

pub mod errors;
pub mod ifd;
pub mod reader;
pub mod builder;
pub mod builders;
pub mod constants;
#[cfg(test)]
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use builder::TiffBuilder;
