//! Byte-level I/O helpers for the TIFF codec

use std::io::{Read, Seek};

pub mod byte_order;

/// Any source the band reader can parse from: files, cursors over
/// in-memory buffers in tests.
pub trait SeekableReader: Read + Seek + Send + Sync {}

impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
