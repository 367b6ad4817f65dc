//! Image File Directory (IFD) structures
//!
//! An IFD is the tag table describing one image in a TIFF file. Band
//! files only ever use their first IFD; overviews that may follow it
//! are not read.

use std::collections::HashMap;
use std::fmt;
use log::trace;

use crate::tiff::constants::{field_types, tags};

/// Represents an entry in an Image File Directory (IFD)
///
/// `value_offset` holds the decoded scalar for single inline values and
/// the file offset for out-of-line values. `raw_value` keeps the value
/// field exactly as stored so packed inline arrays (e.g. two SHORTs) can
/// still be decoded.
#[derive(Debug, Clone)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
    /// Raw value field bytes (4 used for classic TIFF, 8 for BigTIFF)
    pub raw_value: [u8; 8],
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64, raw_value: [u8; 8]) -> Self {
        Self {
            tag,
            field_type,
            count,
            value_offset,
            raw_value,
        }
    }

    /// Size in bytes of a single value of this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        field_type_size(self.field_type)
    }

    /// Total size in bytes of all values of this entry
    pub fn byte_len(&self) -> usize {
        self.get_field_type_size() * self.count as usize
    }

    /// Determines if the value is stored inline in the value field
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        let is_inline = self.byte_len() <= inline_size;

        trace!("Tag {} value storage: {} bytes, {} inline", self.tag, self.byte_len(),
               if is_inline { "is" } else { "not" });

        is_inline
    }
}

/// Size in bytes of one value of a TIFF field type
pub fn field_type_size(field_type: u16) -> usize {
    match field_type {
        field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
        field_types::SHORT | field_types::SSHORT => 2,
        field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
        field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
        field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
        _ => 1,
    }
}

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD, in file order
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Tag lookup
    tag_map: HashMap<u16, IFDEntry>,
}

impl IFD {
    /// Creates an empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry to this IFD
    pub fn add_entry(&mut self, entry: IFDEntry) {
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag's scalar value (or offset for out-of-line values)
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the image, if both tags are present
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel (default 1 if not specified)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Whether pixel data is organised in tiles rather than strips
    pub fn is_tiled(&self) -> bool {
        self.has_tag(tags::TILE_OFFSETS)
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;
        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }
        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        writeln!(f, "  Layout: {}", if self.is_tiled() { "tiled" } else { "stripped" })
    }
}
