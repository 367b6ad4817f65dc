//! TIFF file construction
//!
//! `TiffBuilder` collects tag payloads and strip data for a single-image
//! TIFF and hands them to the writer. Tags live in a `BTreeMap` so the
//! file layout depends only on the content, which keeps repeated writes
//! of the same grid byte-identical.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use log::debug;

use crate::tiff::builders::writer::WriterBuilder;
use crate::tiff::constants::field_types;
use crate::tiff::errors::TiffResult;

/// Encoded value of one tag, little-endian
#[derive(Debug, Clone, PartialEq)]
pub struct TagPayload {
    /// TIFF field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Encoded values
    pub bytes: Vec<u8>,
}

/// Builder for single-image TIFF files
pub struct TiffBuilder {
    is_big_tiff: bool,
    tags: BTreeMap<u16, TagPayload>,
    strips: Vec<Vec<u8>>,
}

impl TiffBuilder {
    /// Create a new TIFF builder
    pub fn new(is_big_tiff: bool) -> Self {
        debug!("Creating TiffBuilder (is_big_tiff: {})", is_big_tiff);
        TiffBuilder {
            is_big_tiff,
            tags: BTreeMap::new(),
            strips: Vec::new(),
        }
    }

    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Set a tag from a pre-encoded payload, replacing any previous value
    pub fn set_tag(&mut self, tag: u16, payload: TagPayload) {
        self.tags.insert(tag, payload);
    }

    pub fn set_short(&mut self, tag: u16, value: u16) {
        self.set_shorts(tag, &[value]);
    }

    pub fn set_shorts(&mut self, tag: u16, values: &[u16]) {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.set_tag(tag, TagPayload { field_type: field_types::SHORT, count: values.len() as u64, bytes });
    }

    pub fn set_long(&mut self, tag: u16, value: u32) {
        self.set_tag(tag, TagPayload {
            field_type: field_types::LONG,
            count: 1,
            bytes: value.to_le_bytes().to_vec(),
        });
    }

    pub fn set_doubles(&mut self, tag: u16, values: &[f64]) {
        let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.set_tag(tag, TagPayload { field_type: field_types::DOUBLE, count: values.len() as u64, bytes });
    }

    /// Set an ASCII tag; the NUL terminator is added here
    pub fn set_ascii(&mut self, tag: u16, value: &str) {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.set_tag(tag, TagPayload { field_type: field_types::ASCII, count: bytes.len() as u64, bytes });
    }

    /// Set the (already compressed) strip data, top to bottom
    pub fn set_strips(&mut self, strips: Vec<Vec<u8>>) {
        debug!("Setting {} strips ({} bytes)", strips.len(), strips.iter().map(Vec::len).sum::<usize>());
        self.strips = strips;
    }

    /// Serialize the TIFF into any writer
    pub fn write_to(&self, writer: &mut impl Write) -> TiffResult<()> {
        WriterBuilder::write(self.is_big_tiff, &self.tags, &self.strips, writer)
    }

    /// Write the TIFF file to disk
    pub fn write(&self, output_path: &Path) -> TiffResult<()> {
        debug!("Writing TIFF to {}", output_path.display());
        let file = File::create(output_path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
