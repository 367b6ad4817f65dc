//! TIFF writing
//!
//! Lays out a single-IFD file as header, directory, out-of-line tag
//! payloads (ascending tag order), then strips. Offsets are planned up
//! front so the file is written in one forward pass.

use std::collections::BTreeMap;
use std::io::Write;

use crate::tiff::builder::TagPayload;
use crate::tiff::constants::{field_types, header, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::utils::write_utils;

/// Handles writing TIFF files
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete single-image TIFF
    pub fn write(
        is_big_tiff: bool,
        tag_payloads: &BTreeMap<u16, TagPayload>,
        strips: &[Vec<u8>],
        writer: &mut impl Write,
    ) -> TiffResult<()> {
        if strips.is_empty() {
            return Err(TiffError::GenericError("No strip data to write".to_string()));
        }

        let mut entries = tag_payloads.clone();
        Self::add_strip_tags(&mut entries, strips, is_big_tiff);

        let header_size: u64 = if is_big_tiff { 16 } else { 8 };
        let ifd_size = Self::calculate_ifd_size(entries.len() as u64, is_big_tiff);
        let inline_size = if is_big_tiff { 8 } else { 4 };

        // First pass: out-of-line tag payloads follow the IFD
        let mut current_offset = write_utils::align_to_4_bytes(header_size + ifd_size);
        let mut payload_offsets = BTreeMap::new();
        for (tag, payload) in &entries {
            if payload.bytes.len() > inline_size {
                payload_offsets.insert(*tag, current_offset);
                current_offset = write_utils::align_to_4_bytes(current_offset + payload.bytes.len() as u64);
            }
        }

        // Second pass: strips
        let mut strip_offsets = Vec::with_capacity(strips.len());
        for strip in strips {
            strip_offsets.push(current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + strip.len() as u64);
        }

        if !is_big_tiff && current_offset > u32::MAX as u64 {
            return Err(TiffError::GenericError(format!(
                "File size {} exceeds classic TIFF limits, BigTIFF required", current_offset)));
        }

        if let Some(payload) = entries.get_mut(&tags::STRIP_OFFSETS) {
            payload.bytes = Self::encode_offsets(&strip_offsets, is_big_tiff);
        }

        Self::write_header(writer, is_big_tiff, header_size)?;
        Self::write_ifd(writer, &entries, &payload_offsets, is_big_tiff)?;
        write_utils::write_padding(writer, (header_size + ifd_size) as usize)?;

        for (tag, payload) in &entries {
            if payload_offsets.contains_key(tag) {
                writer.write_all(&payload.bytes)?;
                write_utils::write_padding(writer, payload.bytes.len())?;
            }
        }

        for strip in strips {
            writer.write_all(strip)?;
            write_utils::write_padding(writer, strip.len())?;
        }

        Ok(())
    }

    /// Adds StripOffsets (placeholder) and StripByteCounts entries
    fn add_strip_tags(entries: &mut BTreeMap<u16, TagPayload>, strips: &[Vec<u8>], is_big_tiff: bool) {
        let field_type = if is_big_tiff { field_types::LONG8 } else { field_types::LONG };
        let count = strips.len() as u64;
        let byte_counts: Vec<u64> = strips.iter().map(|s| s.len() as u64).collect();

        entries.insert(tags::STRIP_OFFSETS, TagPayload {
            field_type,
            count,
            bytes: Self::encode_offsets(&vec![0; strips.len()], is_big_tiff),
        });
        entries.insert(tags::STRIP_BYTE_COUNTS, TagPayload {
            field_type,
            count,
            bytes: Self::encode_offsets(&byte_counts, is_big_tiff),
        });
    }

    fn encode_offsets(values: &[u64], is_big_tiff: bool) -> Vec<u8> {
        if is_big_tiff {
            values.iter().flat_map(|v| v.to_le_bytes()).collect()
        } else {
            values.iter().flat_map(|v| (*v as u32).to_le_bytes()).collect()
        }
    }

    /// Write the TIFF header, including the first IFD offset
    ///
    /// The IFD directly follows the header.
    fn write_header(writer: &mut impl Write, is_big_tiff: bool, header_size: u64) -> TiffResult<()> {
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?;  // Reserved (always 0)
            writer.write_all(&header_size.to_le_bytes())?;
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&(header_size as u32).to_le_bytes())?;
        }

        Ok(())
    }

    /// Size of an IFD with `entries_count` entries
    fn calculate_ifd_size(entries_count: u64, is_big_tiff: bool) -> u64 {
        if is_big_tiff {
            // count (8) + 20 bytes per entry + next IFD offset (8)
            8 + (20 * entries_count) + 8
        } else {
            // count (2) + 12 bytes per entry + next IFD offset (4)
            2 + (12 * entries_count) + 4
        }
    }

    /// Write the IFD, with inline values or offsets to payloads
    fn write_ifd(
        writer: &mut impl Write,
        entries: &BTreeMap<u16, TagPayload>,
        payload_offsets: &BTreeMap<u16, u64>,
        is_big_tiff: bool,
    ) -> TiffResult<()> {
        let field_len = if is_big_tiff { 8 } else { 4 };

        if is_big_tiff {
            writer.write_all(&(entries.len() as u64).to_le_bytes())?;
        } else {
            writer.write_all(&(entries.len() as u16).to_le_bytes())?;
        }

        for (tag, payload) in entries {
            writer.write_all(&tag.to_le_bytes())?;
            writer.write_all(&payload.field_type.to_le_bytes())?;

            if is_big_tiff {
                writer.write_all(&payload.count.to_le_bytes())?;
            } else {
                writer.write_all(&(payload.count as u32).to_le_bytes())?;
            }

            let mut value_field = vec![0u8; field_len];
            match payload_offsets.get(tag) {
                Some(offset) if is_big_tiff => value_field.copy_from_slice(&offset.to_le_bytes()),
                Some(offset) => value_field.copy_from_slice(&(*offset as u32).to_le_bytes()),
                None => value_field[..payload.bytes.len()].copy_from_slice(&payload.bytes),
            }
            writer.write_all(&value_field)?;
        }

        // Single image: no next IFD
        writer.write_all(&vec![0u8; field_len])?;
        Ok(())
    }
}
