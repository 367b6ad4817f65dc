//! TIFF/BigTIFF directory reader
//!
//! Parses the header and first image directory of a band file and
//! decodes tag payloads. Pixel data is handled by `raster::decoder`.

use log::{debug, warn};
use std::io::{Cursor, Read, SeekFrom};

use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::io::SeekableReader;
use crate::tiff::constants::{field_types, header};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};

/// Reader for TIFF and BigTIFF directories
pub struct TiffReader {
    /// Byte order detected from the header
    byte_order: Option<ByteOrder>,
    /// Handler matching `byte_order`
    handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order: None,
            handler: None,
            is_big_tiff: false,
        }
    }

    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Byte order of the file, once the header has been read
    pub fn byte_order(&self) -> TiffResult<ByteOrder> {
        self.byte_order
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Reads the header and the first IFD
    ///
    /// Band files carry the full-resolution grid in their first IFD;
    /// any overview directories chained after it are ignored.
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(0))?;
        let byte_order = ByteOrder::detect(reader)?;
        debug!("Detected byte order: {}", byte_order.name());
        self.byte_order = Some(byte_order);
        self.handler = Some(byte_order.create_handler());

        let first_ifd_offset = self.read_version_and_offset(reader)?;
        let file_size = reader.seek(SeekFrom::End(0))?;

        if first_ifd_offset == 0 {
            return Err(TiffError::NoImage);
        }
        if first_ifd_offset >= file_size {
            return Err(TiffError::GenericError(format!(
                "First IFD offset {} exceeds file size {}", first_ifd_offset, file_size)));
        }

        self.read_ifd(reader, first_ifd_offset, 0)
    }

    fn read_version_and_offset(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<u64> {
        let version = self.handler()?.read_u16(reader)?;
        match version {
            header::TIFF_VERSION => {
                self.is_big_tiff = false;
                Ok(self.handler()?.read_u32(reader)? as u64)
            }
            header::BIG_TIFF_VERSION => {
                self.is_big_tiff = true;
                let handler = self.handler()?;
                let offset_size = handler.read_u16(reader)?;
                let _reserved = handler.read_u16(reader)?;
                if offset_size != header::BIGTIFF_OFFSET_SIZE {
                    return Err(TiffError::InvalidHeader);
                }
                Ok(handler.read_u64(reader)?)
            }
            other => Err(TiffError::UnsupportedVersion(other)),
        }
    }

    /// Reads the IFD at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;

        let handler = self.handler()?;
        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} at offset {} has {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            ifd.add_entry(self.read_ifd_entry(reader)?);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader) -> TiffResult<IFDEntry> {
        let handler = self.handler()?;
        let byte_order = self.byte_order()?;

        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u32(reader)? as u64
        };

        let mut raw_value = [0u8; 8];
        let field_len = if self.is_big_tiff { 8 } else { 4 };
        reader.read_exact(&mut raw_value[..field_len])?;

        let mut entry = IFDEntry::new(tag, field_type, count, 0, raw_value);
        entry.value_offset = if entry.is_value_inline(self.is_big_tiff) && count == 1 {
            match field_type {
                field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => raw_value[0] as u64,
                field_types::SHORT | field_types::SSHORT => byte_order.u16_from(&raw_value) as u64,
                field_types::LONG | field_types::SLONG | field_types::FLOAT => byte_order.u32_from(&raw_value) as u64,
                _ => byte_order.u64_from(&raw_value),
            }
        } else if self.is_big_tiff {
            byte_order.u64_from(&raw_value)
        } else {
            byte_order.u32_from(&raw_value) as u64
        };

        Ok(entry)
    }

    /// Returns the raw payload bytes of an entry, in file byte order
    pub fn entry_bytes(&self, reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<Vec<u8>> {
        let len = entry.byte_len();
        if entry.is_value_inline(self.is_big_tiff) {
            return Ok(entry.raw_value[..len].to_vec());
        }

        let mut buffer = vec![0u8; len];
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads an integer-typed tag as a vector of u64
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let bytes = self.entry_bytes(reader, entry)?;
        let handler = self.handler()?;
        let mut cursor = Cursor::new(bytes);

        let mut values = Vec::with_capacity(entry.count as usize);
        for _ in 0..entry.count {
            let value = match entry.field_type {
                field_types::BYTE | field_types::UNDEFINED => {
                    let mut b = [0u8; 1];
                    cursor.read_exact(&mut b)?;
                    b[0] as u64
                }
                field_types::SHORT => handler.read_u16(&mut cursor)? as u64,
                field_types::LONG => handler.read_u32(&mut cursor)? as u64,
                field_types::LONG8 | field_types::IFD8 => handler.read_u64(&mut cursor)?,
                other => return Err(TiffError::UnsupportedFieldType(other)),
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Reads a floating point tag (DOUBLE or FLOAT) as a vector of f64
    pub fn read_f64_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        let bytes = self.entry_bytes(reader, entry)?;
        let handler = self.handler()?;
        let mut cursor = Cursor::new(bytes);

        let mut values = Vec::with_capacity(entry.count as usize);
        for _ in 0..entry.count {
            let value = match entry.field_type {
                field_types::DOUBLE => handler.read_f64(&mut cursor)?,
                field_types::FLOAT => handler.read_f32(&mut cursor)? as f64,
                other => return Err(TiffError::UnsupportedFieldType(other)),
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Reads an ASCII tag, trailing NULs removed
    pub fn read_ascii(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<String> {
        let entry = ifd.get_entry(tag).ok_or(TiffError::TagNotFound(tag))?;
        if entry.field_type != field_types::ASCII {
            warn!("Tag {} declared as type {}, reading as ASCII", tag, entry.field_type);
        }

        let mut bytes = self.entry_bytes(reader, entry)?;
        while bytes.last() == Some(&0) {
            bytes.pop();
        }

        String::from_utf8(bytes)
            .map_err(|e| TiffError::GenericError(format!("Invalid UTF-8 in tag {}: {}", tag, e)))
    }
}
