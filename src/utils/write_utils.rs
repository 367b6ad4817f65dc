//! TIFF writing utilities

use crate::tiff::errors::TiffResult;
use std::io::Write;

/// Round an offset up to the next 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    (offset + 3) & !3
}

/// Number of padding bytes needed after a block of `data_len` bytes
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

/// Write zero padding so the next block starts on a 4-byte boundary
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 3][..padding])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        assert_eq!(align_to_4_bytes(0), 0);
        assert_eq!(align_to_4_bytes(1), 4);
        assert_eq!(align_to_4_bytes(8), 8);
        assert_eq!(align_to_4_bytes(166), 168);
    }

    #[test]
    fn test_padding_written() {
        let mut out = Vec::new();
        write_padding(&mut out, 5).unwrap();
        assert_eq!(out, vec![0, 0, 0]);

        let mut out = Vec::new();
        write_padding(&mut out, 8).unwrap();
        assert!(out.is_empty());
    }
}
