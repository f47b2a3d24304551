use crate::error::{ParseError, Result};

/// Borrow `len` bytes at `offset`, failing instead of truncating.
pub fn read_slice(buf: &[u8], offset: u64, len: u64) -> Result<&[u8]> {
    let out_of_range = || ParseError::OutOfRange {
        pos: offset,
        wanted: len,
        len: buf.len() as u64,
    };
    let end = offset.checked_add(len).ok_or_else(out_of_range)?;
    if end > buf.len() as u64 {
        return Err(out_of_range());
    }
    Ok(&buf[offset as usize..end as usize])
}

pub fn hex_dump(bytes: &[u8], start_offset: u64) -> String {
    // Simple hexdump
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + (i as u64) * 16;
        let hexs: String = chunk.iter().map(|b| format!("{:02x} ", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect();
        out.push_str(&format!("{:08x}  {:<48}  |{}|\n", offs, hexs, ascii));
    }
    out
}
