use crate::error::{Error, Result};

/// Decodes an ULEB128-encoded integer from the front of `bytes`, returning
/// the value and how many bytes it occupied.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (read, byte) in bytes.iter().enumerate() {
        if shift >= 64 || (shift == 63 && *byte > 1) {
            return Err(Error::CorruptPage("uleb128 overflows u64".to_string()));
        }

        value |= u64::from(byte & 0x7f) << shift;

        if byte & 0x80 == 0 {
            return Ok((value, read + 1));
        }

        shift += 7;
    }
    Err(Error::CorruptPage("uleb128 ended mid-value".to_string()))
}
