use super::uleb128;
use crate::error::Result;

/// Decodes a zigzag ULEB128-encoded integer from the front of `bytes`,
/// returning the value and how many bytes it occupied.
pub fn decode(bytes: &[u8]) -> Result<(i64, usize)> {
    let (unsigned, read) = uleb128::decode(bytes)?;
    Ok(((unsigned >> 1) as i64 ^ -((unsigned & 1) as i64), read))
}
