use std::convert::TryInto;

pub mod bitpacked;
pub mod byte_stream_split;
pub mod delta_bitpacked;
pub mod delta_byte_array;
pub mod delta_length_byte_array;
pub mod hybrid_rle;
pub mod plain;
pub mod uleb128;
pub mod zigzag_leb128;

pub use crate::bridge::Encoding;

/// Reads the little-endian `u32` length prefix of a level stream.
pub fn get_length(values: &[u8]) -> Option<u32> {
    values
        .get(0..4)
        .map(|bytes| u32::from_le_bytes(bytes.try_into().unwrap()))
}

/// The number of bytes needed to hold `bits` bits.
#[inline]
pub fn ceil8(bits: usize) -> usize {
    (bits + 7) / 8
}
