use std::convert::TryInto;

use crate::error::{Error, Result};
use crate::types::{Int96, NativeType};

/// Decodes `num_values` little-endian fixed-width values.
pub fn decode_native<T: NativeType>(values: &[u8], num_values: usize) -> Result<Vec<T>> {
    let size = std::mem::size_of::<T>();
    if values.len() < num_values * size {
        return Err(Error::CorruptPage(format!(
            "{} bytes cannot hold {} plain values of {} bytes",
            values.len(),
            num_values,
            size
        )));
    }
    Ok(values[..num_values * size]
        .chunks_exact(size)
        .map(|chunk| T::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}

/// Decodes `num_values` booleans, bit-packed LSB first.
pub fn decode_boolean(values: &[u8], num_values: usize) -> Result<Vec<bool>> {
    if values.len() * 8 < num_values {
        return Err(Error::CorruptPage(format!(
            "{} bytes cannot hold {} plain booleans",
            values.len(),
            num_values
        )));
    }
    Ok((0..num_values)
        .map(|i| values[i / 8] >> (i % 8) & 1 == 1)
        .collect())
}

/// Decodes `num_values` byte arrays, each a 4-byte little-endian length
/// followed by that many bytes.
pub fn decode_byte_array(mut values: &[u8], num_values: usize) -> Result<Vec<Vec<u8>>> {
    let mut decoded = Vec::with_capacity(num_values);
    for _ in 0..num_values {
        let length = super::get_length(values).ok_or_else(|| {
            Error::CorruptPage("byte array length prefix is truncated".to_string())
        })? as usize;
        values = &values[4..];
        if length > values.len() {
            return Err(Error::CorruptPage(format!(
                "byte array of {} bytes ends past the page",
                length
            )));
        }
        decoded.push(values[..length].to_vec());
        values = &values[length..];
    }
    Ok(decoded)
}

/// Decodes `num_values` fixed-size byte arrays of `size` bytes each.
pub fn decode_fixed_len_byte_array(
    values: &[u8],
    size: usize,
    num_values: usize,
) -> Result<Vec<Vec<u8>>> {
    if values.len() < num_values * size {
        return Err(Error::CorruptPage(format!(
            "{} bytes cannot hold {} fixed arrays of {} bytes",
            values.len(),
            num_values,
            size
        )));
    }
    Ok(values[..num_values * size]
        .chunks_exact(size)
        .map(|chunk| chunk.to_vec())
        .collect())
}

/// Decodes `num_values` 96-bit values as three little-endian words each.
pub fn decode_int96(values: &[u8], num_values: usize) -> Result<Vec<Int96>> {
    if values.len() < num_values * 12 {
        return Err(Error::CorruptPage(format!(
            "{} bytes cannot hold {} int96 values",
            values.len(),
            num_values
        )));
    }
    Ok(values[..num_values * 12]
        .chunks_exact(12)
        .map(|chunk| {
            [
                u32::from_le_bytes(chunk[0..4].try_into().unwrap()),
                u32::from_le_bytes(chunk[4..8].try_into().unwrap()),
                u32::from_le_bytes(chunk[8..12].try_into().unwrap()),
            ]
        })
        .collect())
}
