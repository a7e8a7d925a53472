use crate::encoding::{get_length, hybrid_rle, Encoding};
use crate::error::{Error, Result};

/// The number of bits required to represent levels up to `max_level`.
#[inline]
pub fn get_bit_width(max_level: i16) -> u32 {
    64 - (max_level as u64).leading_zeros()
}

/// Splits a data page v1 body into its (rep, def, values) streams. The level
/// streams carry their byte length inline.
pub fn split_buffer_v1(buffer: &[u8], has_rep: bool, has_def: bool) -> Result<(&[u8], &[u8], &[u8])> {
    let (rep, buffer) = if has_rep {
        split_level_stream(buffer)?
    } else {
        (&[] as &[u8], buffer)
    };

    let (def, buffer) = if has_def {
        split_level_stream(buffer)?
    } else {
        (&[] as &[u8], buffer)
    };

    Ok((rep, def, buffer))
}

fn split_level_stream(buffer: &[u8]) -> Result<(&[u8], &[u8])> {
    let length = get_length(buffer).ok_or_else(|| {
        Error::CorruptPage("level stream length prefix is truncated".to_string())
    })? as usize;
    let buffer = &buffer[4..];
    if length > buffer.len() {
        return Err(Error::CorruptPage(format!(
            "level stream of {} bytes ends past the page",
            length
        )));
    }
    Ok(buffer.split_at(length))
}

/// Splits a data page v2 body into its (rep, def, values) streams. The level
/// byte lengths come from the page header.
pub fn split_buffer_v2(
    buffer: &[u8],
    rep_levels_byte_length: usize,
    def_levels_byte_length: usize,
) -> Result<(&[u8], &[u8], &[u8])> {
    let levels_length = rep_levels_byte_length + def_levels_byte_length;
    if levels_length > buffer.len() {
        return Err(Error::CorruptPage(format!(
            "level streams of {} bytes end past the page",
            levels_length
        )));
    }
    Ok((
        &buffer[..rep_levels_byte_length],
        &buffer[rep_levels_byte_length..levels_length],
        &buffer[levels_length..],
    ))
}

/// Decodes a level stream into one small integer per value.
///
/// `max_level == 0` means the stream is absent and every value sits at that
/// level; this is represented as `None`.
pub fn decode_levels(
    values: &[u8],
    max_level: i16,
    encoding: Encoding,
    num_values: usize,
) -> Result<Option<Vec<u32>>> {
    if max_level == 0 {
        return Ok(None);
    }
    match encoding {
        Encoding::Rle => {
            let num_bits = get_bit_width(max_level);
            hybrid_rle::decode(values, num_bits, num_values).map(Some)
        }
        other => Err(Error::UnsupportedEncoding(format!(
            "level encoding {:?}",
            other
        ))),
    }
}
