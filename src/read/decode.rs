use std::sync::Arc;

use log::trace;

use crate::compression::{self, Compression};
use crate::encoding::{
    byte_stream_split, delta_byte_array, delta_length_byte_array, hybrid_rle, plain, Encoding,
};
use crate::encoding::delta_bitpacked;
use crate::error::{Error, Result};
use crate::metadata::ColumnDescriptor;
use crate::page::{DecodedPage, DictPage, PageInfo, PageKind, PageValues};
use crate::schema::types::PhysicalType;
use crate::source::ByteSource;

use super::levels::{decode_levels, split_buffer_v1, split_buffer_v2};

/// Decompresses and decodes a dictionary page into its typed value table.
/// The payload of a dictionary page is always plain-encoded.
pub fn decode_dict_page(
    info: &PageInfo,
    source: &ByteSource,
    descriptor: &ColumnDescriptor,
) -> Result<DictPage> {
    if info.kind != PageKind::Dictionary {
        return Err(Error::MalformedPage(format!(
            "page at {} is not a dictionary page",
            info.offset
        )));
    }
    let input = source.slice(info.offset, info.compressed_size)?;
    let buffer = compression::decompress(info.codec, input, info.uncompressed_size)?;
    let values = decode_plain(&buffer, descriptor.physical_type(), info.num_values)?;
    trace!("decoded dictionary of {} values", values.len());
    Ok(DictPage::new(values))
}

/// Materializes a data page: decompresses it, decodes its level streams and
/// its values.
pub fn decode_page(
    info: &PageInfo,
    source: &ByteSource,
    dictionary: Option<&Arc<DictPage>>,
    descriptor: &ColumnDescriptor,
) -> Result<DecodedPage> {
    let input = source.slice(info.offset, info.compressed_size)?;
    let max_rep = descriptor.max_rep_level;
    let max_def = descriptor.max_def_level;

    match info.kind {
        PageKind::DataV1 => {
            let buffer = compression::decompress(info.codec, input, info.uncompressed_size)?;
            let (rep, def, values_buffer) =
                split_buffer_v1(&buffer, max_rep > 0, max_def > 0)?;
            let rep_levels =
                decode_levels(rep, max_rep, info.rep_level_encoding, info.num_values)?;
            let def_levels =
                decode_levels(def, max_def, info.def_level_encoding, info.num_values)?;
            finish_page(
                info,
                rep_levels,
                def_levels,
                values_buffer,
                dictionary,
                descriptor,
            )
        }
        PageKind::DataV2 => {
            // v2 level streams are never compressed, even when the body is
            let (rep, def, body) =
                split_buffer_v2(input, info.rep_levels_byte_length, info.def_levels_byte_length)?;
            let rep_levels = decode_levels(rep, max_rep, Encoding::Rle, info.num_values)?;
            let def_levels = decode_levels(def, max_def, Encoding::Rle, info.num_values)?;

            let levels_length = info.rep_levels_byte_length + info.def_levels_byte_length;
            let body_length = info.uncompressed_size.checked_sub(levels_length).ok_or_else(|| {
                Error::CorruptPage(format!(
                    "level streams of {} bytes exceed the page's {} uncompressed bytes",
                    levels_length, info.uncompressed_size
                ))
            })?;
            if info.is_compressed && info.codec != Compression::Uncompressed {
                let body = compression::decompress(info.codec, body, body_length)?;
                finish_page(info, rep_levels, def_levels, &body, dictionary, descriptor)
            } else {
                if body.len() != body_length {
                    return Err(Error::CorruptPage(format!(
                        "body of {} bytes declares {}",
                        body.len(),
                        body_length
                    )));
                }
                finish_page(info, rep_levels, def_levels, body, dictionary, descriptor)
            }
        }
        PageKind::Dictionary => Err(Error::MalformedPage(format!(
            "dictionary page at {} where a data page was expected",
            info.offset
        ))),
    }
}

fn finish_page(
    info: &PageInfo,
    rep_levels: Option<Vec<u32>>,
    def_levels: Option<Vec<u32>>,
    values_buffer: &[u8],
    dictionary: Option<&Arc<DictPage>>,
    descriptor: &ColumnDescriptor,
) -> Result<DecodedPage> {
    let max_def = descriptor.max_def_level as u32;
    let num_non_null = def_levels
        .as_ref()
        .map(|levels| levels.iter().filter(|level| **level == max_def).count())
        .unwrap_or(info.num_values);

    let (values, dictionary) = decode_values(
        values_buffer,
        info.encoding,
        descriptor.physical_type(),
        num_non_null,
        dictionary,
    )?;

    Ok(DecodedPage {
        num_values: info.num_values,
        def_levels,
        rep_levels,
        values,
        dictionary,
    })
}

fn decode_values(
    buffer: &[u8],
    encoding: Encoding,
    physical_type: PhysicalType,
    num_values: usize,
    dictionary: Option<&Arc<DictPage>>,
) -> Result<(PageValues, Option<Arc<DictPage>>)> {
    match encoding {
        Encoding::Plain => Ok((decode_plain(buffer, physical_type, num_values)?, None)),
        Encoding::RleDictionary | Encoding::PlainDictionary => {
            let dictionary = dictionary.ok_or_else(|| {
                Error::MalformedPage(
                    "dictionary-encoded page without a preceding dictionary page".to_string(),
                )
            })?;
            let values = decode_dictionary_indices(buffer, dictionary, num_values)?;
            Ok((values, Some(dictionary.clone())))
        }
        Encoding::DeltaBinaryPacked => {
            let decoded = delta_bitpacked::Decoder::try_new(buffer)?
                .collect::<Result<Vec<i64>>>()?;
            if decoded.len() < num_values {
                return Err(Error::CorruptPage(format!(
                    "delta stream holds {} of {} values",
                    decoded.len(),
                    num_values
                )));
            }
            match physical_type {
                PhysicalType::Int32 => Ok((
                    PageValues::Int32(
                        decoded.into_iter().take(num_values).map(|v| v as i32).collect(),
                    ),
                    None,
                )),
                PhysicalType::Int64 => Ok((
                    PageValues::Int64(decoded.into_iter().take(num_values).collect()),
                    None,
                )),
                other => Err(Error::UnsupportedEncoding(format!(
                    "DELTA_BINARY_PACKED on {:?}",
                    other
                ))),
            }
        }
        Encoding::DeltaLengthByteArray => {
            if physical_type != PhysicalType::ByteArray {
                return Err(Error::UnsupportedEncoding(format!(
                    "DELTA_LENGTH_BYTE_ARRAY on {:?}",
                    physical_type
                )));
            }
            let mut decoder = delta_length_byte_array::Decoder::try_new(buffer)?;
            let lengths = decoder
                .by_ref()
                .map(|length| length.map(|l| l as usize))
                .collect::<Result<Vec<_>>>()?;
            if lengths.len() != num_values {
                return Err(Error::CorruptPage(format!(
                    "length stream holds {} of {} values",
                    lengths.len(),
                    num_values
                )));
            }
            let concatenated = decoder.into_values()?;
            let mut offset = 0;
            let values = lengths
                .into_iter()
                .map(|length| {
                    let value = concatenated[offset..offset + length].to_vec();
                    offset += length;
                    value
                })
                .collect();
            Ok((PageValues::ByteArray(values), None))
        }
        Encoding::DeltaByteArray => {
            if physical_type != PhysicalType::ByteArray {
                return Err(Error::UnsupportedEncoding(format!(
                    "DELTA_BYTE_ARRAY on {:?}",
                    physical_type
                )));
            }
            let mut decoder = delta_byte_array::Decoder::try_new(buffer)?;
            let prefix_lengths = decoder
                .by_ref()
                .map(|length| length.map(|l| l as usize))
                .collect::<Result<Vec<_>>>()?;
            if prefix_lengths.len() != num_values {
                return Err(Error::CorruptPage(format!(
                    "prefix stream holds {} of {} values",
                    prefix_lengths.len(),
                    num_values
                )));
            }
            let mut suffixes = decoder.into_suffixes()?;
            let suffix_lengths = suffixes
                .by_ref()
                .map(|length| length.map(|l| l as usize))
                .collect::<Result<Vec<_>>>()?;
            if suffix_lengths.len() != num_values {
                return Err(Error::CorruptPage(format!(
                    "suffix stream holds {} of {} values",
                    suffix_lengths.len(),
                    num_values
                )));
            }
            let concatenated = suffixes.into_values()?;

            let mut values: Vec<Vec<u8>> = Vec::with_capacity(num_values);
            let mut offset = 0;
            for (prefix_length, suffix_length) in
                prefix_lengths.into_iter().zip(suffix_lengths.into_iter())
            {
                let previous = values.last().map(|v| v.as_slice()).unwrap_or(&[]);
                if prefix_length > previous.len() {
                    return Err(Error::CorruptPage(format!(
                        "prefix of {} bytes exceeds the previous value's {}",
                        prefix_length,
                        previous.len()
                    )));
                }
                let mut value = Vec::with_capacity(prefix_length + suffix_length);
                value.extend_from_slice(&previous[..prefix_length]);
                value.extend_from_slice(&concatenated[offset..offset + suffix_length]);
                offset += suffix_length;
                values.push(value);
            }
            Ok((PageValues::ByteArray(values), None))
        }
        Encoding::ByteStreamSplit => match physical_type {
            PhysicalType::Float => Ok((
                PageValues::Float(byte_stream_split::decode(buffer, num_values)?),
                None,
            )),
            PhysicalType::Double => Ok((
                PageValues::Double(byte_stream_split::decode(buffer, num_values)?),
                None,
            )),
            other => Err(Error::UnsupportedEncoding(format!(
                "BYTE_STREAM_SPLIT on {:?}",
                other
            ))),
        },
        other => Err(Error::UnsupportedEncoding(format!(
            "{:?} on a data page",
            other
        ))),
    }
}

fn decode_plain(buffer: &[u8], physical_type: PhysicalType, num_values: usize) -> Result<PageValues> {
    Ok(match physical_type {
        PhysicalType::Boolean => PageValues::Boolean(plain::decode_boolean(buffer, num_values)?),
        PhysicalType::Int32 => PageValues::Int32(plain::decode_native(buffer, num_values)?),
        PhysicalType::Int64 => PageValues::Int64(plain::decode_native(buffer, num_values)?),
        PhysicalType::Int96 => PageValues::Int96(plain::decode_int96(buffer, num_values)?),
        PhysicalType::Float => PageValues::Float(plain::decode_native(buffer, num_values)?),
        PhysicalType::Double => PageValues::Double(plain::decode_native(buffer, num_values)?),
        PhysicalType::ByteArray => {
            PageValues::ByteArray(plain::decode_byte_array(buffer, num_values)?)
        }
        PhysicalType::FixedLenByteArray(size) => PageValues::FixedLenByteArray(
            size,
            plain::decode_fixed_len_byte_array(buffer, size, num_values)?,
        ),
    })
}

fn gather<T: Clone>(table: &[T], indices: &[u32]) -> Result<Vec<T>> {
    indices
        .iter()
        .map(|index| {
            table.get(*index as usize).cloned().ok_or_else(|| {
                Error::CorruptPage(format!(
                    "dictionary index {} out of range for {} entries",
                    index,
                    table.len()
                ))
            })
        })
        .collect()
}

fn decode_dictionary_indices(
    buffer: &[u8],
    dictionary: &DictPage,
    num_values: usize,
) -> Result<PageValues> {
    if num_values == 0 {
        return Ok(empty_like(&dictionary.values));
    }
    let bit_width = *buffer.first().ok_or_else(|| {
        Error::CorruptPage("dictionary-encoded page is missing its bit width".to_string())
    })?;
    if bit_width > 32 {
        return Err(Error::CorruptPage(format!(
            "dictionary bit width {} exceeds 32",
            bit_width
        )));
    }
    let indices = hybrid_rle::decode(&buffer[1..], bit_width as u32, num_values)?;

    Ok(match &dictionary.values {
        PageValues::Boolean(_) => {
            return Err(Error::MalformedPage(
                "booleans cannot be dictionary-encoded".to_string(),
            ))
        }
        PageValues::Int32(table) => PageValues::Int32(gather(table, &indices)?),
        PageValues::Int64(table) => PageValues::Int64(gather(table, &indices)?),
        PageValues::Int96(table) => PageValues::Int96(gather(table, &indices)?),
        PageValues::Float(table) => PageValues::Float(gather(table, &indices)?),
        PageValues::Double(table) => PageValues::Double(gather(table, &indices)?),
        PageValues::ByteArray(table) => PageValues::ByteArray(gather(table, &indices)?),
        PageValues::FixedLenByteArray(size, table) => {
            PageValues::FixedLenByteArray(*size, gather(table, &indices)?)
        }
    })
}

fn empty_like(values: &PageValues) -> PageValues {
    match values {
        PageValues::Boolean(_) => PageValues::Boolean(vec![]),
        PageValues::Int32(_) => PageValues::Int32(vec![]),
        PageValues::Int64(_) => PageValues::Int64(vec![]),
        PageValues::Int96(_) => PageValues::Int96(vec![]),
        PageValues::Float(_) => PageValues::Float(vec![]),
        PageValues::Double(_) => PageValues::Double(vec![]),
        PageValues::ByteArray(_) => PageValues::ByteArray(vec![]),
        PageValues::FixedLenByteArray(size, _) => PageValues::FixedLenByteArray(*size, vec![]),
    }
}
