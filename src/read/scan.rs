use log::debug;
use parquet_format_async_temp::thrift::protocol::TCompactInputProtocol;
use parquet_format_async_temp::PageHeader;

use crate::bridge::{DataPageHeaderExt, PageType};
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::metadata::ColumnChunkMetaData;
use crate::page::{PageInfo, PageKind};
use crate::source::ByteSource;

/// Walks the page headers of `chunk` and returns one [`PageInfo`] per page,
/// in file order.
///
/// The walk starts at the dictionary page when the chunk has one, otherwise at
/// the first data page, and stops once the data pages account for the chunk's
/// declared value count or the next offset would leave the chunk's byte span.
pub fn scan_pages(chunk: &ColumnChunkMetaData, source: &ByteSource) -> Result<Vec<PageInfo>> {
    let (start, length) = chunk.byte_range()?;
    let end = start + length;
    let total_values = chunk.num_values() as usize;
    let codec = chunk.compression();

    let mut pages = Vec::new();
    let mut offset = start;
    let mut seen_values = 0usize;
    let mut seen_dictionary = false;

    while seen_values < total_values && offset < end {
        let remaining = source.slice(offset, (end - offset) as usize)?;
        let mut reader = remaining;
        let header = {
            let mut prot = TCompactInputProtocol::new(&mut reader);
            PageHeader::read_from_in_protocol(&mut prot)
                .map_err(|e| Error::MalformedPage(format!("header at {}: {}", offset, e)))?
        };
        let header_size = (remaining.len() - reader.len()) as u64;
        let body_offset = offset + header_size;

        if header.compressed_page_size <= 0 {
            return Err(Error::MalformedPage(format!(
                "page at {} declares {} compressed bytes",
                offset, header.compressed_page_size
            )));
        }
        if header.uncompressed_page_size < 0 {
            return Err(Error::MalformedPage(format!(
                "page at {} declares {} uncompressed bytes",
                offset, header.uncompressed_page_size
            )));
        }
        let compressed_size = header.compressed_page_size as usize;
        let uncompressed_size = header.uncompressed_page_size as usize;

        let kind: PageType = header.type_.try_into()?;
        let info = match kind {
            PageType::DictionaryPage => {
                if seen_dictionary || !pages.is_empty() {
                    return Err(Error::MalformedPage(format!(
                        "second or late dictionary page at {}",
                        offset
                    )));
                }
                let dict_header = header.dictionary_page_header.as_ref().ok_or_else(|| {
                    Error::MalformedPage(format!("dictionary page at {} has no header", offset))
                })?;
                if dict_header.num_values < 0 {
                    return Err(Error::MalformedPage(format!(
                        "dictionary page at {} declares {} values",
                        offset, dict_header.num_values
                    )));
                }
                seen_dictionary = true;
                PageInfo {
                    kind: PageKind::Dictionary,
                    offset: body_offset,
                    compressed_size,
                    uncompressed_size,
                    num_values: dict_header.num_values as usize,
                    codec,
                    encoding: Encoding::Plain,
                    rep_level_encoding: Encoding::Rle,
                    def_level_encoding: Encoding::Rle,
                    rep_levels_byte_length: 0,
                    def_levels_byte_length: 0,
                    is_compressed: true,
                    has_dictionary: false,
                }
            }
            PageType::DataPage => {
                let data_header = header.data_page_header.as_ref().ok_or_else(|| {
                    Error::MalformedPage(format!("data page at {} has no header", offset))
                })?;
                if data_header.num_values < 0 {
                    return Err(Error::MalformedPage(format!(
                        "data page at {} declares {} values",
                        offset, data_header.num_values
                    )));
                }
                seen_values += data_header.num_values as usize;
                PageInfo {
                    kind: PageKind::DataV1,
                    offset: body_offset,
                    compressed_size,
                    uncompressed_size,
                    num_values: data_header.num_values as usize,
                    codec,
                    encoding: data_header.encoding()?,
                    rep_level_encoding: data_header.repetition_level_encoding()?,
                    def_level_encoding: data_header.definition_level_encoding()?,
                    rep_levels_byte_length: 0,
                    def_levels_byte_length: 0,
                    is_compressed: true,
                    has_dictionary: seen_dictionary,
                }
            }
            PageType::DataPageV2 => {
                let data_header = header.data_page_header_v2.as_ref().ok_or_else(|| {
                    Error::MalformedPage(format!("data page v2 at {} has no header", offset))
                })?;
                if data_header.num_values < 0
                    || data_header.repetition_levels_byte_length < 0
                    || data_header.definition_levels_byte_length < 0
                {
                    return Err(Error::MalformedPage(format!(
                        "data page v2 at {} declares negative counts",
                        offset
                    )));
                }
                seen_values += data_header.num_values as usize;
                PageInfo {
                    kind: PageKind::DataV2,
                    offset: body_offset,
                    compressed_size,
                    uncompressed_size,
                    num_values: data_header.num_values as usize,
                    codec,
                    encoding: data_header.encoding()?,
                    rep_level_encoding: Encoding::Rle,
                    def_level_encoding: Encoding::Rle,
                    rep_levels_byte_length: data_header.repetition_levels_byte_length as usize,
                    def_levels_byte_length: data_header.definition_levels_byte_length as usize,
                    // when the flag is missing the page is considered compressed
                    is_compressed: data_header.is_compressed.unwrap_or(true),
                    has_dictionary: seen_dictionary,
                }
            }
        };
        pages.push(info);
        offset = body_offset + compressed_size as u64;
    }

    debug!(
        "scanned {} pages ({} values) for column {:?}",
        pages.len(),
        seen_values,
        chunk.descriptor().path_in_schema
    );
    Ok(pages)
}
