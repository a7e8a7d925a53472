use std::convert::TryInto;

use parquet_format_async_temp::thrift::protocol::TCompactInputProtocol;
use parquet_format_async_temp::FileMetaData as TFileMetaData;

use crate::error::{Error, Result};
use crate::metadata::{FileMetaData, RowGroupMetaData, SchemaDescriptor};
use crate::source::ByteSource;
use crate::{FOOTER_SIZE, HEADER_SIZE, PARQUET_MAGIC};

// Layout of a Parquet file
// +---------+---------------------------+-----+------+
// |  PAR1   |      Rest of file         |  B  |  A   |
// +---------+---------------------------+-----+------+
// where A: little-endian metadata length + magic, B: thrift metadata.

/// Reads a file's metadata from its footer and resolves the schema.
pub fn read_metadata(source: &ByteSource) -> Result<FileMetaData> {
    let file_size = source.len();
    if file_size < HEADER_SIZE + FOOTER_SIZE {
        return Err(Error::MalformedFile(format!(
            "a file of {} bytes cannot hold the magic and footer",
            file_size
        )));
    }

    if source.slice(0, 4)? != PARQUET_MAGIC {
        return Err(Error::MalformedFile("leading magic is missing".to_string()));
    }
    let footer = source.slice(file_size - FOOTER_SIZE, FOOTER_SIZE as usize)?;
    if footer[4..] != PARQUET_MAGIC {
        return Err(Error::MalformedFile("trailing magic is missing".to_string()));
    }

    let metadata_len: u64 = u32::from_le_bytes(footer[..4].try_into().unwrap()) as u64;
    if FOOTER_SIZE + metadata_len > file_size - HEADER_SIZE {
        return Err(Error::MalformedFile(format!(
            "footer of {} bytes starts before the file does",
            metadata_len
        )));
    }

    let metadata_bytes = source.slice(
        file_size - FOOTER_SIZE - metadata_len,
        metadata_len as usize,
    )?;
    let mut prot = TCompactInputProtocol::new(metadata_bytes);
    let metadata = TFileMetaData::read_from_in_protocol(&mut prot)
        .map_err(|e| Error::MalformedFile(format!("could not parse metadata: {}", e)))?;

    deserialize_metadata(metadata)
}

/// Converts the thrift metadata into this crate's [`FileMetaData`].
pub(crate) fn deserialize_metadata(metadata: TFileMetaData) -> Result<FileMetaData> {
    let elements = metadata.schema.iter().collect::<Vec<_>>();
    let schema_descr = SchemaDescriptor::try_from_thrift(&elements)?;

    let row_groups = metadata
        .row_groups
        .into_iter()
        .map(|rg| RowGroupMetaData::try_from_thrift(&schema_descr, rg))
        .collect::<Result<Vec<_>>>()?;

    Ok(FileMetaData {
        version: metadata.version,
        num_rows: metadata.num_rows,
        created_by: metadata.created_by,
        row_groups,
        key_value_metadata: metadata.key_value_metadata,
        schema_descr,
    })
}
