use parquet_format_async_temp::{ColumnChunk, ColumnMetaData};

use crate::compression::Compression;
use crate::error::{Error, Result};
use crate::schema::types::PhysicalType;

use super::ColumnDescriptor;

/// The footer's description of one column chunk, paired with the resolved
/// [`ColumnDescriptor`] so decoders know the leaf type and maximum levels.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunkMetaData {
    chunk: ColumnChunk,
    descriptor: ColumnDescriptor,
    compression: Compression,
}

impl ColumnChunkMetaData {
    /// Converts a thrift [`ColumnChunk`], validating its embedded metadata.
    pub fn try_from_thrift(descriptor: ColumnDescriptor, chunk: ColumnChunk) -> Result<Self> {
        let metadata = chunk
            .meta_data
            .as_ref()
            .ok_or_else(|| Error::MalformedFile("column chunk carries no metadata".to_string()))?;
        if metadata.num_values < 0 {
            return Err(Error::MalformedFile(format!(
                "column chunk declares {} values",
                metadata.num_values
            )));
        }
        let compression = metadata.codec.try_into()?;
        Ok(Self {
            chunk,
            descriptor,
            compression,
        })
    }

    fn metadata(&self) -> &ColumnMetaData {
        self.chunk.meta_data.as_ref().unwrap()
    }

    /// The resolved descriptor of this column.
    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// The storage type of this column.
    pub fn physical_type(&self) -> PhysicalType {
        self.descriptor.physical_type()
    }

    /// Total number of values in this column chunk. For a repeated column
    /// this counts level entries, not logical rows.
    pub fn num_values(&self) -> i64 {
        self.metadata().num_values
    }

    /// The codec every page body of this chunk is compressed with.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// The compressed size of all pages, headers included.
    pub fn compressed_size(&self) -> i64 {
        self.metadata().total_compressed_size
    }

    /// The offset of the first data page's header.
    pub fn data_page_offset(&self) -> i64 {
        self.metadata().data_page_offset
    }

    /// The offset of the dictionary page's header, when the chunk has one.
    pub fn dictionary_page_offset(&self) -> Option<i64> {
        self.metadata().dictionary_page_offset
    }

    /// The byte span `(start, length)` of this chunk: from the dictionary
    /// page if present, else from the first data page.
    pub fn byte_range(&self) -> Result<(u64, u64)> {
        let start = self
            .dictionary_page_offset()
            .unwrap_or_else(|| self.data_page_offset());
        let length = self.compressed_size();
        if start < 0 || length < 0 {
            return Err(Error::MalformedFile(format!(
                "column chunk spans [{}, {} bytes)",
                start, length
            )));
        }
        Ok((start as u64, length as u64))
    }
}
