use crate::schema::types::ParquetType;

use super::{RowGroupMetaData, SchemaDescriptor};

pub type KeyValue = parquet_format_async_temp::KeyValue;

/// Metadata for a Parquet file.
#[derive(Debug, Clone)]
pub struct FileMetaData {
    /// version of this file.
    pub version: i32,
    /// number of rows in the file.
    pub num_rows: i64,
    /// String message for application that wrote this file.
    ///
    /// Typically `<application> version <application version> (build <hash>)`.
    pub created_by: Option<String>,
    /// The row groups of this file.
    pub row_groups: Vec<RowGroupMetaData>,
    /// key_value_metadata of this file.
    pub key_value_metadata: Option<Vec<KeyValue>>,
    /// schema descriptor.
    pub schema_descr: SchemaDescriptor,
}

impl FileMetaData {
    /// Returns the [`SchemaDescriptor`] that describes schema of this file.
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema_descr
    }

    /// Returns the root [`ParquetType`] of the schema.
    pub fn root_schema(&self) -> &ParquetType {
        self.schema_descr.root_schema()
    }
}
