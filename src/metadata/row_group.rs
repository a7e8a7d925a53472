use parquet_format_async_temp::RowGroup;

use crate::error::{Error, Result};

use super::{ColumnChunkMetaData, SchemaDescriptor};

/// One horizontal partition of a file: a chunk per leaf column, all sharing
/// the same row set.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupMetaData {
    /// One chunk per leaf column, in schema order.
    pub columns: Vec<ColumnChunkMetaData>,
    pub num_rows: i64,
    /// Total uncompressed size of this row group's column data.
    pub total_byte_size: i64,
}

impl RowGroupMetaData {
    /// The chunk of the `i`th leaf column.
    pub fn column(&self, i: usize) -> &ColumnChunkMetaData {
        &self.columns[i]
    }

    pub fn columns(&self) -> &[ColumnChunkMetaData] {
        &self.columns
    }

    pub(crate) fn try_from_thrift(
        schema: &SchemaDescriptor,
        row_group: RowGroup,
    ) -> Result<RowGroupMetaData> {
        if schema.num_columns() != row_group.columns.len() {
            return Err(Error::MalformedFile(format!(
                "row group carries {} column chunks for {} leaf columns",
                row_group.columns.len(),
                schema.num_columns()
            )));
        }
        let num_rows = row_group.num_rows;
        let total_byte_size = row_group.total_byte_size;
        let columns = row_group
            .columns
            .into_iter()
            .zip(schema.columns())
            .map(|(chunk, descriptor)| {
                ColumnChunkMetaData::try_from_thrift(descriptor.clone(), chunk)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RowGroupMetaData {
            columns,
            num_rows,
            total_byte_size,
        })
    }
}
