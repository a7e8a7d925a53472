//! Footer metadata resolved into this crate's own shapes.
mod column_chunk_metadata;
mod column_descriptor;
mod file_metadata;
mod row_group;
mod schema_descriptor;

pub use column_chunk_metadata::ColumnChunkMetaData;
pub use column_descriptor::ColumnDescriptor;
pub use file_metadata::{FileMetaData, KeyValue};
pub use row_group::RowGroupMetaData;
pub use schema_descriptor::SchemaDescriptor;
