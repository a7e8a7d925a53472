use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::error::{Error, Result};
use crate::metadata::{FileMetaData, SchemaDescriptor};
use crate::page::PageInfo;
use crate::read::{read_metadata, scan_pages, ColumnCursor, PageCursor};
use crate::row::{build_nodes, RowAssembler, RowReader, ValueStream};
use crate::schema::types::ParquetType;
use crate::source::ByteSource;

/// A Parquet file with parsed footer metadata and a resolved schema.
pub struct FileReader {
    source: ByteSource,
    metadata: Arc<FileMetaData>,
}

impl FileReader {
    /// Maps `path` and parses its footer.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_source(ByteSource::open(path)?)
    }

    /// Reads a file already held by a [`ByteSource`].
    pub fn from_source(source: ByteSource) -> Result<Self> {
        let metadata = Arc::new(read_metadata(&source)?);
        debug!(
            "opened parquet file: {} row groups, {} rows",
            metadata.row_groups.len(),
            metadata.num_rows
        );
        Ok(Self { source, metadata })
    }

    pub fn file_metadata(&self) -> &Arc<FileMetaData> {
        &self.metadata
    }

    pub fn file_schema(&self) -> &SchemaDescriptor {
        self.metadata.schema()
    }

    /// A [`RowReader`] over every column of this file.
    pub fn row_reader(&self) -> Result<RowReader> {
        self.build_row_reader(None)
    }

    /// A [`RowReader`] over the named top-level fields, in schema order.
    pub fn row_reader_with_projection(&self, fields: &[&str]) -> Result<RowReader> {
        self.build_row_reader(Some(fields))
    }

    fn build_row_reader(&self, projection: Option<&[&str]>) -> Result<RowReader> {
        let schema = self.metadata.schema();

        if let Some(names) = projection {
            for name in names {
                if !schema.fields().iter().any(|field| field.name() == *name) {
                    return Err(Error::FieldNotFound((*name).to_string()));
                }
            }
        }

        // select root fields, tracking each field's first leaf index
        let mut selected: Vec<(&ParquetType, usize)> = vec![];
        let mut leaf_offset = 0;
        for field in schema.fields() {
            let num_leaves = count_leaves(field);
            let keep = match projection {
                Some(names) => names.contains(&field.name()),
                None => true,
            };
            if keep {
                selected.push((field, leaf_offset));
            }
            leaf_offset += num_leaves;
        }

        let nodes = build_nodes(
            &selected
                .iter()
                .map(|(field, _)| *field)
                .collect::<Vec<_>>(),
        );

        let mut projected_leaves = vec![];
        for (field, start) in &selected {
            projected_leaves.extend(*start..*start + count_leaves(field));
        }

        let mut streams = Vec::with_capacity(projected_leaves.len());
        for leaf in &projected_leaves {
            let mut cursor = ColumnCursor::new();
            for row_group in &self.metadata.row_groups {
                cursor.push_cursor(PageCursor::from_chunk(row_group.column(*leaf), &self.source)?);
            }
            streams.push(ValueStream::new(cursor, schema.column(*leaf)));
        }

        Ok(RowReader::new(
            RowAssembler::new(nodes, streams),
            schema.clone(),
            projected_leaves,
        ))
    }
}

fn count_leaves(tp: &ParquetType) -> usize {
    match tp {
        ParquetType::Primitive { .. } => 1,
        ParquetType::Group { fields, .. } => fields.iter().map(count_leaves).sum(),
    }
}

/// Everything a reader needs to continue into another file: its byte source,
/// parsed metadata and the scanned page descriptors of every column chunk.
///
/// Prepared ahead of time (typically on a [`crate::Fleet`] worker) and handed
/// to [`RowReader::extend`].
pub struct FileState {
    pub path: PathBuf,
    pub source: ByteSource,
    pub metadata: Arc<FileMetaData>,
    /// Scanned pages, indexed by row group and then by leaf column.
    pub chunk_pages: Vec<Vec<Vec<PageInfo>>>,
}

impl FileState {
    /// Maps `path`, parses its footer and scans every column chunk.
    pub fn prepare<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = ByteSource::open(&path)?;
        Self::from_source(path.as_ref().to_path_buf(), source)
    }

    /// Like [`FileState::prepare`] over an existing source; `path` only
    /// labels the state in errors and logs.
    pub fn from_source(path: PathBuf, source: ByteSource) -> Result<Self> {
        let metadata = Arc::new(read_metadata(&source)?);
        let chunk_pages = metadata
            .row_groups
            .iter()
            .map(|row_group| {
                row_group
                    .columns()
                    .iter()
                    .map(|chunk| scan_pages(chunk, &source))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("prepared file state for {}", path.display());
        Ok(Self {
            path,
            source,
            metadata,
            chunk_pages,
        })
    }
}
