use log::debug;

use crate::error::{Error, Result};
use crate::file::FileState;
use crate::metadata::SchemaDescriptor;
use crate::read::PageCursor;

use super::{Row, RowAssembler};

/// Streams assembled [`Row`]s, optionally across files prepared by a
/// prefetching fleet.
///
/// Iteration yields `Result<Row>`; a data-plane error ends the stream and
/// leaves the reader closed.
pub struct RowReader {
    assembler: RowAssembler,
    schema: SchemaDescriptor,
    /// For every projected stream, the file-global leaf index it reads.
    projected_leaves: Vec<usize>,
    closed: bool,
    errored: bool,
}

impl RowReader {
    pub(crate) fn new(
        assembler: RowAssembler,
        schema: SchemaDescriptor,
        projected_leaves: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(assembler.num_streams(), projected_leaves.len());
        Self {
            assembler,
            schema,
            projected_leaves,
            closed: false,
            errored: false,
        }
    }

    /// Whether another row can be assembled.
    pub fn has_next(&mut self) -> Result<bool> {
        if self.closed {
            return Err(Error::Closed);
        }
        self.assembler.has_next()
    }

    /// Appends a prepared file to every projected column, continuing the
    /// stream without a rescan. The file must carry this reader's schema.
    pub fn extend(&mut self, state: &FileState) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        if state.metadata.schema_descr.root_schema() != self.schema.root_schema() {
            return Err(Error::TypeMismatch(format!(
                "schema of `{}` differs from this reader's",
                state.path.display()
            )));
        }
        for chunk_pages in &state.chunk_pages {
            for (stream, leaf) in self.projected_leaves.iter().enumerate() {
                let cursor = PageCursor::new(
                    chunk_pages[*leaf].clone(),
                    state.source.clone(),
                    self.schema.column(*leaf).clone(),
                );
                self.assembler.push_cursor(stream, cursor);
            }
        }
        debug!(
            "extended reader with {} row groups from {}",
            state.chunk_pages.len(),
            state.path.display()
        );
        Ok(())
    }

    /// Releases every cursor, decoded page and cached dictionary. Further
    /// calls fail with [`Error::Closed`].
    pub fn close(&mut self) {
        self.assembler.close();
        self.closed = true;
    }
}

impl Iterator for RowReader {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.errored {
            return None;
        }
        if self.closed {
            return Some(Err(Error::Closed));
        }
        match self.assembler.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => None,
            Err(e) => {
                self.close();
                self.errored = true;
                Some(Err(e))
            }
        }
    }
}
