use std::sync::Arc;

use log::trace;

use crate::error::{Error, Result};
use crate::metadata::{ColumnChunkMetaData, ColumnDescriptor};
use crate::page::{DecodedPage, DictPage, PageInfo, PageKind};
use crate::source::ByteSource;

use super::decode::{decode_dict_page, decode_page};
use super::scan::scan_pages;

/// Single-column iterator over scanned [`PageInfo`]s that materializes
/// [`DecodedPage`]s on demand.
///
/// A descriptor's slot is released the moment it is materialized: a chunk can
/// hold thousands of descriptors and, under cross-file prefetch, keeping the
/// consumed ones alive would grow with the fleet instead of the active window.
/// The list keeps its length so indexing stays stable; only slot contents are
/// dropped.
pub struct PageCursor {
    descriptor: ColumnDescriptor,
    // each slot pairs the descriptor with the source its offsets refer to,
    // so descriptors appended from a later file resolve against that file
    slots: Vec<Option<(PageInfo, ByteSource)>>,
    index: usize,
    dictionary: Option<Arc<DictPage>>,
    closed: bool,
}

impl PageCursor {
    pub fn new(pages: Vec<PageInfo>, source: ByteSource, descriptor: ColumnDescriptor) -> Self {
        Self {
            descriptor,
            slots: pages
                .into_iter()
                .map(|info| Some((info, source.clone())))
                .collect(),
            index: 0,
            dictionary: None,
            closed: false,
        }
    }

    /// Scans `chunk` and returns a cursor over its pages.
    pub fn from_chunk(chunk: &ColumnChunkMetaData, source: &ByteSource) -> Result<Self> {
        let pages = scan_pages(chunk, source)?;
        Ok(Self::new(pages, source.clone(), chunk.descriptor().clone()))
    }

    /// Whether an unconsumed data page remains at or after the index.
    pub fn has_next(&self) -> bool {
        !self.closed
            && self.slots[self.index.min(self.slots.len())..]
                .iter()
                .any(|slot| matches!(slot, Some((info, _)) if info.kind != PageKind::Dictionary))
    }

    /// Materializes the next data page, releasing its descriptor slot.
    ///
    /// A dictionary page is decoded into the cursor's cache and skipped
    /// transparently; every later dictionary-encoded page of the chunk
    /// references that cache.
    pub fn next_page(&mut self) -> Result<DecodedPage> {
        if self.closed {
            return Err(Error::Closed);
        }
        loop {
            if self.index >= self.slots.len() {
                return Err(Error::IndexOutOfRange(format!(
                    "no page remains at or after slot {}",
                    self.index
                )));
            }
            let (info, source) = self.slots[self.index].take().ok_or_else(|| {
                Error::IndexOutOfRange(format!("page slot {} was already consumed", self.index))
            })?;
            self.index += 1;

            if info.kind == PageKind::Dictionary {
                trace!("caching dictionary page at {}", info.offset);
                let dict = decode_dict_page(&info, &source, &self.descriptor)?;
                self.dictionary = Some(Arc::new(dict));
                continue;
            }
            return decode_page(&info, &source, self.dictionary.as_ref(), &self.descriptor);
        }
    }

    /// Appends a later chunk's or file's descriptors for the same column,
    /// avoiding a rescan. The descriptors resolve against `source`, which may
    /// be another file's; a dictionary page inside the appended run replaces
    /// the cache when it is reached.
    pub fn extend(&mut self, pages: Vec<PageInfo>, source: ByteSource) {
        self.slots
            .extend(pages.into_iter().map(|info| Some((info, source.clone()))));
    }

    /// The length of the working list, consumed slots included.
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Whether slot `i` has been released.
    pub fn is_consumed(&self, i: usize) -> bool {
        matches!(self.slots.get(i), Some(None))
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Releases all slots and the cached dictionary. Further calls to
    /// [`PageCursor::next_page`] fail with [`Error::Closed`].
    pub fn close(&mut self) {
        self.slots.clear();
        self.dictionary = None;
        self.closed = true;
    }
}

impl std::fmt::Debug for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PageCursor")
            .field("column", &self.descriptor.path_in_schema)
            .field("num_slots", &self.slots.len())
            .field("index", &self.index)
            .field("closed", &self.closed)
            .finish()
    }
}
