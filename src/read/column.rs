use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::page::DecodedPage;

use super::page_cursor::PageCursor;

/// Concatenates [`PageCursor`]s for one projected column across row groups
/// and files.
///
/// Cursors are held in a queue and popped as each is exhausted, so live
/// descriptor memory tracks the active file window rather than everything a
/// prefetcher has scanned.
#[derive(Debug, Default)]
pub struct ColumnCursor {
    cursors: VecDeque<PageCursor>,
    closed: bool,
}

impl ColumnCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk's page cursor at the end of the queue.
    pub fn push_cursor(&mut self, cursor: PageCursor) {
        self.cursors.push_back(cursor);
    }

    /// Whether any queued cursor still holds a data page.
    pub fn has_next(&self) -> bool {
        !self.closed && self.cursors.iter().any(|cursor| cursor.has_next())
    }

    /// Materializes the next page, advancing to the next queued cursor when
    /// the current one reports no more pages.
    pub fn next_page(&mut self) -> Result<DecodedPage> {
        if self.closed {
            return Err(Error::Closed);
        }
        loop {
            let front = self.cursors.front_mut().ok_or_else(|| {
                Error::IndexOutOfRange("no page remains in this column".to_string())
            })?;
            if front.has_next() {
                return front.next_page();
            }
            self.cursors.pop_front();
        }
    }

    /// Closes every queued cursor and drops the queue.
    pub fn close(&mut self) {
        for cursor in self.cursors.iter_mut() {
            cursor.close();
        }
        self.cursors.clear();
        self.closed = true;
    }
}
