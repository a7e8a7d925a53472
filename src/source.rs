use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::error::{Error, Result};

#[derive(Debug)]
enum Region {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for Region {
    fn as_ref(&self) -> &[u8] {
        match self {
            Region::Mapped(map) => map.as_ref(),
            Region::Owned(bytes) => bytes.as_ref(),
        }
    }
}

/// Random-access, zero-copy view over a file's bytes.
///
/// Cloning is cheap; all clones share the same region. Slices returned by
/// [`ByteSource::slice`] remain valid for as long as any clone lives.
#[derive(Debug, Clone)]
pub struct ByteSource {
    region: Arc<Region>,
}

impl ByteSource {
    /// Maps `path` into memory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        // Safety: the map is read-only and the file handle is owned by the map.
        let map = unsafe { Mmap::map(&file) }?;
        Ok(Self {
            region: Arc::new(Region::Mapped(map)),
        })
    }

    /// Wraps an in-memory buffer.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            region: Arc::new(Region::Owned(bytes)),
        }
    }

    /// The total number of bytes in this source.
    pub fn len(&self) -> u64 {
        self.region.as_ref().as_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the bytes at `[offset, offset + length)`.
    ///
    /// Out-of-range requests fail with [`Error::RangeError`]; this never
    /// returns a short slice.
    pub fn slice(&self, offset: u64, length: usize) -> Result<&[u8]> {
        let end = offset
            .checked_add(length as u64)
            .ok_or_else(|| Error::RangeError(format!("slice at {} overflows", offset)))?;
        if end > self.len() {
            return Err(Error::RangeError(format!(
                "slice [{}, {}) exceeds source of {} bytes",
                offset,
                end,
                self.len()
            )));
        }
        Ok(&self.region.as_ref().as_ref()[offset as usize..end as usize])
    }
}
