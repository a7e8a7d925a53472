use std::sync::Arc;

use crate::compression::Compression;
use crate::encoding::Encoding;
use crate::schema::types::PhysicalType;
use crate::types::Int96;

/// The three page kinds this crate reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Dictionary,
    DataV1,
    DataV2,
}

/// Locates and types one page within a file, without its contents.
///
/// Produced by the scanner, owned by a page cursor's working list, and
/// released when the cursor materializes it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    pub kind: PageKind,
    /// Absolute offset of the page body (directly after the header).
    pub offset: u64,
    pub compressed_size: usize,
    pub uncompressed_size: usize,
    pub num_values: usize,
    /// The codec of the chunk this page belongs to. Carried per page so a
    /// cursor extended across chunks decodes each page with its own codec.
    pub codec: Compression,
    pub encoding: Encoding,
    pub rep_level_encoding: Encoding,
    pub def_level_encoding: Encoding,
    /// Byte length of the repetition level stream (data page v2 only).
    pub rep_levels_byte_length: usize,
    /// Byte length of the definition level stream (data page v2 only).
    pub def_levels_byte_length: usize,
    /// Whether the body past the level streams is compressed (data page v2;
    /// v1 bodies are compressed whenever the chunk declares a codec).
    pub is_compressed: bool,
    /// Whether a dictionary page precedes this page in its chunk.
    pub has_dictionary: bool,
}

/// The typed values of a decoded page or dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum PageValues {
    Boolean(Vec<bool>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Int96(Vec<Int96>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    ByteArray(Vec<Vec<u8>>),
    FixedLenByteArray(usize, Vec<Vec<u8>>),
}

impl PageValues {
    pub fn len(&self) -> usize {
        match self {
            PageValues::Boolean(v) => v.len(),
            PageValues::Int32(v) => v.len(),
            PageValues::Int64(v) => v.len(),
            PageValues::Int96(v) => v.len(),
            PageValues::Float(v) => v.len(),
            PageValues::Double(v) => v.len(),
            PageValues::ByteArray(v) => v.len(),
            PageValues::FixedLenByteArray(_, v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn physical_type(&self) -> PhysicalType {
        match self {
            PageValues::Boolean(_) => PhysicalType::Boolean,
            PageValues::Int32(_) => PhysicalType::Int32,
            PageValues::Int64(_) => PhysicalType::Int64,
            PageValues::Int96(_) => PhysicalType::Int96,
            PageValues::Float(_) => PhysicalType::Float,
            PageValues::Double(_) => PhysicalType::Double,
            PageValues::ByteArray(_) => PhysicalType::ByteArray,
            PageValues::FixedLenByteArray(size, _) => PhysicalType::FixedLenByteArray(*size),
        }
    }
}

/// A decompressed, decoded dictionary page: the shared value table of one
/// column chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DictPage {
    pub values: PageValues,
}

impl DictPage {
    pub fn new(values: PageValues) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A materialized page: aligned level and value arrays ready for assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPage {
    /// The number of level entries (not logical rows).
    pub num_values: usize,
    /// One definition level per entry; absent means all values are at the
    /// maximum definition level.
    pub def_levels: Option<Vec<u32>>,
    /// One repetition level per entry; absent means all zero.
    pub rep_levels: Option<Vec<u32>>,
    /// The non-null values, in order. Its length equals the count of
    /// definition levels at the maximum.
    pub values: PageValues,
    /// The chunk's dictionary, when this page was dictionary-encoded.
    pub dictionary: Option<Arc<DictPage>>,
}

impl DecodedPage {
    /// The definition level of entry `i`, `max_def` when the stream is absent.
    pub fn def_level(&self, i: usize, max_def: u32) -> u32 {
        self.def_levels.as_ref().map(|d| d[i]).unwrap_or(max_def)
    }

    /// The repetition level of entry `i`, 0 when the stream is absent.
    pub fn rep_level(&self, i: usize) -> u32 {
        self.rep_levels.as_ref().map(|r| r[i]).unwrap_or(0)
    }
}
