//! A reader for the Apache Parquet columnar format.
//!
//! The crate is organized bottom-up: a zero-copy [`source::ByteSource`] feeds
//! the page scanner in [`read`], whose descriptors are materialized on demand
//! by [`read::PageCursor`] into [`page::DecodedPage`]s; [`row`] assembles the
//! per-column streams into nested [`row::Row`]s.
pub mod error;

mod bridge;
pub mod compression;
pub mod encoding;
pub mod metadata;
pub mod page;
pub mod read;
pub mod row;
pub mod schema;
pub mod source;
pub mod types;

mod file;
mod fleet;

pub use file::{FileReader, FileState};
pub use fleet::Fleet;

const FOOTER_SIZE: u64 = 8;
const HEADER_SIZE: u64 = 4;
const PARQUET_MAGIC: [u8; 4] = [b'P', b'A', b'R', b'1'];
