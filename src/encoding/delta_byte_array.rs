use super::{delta_bitpacked, delta_length_byte_array};
use crate::error::Result;

/// Decodes [Delta strings](https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-strings-delta_byte_array--7):
/// a prefix-length stream, then suffixes as delta-length byte arrays.
///
/// Iterate the prefix lengths by reference first, then move to the suffixes
/// with [`Decoder::into_suffixes`].
#[derive(Debug)]
pub struct Decoder<'a> {
    values: &'a [u8],
    prefix_lengths: delta_bitpacked::Decoder<'a>,
}

impl<'a> Decoder<'a> {
    pub fn try_new(values: &'a [u8]) -> Result<Self> {
        let prefix_lengths = delta_bitpacked::Decoder::try_new(values)?;
        Ok(Self {
            values,
            prefix_lengths,
        })
    }

    pub fn into_suffixes(self) -> Result<delta_length_byte_array::Decoder<'a>> {
        delta_length_byte_array::Decoder::try_new(
            &self.values[self.prefix_lengths.bytes_consumed()..],
        )
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.prefix_lengths.next()
    }
}
