use super::delta_bitpacked;
use crate::error::{Error, Result};

/// Decodes [Delta-length byte arrays](https://github.com/apache/parquet-format/blob/master/Encodings.md#delta-length-byte-array-delta_length_byte_array--6):
/// a delta-packed length stream followed by the concatenated bytes.
///
/// Iterate the lengths by reference first, then take the byte region with
/// [`Decoder::into_values`].
#[derive(Debug)]
pub struct Decoder<'a> {
    values: &'a [u8],
    lengths: delta_bitpacked::Decoder<'a>,
    total_length: usize,
}

impl<'a> Decoder<'a> {
    pub fn try_new(values: &'a [u8]) -> Result<Self> {
        let lengths = delta_bitpacked::Decoder::try_new(values)?;
        Ok(Self {
            values,
            lengths,
            total_length: 0,
        })
    }

    /// Consumes this decoder and returns the slice of concatenated values.
    ///
    /// Fails if the length stream was not fully consumed or the concatenated
    /// bytes end past the buffer.
    pub fn into_values(self) -> Result<&'a [u8]> {
        if self.lengths.size_hint().0 != 0 {
            return Err(Error::CorruptPage(
                "length stream was not fully consumed".to_string(),
            ));
        }
        let start = self.lengths.bytes_consumed();
        let end = start.checked_add(self.total_length).filter(|end| *end <= self.values.len());
        match end {
            Some(end) => Ok(&self.values[start..end]),
            None => Err(Error::CorruptPage(format!(
                "byte array region of {} bytes ends past the page",
                self.total_length
            ))),
        }
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lengths.next();
        match result {
            Some(Ok(length)) => {
                if length < 0 {
                    return Some(Err(Error::CorruptPage(format!(
                        "negative byte array length {}",
                        length
                    ))));
                }
                self.total_length += length as usize;
                Some(Ok(length))
            }
            other => other,
        }
    }
}
