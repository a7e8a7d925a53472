// See https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3
use super::{bitpacked, ceil8, uleb128};
use crate::error::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub enum HybridEncoded<'a> {
    /// A bitpacked slice.
    Bitpacked(&'a [u8]),
    /// A RLE-encoded slice: the repeated value in
    /// round-up-to-next-byte(bit-width) bytes, and the run length.
    Rle(&'a [u8], usize),
}

/// An iterator over the runs of a hybrid RLE/bit-packed stream.
#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    data: &'a [u8],
    num_bits: u32,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], num_bits: u32) -> Self {
        Self { data, num_bits }
    }

    /// Returns the number of bits being used by this decoder.
    #[inline]
    pub fn num_bits(&self) -> u32 {
        self.num_bits
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<HybridEncoded<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let (indicator, read) = match uleb128::decode(self.data) {
            Ok(header) => header,
            Err(e) => {
                self.data = &[];
                return Some(Err(e));
            }
        };
        self.data = &self.data[read..];
        if indicator & 1 == 1 {
            // is bitpacking
            let bytes = (indicator as usize >> 1) * self.num_bits as usize;
            let bytes = std::cmp::min(bytes, self.data.len());
            let run = HybridEncoded::Bitpacked(&self.data[..bytes]);
            self.data = &self.data[bytes..];
            Some(Ok(run))
        } else {
            // is rle
            let run_length = indicator as usize >> 1;
            // repeated-value := value that is repeated, using a fixed-width of
            // round-up-to-next-byte(bit-width)
            let rle_bytes = ceil8(self.num_bits as usize);
            if rle_bytes > self.data.len() {
                self.data = &[];
                return Some(Err(Error::CorruptPage(
                    "rle run ends past the level stream".to_string(),
                )));
            }
            let run = HybridEncoded::Rle(&self.data[..rle_bytes], run_length);
            self.data = &self.data[rle_bytes..];
            Some(Ok(run))
        }
    }
}

/// Decodes `length` values out of a hybrid RLE/bit-packed stream.
pub fn decode(values: &[u8], num_bits: u32, length: usize) -> Result<Vec<u32>> {
    let mut decoded = Vec::with_capacity(length);
    if num_bits == 0 {
        decoded.resize(length, 0);
        return Ok(decoded);
    }
    let runs = Decoder::new(values, num_bits);
    for run in runs {
        match run? {
            HybridEncoded::Bitpacked(compressed) => {
                let packed = compressed.len() * 8 / num_bits as usize;
                let remaining = std::cmp::min(packed, length - decoded.len());
                decoded
                    .extend(bitpacked::Decoder::<u32>::try_new(compressed, num_bits as usize, remaining)?);
            }
            HybridEncoded::Rle(pack, run_length) => {
                let mut bytes = [0u8; std::mem::size_of::<u32>()];
                pack.iter().zip(bytes.iter_mut()).for_each(|(src, dst)| *dst = *src);
                let value = u32::from_le_bytes(bytes);
                let remaining = std::cmp::min(run_length, length - decoded.len());
                decoded.extend(std::iter::repeat(value).take(remaining));
            }
        }
        if decoded.len() == length {
            break;
        }
    }
    if decoded.len() != length {
        return Err(Error::CorruptPage(format!(
            "level stream ran out after {} of {} values",
            decoded.len(),
            length
        )));
    }
    Ok(decoded)
}
