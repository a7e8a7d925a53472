use super::{bitpacked, ceil8, uleb128, zigzag_leb128};
use crate::error::{Error, Result};

#[derive(Debug)]
struct Block<'a> {
    // the minimum delta of the block, added to every unpacked delta
    min_delta: i64,
    mini_block_len: usize,
    widths: &'a [u8],
    values: &'a [u8],
    remaining: usize,     // deltas still to serve
    position: usize, // invariant: < mini_block_len
    // None represents a miniblock of bit width 0, where deltas equal min_delta.
    mini_block: Option<bitpacked::Decoder<'a, u64>>,
    // number of bytes consumed.
    bytes_consumed: usize,
}

impl<'a> Block<'a> {
    fn try_new(
        mut values: &'a [u8],
        mini_blocks_per_block: usize,
        mini_block_len: usize,
        length: usize,
    ) -> Result<Self> {
        let length = std::cmp::min(length, mini_blocks_per_block * mini_block_len);

        let mut bytes_consumed = 0;
        let (min_delta, consumed) = zigzag_leb128::decode(values)?;
        bytes_consumed += consumed;
        values = &values[consumed..];

        if values.len() < mini_blocks_per_block {
            return Err(Error::CorruptPage(
                "delta block bit widths are truncated".to_string(),
            ));
        }
        let widths = &values[..mini_blocks_per_block];
        bytes_consumed += mini_blocks_per_block;
        values = &values[mini_blocks_per_block..];

        let mut block = Block {
            min_delta,
            mini_block_len,
            widths,
            remaining: length,
            values,
            position: 0,
            mini_block: None,
            bytes_consumed,
        };

        block.load_mini_block()?;

        Ok(block)
    }

    fn load_mini_block(&mut self) -> Result<()> {
        let num_bits = *self.widths.first().ok_or_else(|| {
            Error::CorruptPage("delta block has fewer miniblocks than declared".to_string())
        })? as usize;
        self.widths = &self.widths[1..];

        self.mini_block = if num_bits > 0 {
            let length = std::cmp::min(self.remaining, self.mini_block_len);

            let mini_block_bytes = ceil8(self.mini_block_len * num_bits);
            if mini_block_bytes > self.values.len() {
                return Err(Error::CorruptPage(
                    "delta miniblock ends past the page".to_string(),
                ));
            }
            let (miniblock, remainder) = self.values.split_at(mini_block_bytes);

            self.values = remainder;
            self.bytes_consumed += mini_block_bytes;

            Some(bitpacked::Decoder::try_new(miniblock, num_bits, length)?)
        } else {
            None
        };
        self.position = 0;

        Ok(())
    }

    fn next_delta(&mut self) -> Option<Result<i64>> {
        if self.remaining == 0 {
            return None;
        }
        let unpacked = match &mut self.mini_block {
            Some(miniblock) => match miniblock.next() {
                Some(v) => v,
                None => {
                    return Some(Err(Error::CorruptPage(
                        "delta miniblock ran out of values".to_string(),
                    )))
                }
            },
            None => 0,
        };
        let result = self.min_delta.wrapping_add(unpacked as i64);
        self.position += 1;
        self.remaining -= 1;

        if self.remaining > 0 && self.position == self.mini_block_len {
            if let Err(e) = self.load_mini_block() {
                return Some(Err(e));
            }
        }

        Some(Ok(result))
    }
}

/// Decoder of parquet's `DELTA_BINARY_PACKED`. Implements
/// `Iterator<Item = Result<i64>>`.
///
/// This struct does not allocate on the heap.
#[derive(Debug)]
pub struct Decoder<'a> {
    mini_blocks_per_block: usize,
    mini_block_len: usize,
    remaining: usize,
    next_value: i64,
    values: &'a [u8],
    current_block: Option<Block<'a>>,
    // bytes consumed up to, but excluding, the current block
    bytes_consumed: usize,
}

impl<'a> Decoder<'a> {
    pub fn try_new(mut values: &'a [u8]) -> Result<Self> {
        let mut bytes_consumed = 0;
        let (block_size, consumed) = uleb128::decode(values)?;
        bytes_consumed += consumed;
        values = &values[consumed..];
        if block_size == 0 || block_size % 128 != 0 {
            return Err(Error::CorruptPage(format!(
                "delta block size {} is not a positive multiple of 128",
                block_size
            )));
        }

        let (mini_blocks_per_block, consumed) = uleb128::decode(values)?;
        let mini_blocks_per_block = mini_blocks_per_block as usize;
        bytes_consumed += consumed;
        values = &values[consumed..];

        let (remaining, consumed) = uleb128::decode(values)?;
        let remaining = remaining as usize;
        bytes_consumed += consumed;
        values = &values[consumed..];

        let (first_value, consumed) = zigzag_leb128::decode(values)?;
        bytes_consumed += consumed;
        values = &values[consumed..];

        if mini_blocks_per_block == 0 {
            return Err(Error::CorruptPage(
                "delta header declares zero miniblocks per block".to_string(),
            ));
        }
        let mini_block_len = block_size as usize / mini_blocks_per_block;
        if mini_block_len % 8 != 0 {
            return Err(Error::CorruptPage(format!(
                "delta miniblock of {} values is not a multiple of 8",
                mini_block_len
            )));
        }

        Ok(Self {
            mini_blocks_per_block,
            mini_block_len,
            remaining,
            next_value: first_value,
            values,
            current_block: None,
            bytes_consumed,
        })
    }

    /// Returns the total number of bytes consumed up to this point by
    /// [`Decoder`], including the padding of a partially read mini block.
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
            + self
                .current_block
                .as_ref()
                .map(|block| block.bytes_consumed)
                .unwrap_or(0)
    }

    fn advance_delta(&mut self) -> Result<i64> {
        loop {
            if self.current_block.is_none() {
                self.current_block = Some(Block::try_new(
                    self.values,
                    self.mini_blocks_per_block,
                    self.mini_block_len,
                    self.remaining,
                )?);
            }
            let block = self.current_block.as_mut().unwrap();
            match block.next_delta() {
                Some(delta) => return delta,
                None => {
                    let consumed = block.bytes_consumed;
                    self.values = &self.values[consumed..];
                    self.bytes_consumed += consumed;
                    self.current_block = None;
                }
            }
        }
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let result = self.next_value;
        // the stream carries one delta per value after the first
        if self.remaining > 0 {
            match self.advance_delta() {
                Ok(delta) => self.next_value = self.next_value.wrapping_add(delta),
                Err(e) => {
                    self.remaining = 0;
                    return Some(Err(e));
                }
            }
        }
        Some(Ok(result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
