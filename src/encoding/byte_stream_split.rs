use crate::error::{Error, Result};
use crate::types::NativeType;

/// Decodes [Byte Stream Split](https://github.com/apache/parquet-format/blob/master/Encodings.md#byte-stream-split-byte_stream_split--9):
/// the n-th bytes of all values are stored contiguously; reassembly
/// interleaves the parallel streams.
pub fn decode<T: NativeType>(values: &[u8], num_values: usize) -> Result<Vec<T>> {
    let element_size = std::mem::size_of::<T>();
    if values.len() != num_values * element_size {
        return Err(Error::CorruptPage(format!(
            "{} bytes cannot hold {} byte-stream-split values of {} bytes",
            values.len(),
            num_values,
            element_size
        )));
    }
    let mut buffer = vec![0u8; element_size];
    let mut decoded = Vec::with_capacity(num_values);
    for i in 0..num_values {
        for (n, byte) in buffer.iter_mut().enumerate() {
            *byte = values[num_values * n + i];
        }
        decoded.push(T::from_le_bytes(buffer.as_slice().try_into().unwrap()));
    }
    Ok(decoded)
}
