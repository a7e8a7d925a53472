pub use crate::bridge::Compression;

use crate::error::{Error, Result};

/// Decompression interface for page bodies.
///
/// Implementations write exactly `output_buf.len()` bytes or fail; callers
/// size the output from the page header's uncompressed size.
pub trait Codec: std::fmt::Debug {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()>;
}

/// Returns the codec for `codec`, or `None` for `UNCOMPRESSED`.
///
/// Codecs that were not compiled in fail with [`Error::UnsupportedCodec`].
pub fn create_codec(codec: &Compression) -> Result<Option<Box<dyn Codec>>> {
    match *codec {
        #[cfg(any(feature = "gzip", feature = "gzip_zlib_ng"))]
        Compression::Gzip => Ok(Some(Box::new(GzipCodec))),
        #[cfg(feature = "snappy")]
        Compression::Snappy => Ok(Some(Box::new(SnappyCodec::default()))),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => Ok(Some(Box::new(Lz4Codec))),
        #[cfg(feature = "zstd")]
        Compression::Zstd => Ok(Some(Box::new(ZstdCodec))),
        Compression::Uncompressed => Ok(None),
        _ => Err(Error::UnsupportedCodec(format!(
            "compression {:?} is not installed",
            codec
        ))),
    }
}

/// Decompresses a page body, verifying the produced length.
pub fn decompress(codec: Compression, input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    match create_codec(&codec)? {
        Some(mut decompressor) => {
            let mut output = vec![0u8; expected_len];
            decompressor.decompress(input, &mut output)?;
            Ok(output)
        }
        None => {
            if input.len() != expected_len {
                return Err(Error::CorruptPage(format!(
                    "uncompressed page of {} bytes declares {}",
                    input.len(),
                    expected_len
                )));
            }
            Ok(input.to_vec())
        }
    }
}

/// Fills `output_buf` from `reader` and verifies the stream ends there.
#[allow(dead_code)]
fn drain_into(mut reader: impl std::io::Read, output_buf: &mut [u8], codec: &str) -> Result<()> {
    reader
        .read_exact(output_buf)
        .map_err(|e| Error::CorruptPage(format!("{} body truncated: {}", codec, e)))?;
    let mut probe = [0u8; 1];
    let trailing = reader
        .read(&mut probe)
        .map_err(|e| Error::CorruptPage(format!("{} trailer: {}", codec, e)))?;
    if trailing != 0 {
        return Err(Error::CorruptPage(format!(
            "{} body longer than the declared {} bytes",
            codec,
            output_buf.len()
        )));
    }
    Ok(())
}

/// Snappy's raw (unframed) format, the one parquet uses.
#[cfg(feature = "snappy")]
#[derive(Debug)]
pub struct SnappyCodec {
    decoder: snap::raw::Decoder,
}

#[cfg(feature = "snappy")]
impl Default for SnappyCodec {
    fn default() -> Self {
        Self {
            decoder: snap::raw::Decoder::new(),
        }
    }
}

#[cfg(feature = "snappy")]
impl Codec for SnappyCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
        let declared = snap::raw::decompress_len(input_buf)
            .map_err(|e| Error::CorruptPage(format!("snappy length: {}", e)))?;
        if declared != output_buf.len() {
            return Err(Error::CorruptPage(format!(
                "snappy body of {} bytes declares {}",
                declared,
                output_buf.len()
            )));
        }
        self.decoder
            .decompress(input_buf, output_buf)
            .map_err(|e| Error::CorruptPage(format!("underlying snap error: {}", e)))
            .map(|_| ())
    }
}

/// GZIP via `flate2`.
///
/// `flate2` supplies two inflate backends: the portable pure-Rust one (the
/// `gzip` feature) and zlib-ng (the `gzip_zlib_ng` feature). Which one backs
/// this codec is decided at build time and is invisible here.
#[cfg(any(feature = "gzip", feature = "gzip_zlib_ng"))]
#[derive(Debug)]
pub struct GzipCodec;

#[cfg(any(feature = "gzip", feature = "gzip_zlib_ng"))]
impl Codec for GzipCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
        drain_into(
            flate2::read::MultiGzDecoder::new(input_buf),
            output_buf,
            "gzip",
        )
    }
}

/// LZ4 in its framed flavor.
#[cfg(feature = "lz4")]
#[derive(Debug)]
pub struct Lz4Codec;

#[cfg(feature = "lz4")]
impl Codec for Lz4Codec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
        let decoder = lz4::Decoder::new(input_buf)
            .map_err(|e| Error::CorruptPage(format!("lz4 frame: {}", e)))?;
        drain_into(decoder, output_buf, "lz4")
    }
}

/// Zstandard.
#[cfg(feature = "zstd")]
#[derive(Debug)]
pub struct ZstdCodec;

#[cfg(feature = "zstd")]
impl Codec for ZstdCodec {
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
        let decoder = zstd::Decoder::new(input_buf)
            .map_err(|e| Error::CorruptPage(format!("zstd frame: {}", e)))?;
        drain_into(decoder, output_buf, "zstd")
    }
}
