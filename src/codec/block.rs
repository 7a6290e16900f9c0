// Block compression for the control, diff and extra streams.
//
// BSDIFF40 stores each stream as an independent bzip2 stream. Compression
// level only changes patch size; any level decodes the same way.

use std::io::{self, Read, Write};

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;

use crate::error::{Error, Result};

/// Default bzip2 block size (900k, the format's "best").
pub const DEFAULT_LEVEL: u32 = 9;

/// Compression settings for patch blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCompression {
    level: u32,
}

impl BlockCompression {
    /// Create settings for bzip2 level 1..=9.
    pub fn new(level: u32) -> Result<Self> {
        if !(1..=9).contains(&level) {
            return Err(Error::InvalidArgument(format!(
                "compression level {level} out of range 1..=9"
            )));
        }
        Ok(Self { level })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Start a compressed block on `w`. Call `finish()` on the result to
    /// terminate the stream and get `w` back.
    pub fn writer<W: Write>(&self, w: W) -> BzEncoder<W> {
        BzEncoder::new(w, bzip2::Compression::new(self.level))
    }

    /// Compress `data` as one complete block onto `w`.
    pub fn write_block<W: Write>(&self, w: W, data: &[u8]) -> io::Result<W> {
        let mut encoder = self.writer(w);
        encoder.write_all(data)?;
        encoder.finish()
    }

    /// Decompress a block starting at the current position of `r`.
    pub fn reader<R: Read>(r: R) -> BzDecoder<R> {
        BzDecoder::new(r)
    }
}

impl Default for BlockCompression {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_range_is_checked() {
        assert!(BlockCompression::new(0).is_err());
        assert!(BlockCompression::new(10).is_err());
        assert_eq!(BlockCompression::new(1).unwrap().level(), 1);
        assert_eq!(BlockCompression::default().level(), DEFAULT_LEVEL);
    }

    #[test]
    fn blocks_decode_independently() {
        let block = BlockCompression::default();
        let mut out = Vec::new();
        out = block.write_block(out, b"first block").unwrap();
        let first_len = out.len();
        out = block.write_block(out, &[7u8; 5000]).unwrap();

        let mut first = Vec::new();
        BlockCompression::reader(&out[..first_len])
            .read_to_end(&mut first)
            .unwrap();
        assert_eq!(first, b"first block");

        let mut second = Vec::new();
        BlockCompression::reader(&out[first_len..])
            .read_to_end(&mut second)
            .unwrap();
        assert_eq!(second, vec![7u8; 5000]);
    }

    #[test]
    fn empty_block_is_a_valid_stream() {
        let out = BlockCompression::default()
            .write_block(Vec::new(), b"")
            .unwrap();
        assert!(out.starts_with(b"BZh"));
        let mut decoded = Vec::new();
        BlockCompression::reader(out.as_slice())
            .read_to_end(&mut decoded)
            .unwrap();
        assert!(decoded.is_empty());
    }
}
