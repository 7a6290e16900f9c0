// Patch write path.
//
//   1. Reserve the 32-byte header with zeros.
//   2. Sort the old suffixes once.
//   3. Run the delta scan, streaming each control triple straight into the
//      compressed control block.
//   4. Compress the diff payload, then the extra payload.
//   5. Seek back and write the real header.
//
// The output must be seekable so the header can be rewritten once the block
// lengths are known.

use std::io::{Seek, SeekFrom, Write};

use log::debug;

use super::block::{self, BlockCompression};
use crate::diff::DiffEncoder;
use crate::error::Result;
use crate::format::{HEADER_LEN, PatchHeader};
use crate::index::SuffixIndex;

/// Configuration for patch creation.
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// bzip2 level (1-9) for the three patch blocks.
    pub level: u32,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            level: block::DEFAULT_LEVEL,
        }
    }
}

/// Write a patch turning `old` into `new` at the current position of
/// `output`, returning the header that was written.
///
/// On return `output` is positioned just past the extra block.
///
/// Memory use is dominated by the suffix index (two `usize`-sized words per
/// old byte while sorting) plus up to `new.len()` bytes for each of the diff
/// and extra payloads.
pub fn create<W: Write + Seek>(
    old: &[u8],
    new: &[u8],
    output: &mut W,
    opts: &DiffOptions,
) -> Result<PatchHeader> {
    let compression = BlockCompression::new(opts.level)?;

    let start = output.stream_position()?;
    output.write_all(&[0u8; HEADER_LEN])?;
    let control_start = start + HEADER_LEN as u64;

    debug!(
        "create: old {} bytes, new {} bytes, level {}",
        old.len(),
        new.len(),
        compression.level()
    );

    let index = SuffixIndex::new(old);
    let mut encoder = DiffEncoder::new(&index, new);

    {
        let mut control_block = compression.writer(&mut *output);
        for control in encoder.by_ref() {
            control.write_to(&mut control_block)?;
        }
        control_block.finish()?;
    }
    let control_end = output.stream_position()?;

    let controls = encoder.controls_emitted();
    let overlaps = encoder.overlaps_resolved();
    let payloads = encoder.into_payloads();

    compression.write_block(&mut *output, &payloads.diff)?;
    let diff_end = output.stream_position()?;

    compression.write_block(&mut *output, &payloads.extra)?;
    let end = output.stream_position()?;

    let header = PatchHeader {
        control_len: control_end - control_start,
        diff_len: diff_end - control_end,
        new_len: new.len() as u64,
    };

    debug!(
        "create: {controls} controls ({overlaps} overlaps split), diff payload {} bytes, extra payload {} bytes, \
         blocks control={} diff={} extra={}",
        payloads.diff.len(),
        payloads.extra.len(),
        header.control_len,
        header.diff_len,
        end - diff_end
    );

    output.seek(SeekFrom::Start(start))?;
    header.write_to(output)?;
    output.seek(SeekFrom::Start(end))?;

    Ok(header)
}
