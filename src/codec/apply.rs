// Patch read path.
//
// The control, diff and extra blocks are consumed in an interleaved order,
// so each gets its own patch reader (obtained from a caller-supplied
// opener) and its own decompressor. The old input is only ever seeked and
// read; the output is written strictly in triple order.

use std::io::{self, Read, Seek, SeekFrom, Write};

use bzip2::read::BzDecoder;
use log::debug;

use super::block::BlockCompression;
use crate::error::{Error, Result, Section};
use crate::format::{Control, PatchHeader};

/// Default size of the intermediate copy buffers (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 20;

/// Configuration for patch application.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Size of each of the two intermediate buffers. Memory use while
    /// applying is bounded by this, not by the new-sequence length.
    pub buffer_size: usize,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// PatchApplier
// ---------------------------------------------------------------------------

/// Reconstruction state machine over decoded control/diff/extra streams.
///
/// State is the pair (old cursor, new cursor); the machine is finished once
/// the new cursor reaches the declared new length.
pub struct PatchApplier<C: Read, D: Read, E: Read> {
    control: C,
    diff: D,
    extra: E,
    old_len: u64,
    new_len: u64,
    old_pos: i64,
    new_pos: u64,
    controls: u64,
    buf: Vec<u8>,
    old_buf: Vec<u8>,
}

impl<C: Read, D: Read, E: Read> PatchApplier<C, D, E> {
    /// `old_len` is the length of the old input; bytes outside `[0, old_len)`
    /// are never read from it.
    pub fn new(
        header: &PatchHeader,
        old_len: u64,
        control: C,
        diff: D,
        extra: E,
        buffer_size: usize,
    ) -> Self {
        let cap = usize::try_from(header.new_len).unwrap_or(usize::MAX);
        let size = buffer_size.min(cap).max(1);
        Self {
            control,
            diff,
            extra,
            old_len,
            new_len: header.new_len,
            old_pos: 0,
            new_pos: 0,
            controls: 0,
            buf: vec![0u8; size],
            old_buf: vec![0u8; size],
        }
    }

    pub fn is_done(&self) -> bool {
        self.new_pos >= self.new_len
    }

    /// Current old cursor (may be negative or past the end after a seek).
    pub fn old_pos(&self) -> i64 {
        self.old_pos
    }

    /// Bytes written so far.
    pub fn new_pos(&self) -> u64 {
        self.new_pos
    }

    /// Control triples processed so far.
    pub fn controls_applied(&self) -> u64 {
        self.controls
    }

    /// Execute the next control triple.
    ///
    /// Returns `Ok(false)` without reading anything once the output is
    /// complete.
    pub fn step<R: Read + Seek, W: Write>(&mut self, old: &mut R, out: &mut W) -> Result<bool> {
        if self.is_done() {
            return Ok(false);
        }

        let control = Control::read_from(&mut self.control)
            .map_err(|e| Error::reading(Section::Control, e))?
            .ok_or(Error::UnexpectedEndOfInput {
                section: Section::Control,
            })?;

        let copy = self.checked_len(control.copy, "copy")?;
        self.copy_from_old(old, out, copy)?;

        let extra = self.checked_len(control.extra, "extra")?;
        self.copy_extra(out, extra)?;

        self.old_pos = self.old_pos.checked_add(control.seek).ok_or_else(|| {
            Error::CorruptPatch(format!("seek {} overflows the old cursor", control.seek))
        })?;
        self.controls += 1;

        Ok(true)
    }

    /// Run to completion, returning the number of bytes written.
    pub fn run<R: Read + Seek, W: Write>(&mut self, old: &mut R, out: &mut W) -> Result<u64> {
        while self.step(old, out)? {}
        Ok(self.new_pos)
    }

    /// Confirm the diff and extra streams end exactly where the last triple
    /// left them, then hand the three readers back.
    ///
    /// A damaged block tail (missing end-of-stream marker or CRC) surfaces
    /// here, as do payload bytes no triple consumed.
    pub fn finish(mut self) -> Result<(C, D, E)> {
        expect_end(&mut self.diff, Section::Diff)?;
        expect_end(&mut self.extra, Section::Extra)?;
        Ok((self.control, self.diff, self.extra))
    }

    /// Validate a copy/extra length against the space left in the output.
    fn checked_len(&self, len: i64, what: &str) -> Result<u64> {
        let len = u64::try_from(len)
            .map_err(|_| Error::CorruptPatch(format!("negative {what} length {len}")))?;
        match self.new_pos.checked_add(len) {
            Some(end) if end <= self.new_len => Ok(len),
            _ => Err(Error::CorruptPatch(format!(
                "{what} of {len} bytes at offset {} exceeds new length {}",
                self.new_pos, self.new_len
            ))),
        }
    }

    /// Add old bytes to `len` diff bytes. Old bytes outside the old input
    /// contribute nothing, so the diff byte passes through unchanged.
    fn copy_from_old<R: Read + Seek, W: Write>(
        &mut self,
        old: &mut R,
        out: &mut W,
        len: u64,
    ) -> Result<()> {
        let old_len = i64::try_from(self.old_len).unwrap_or(i64::MAX);
        let mut remaining = len;

        while remaining > 0 {
            let n = remaining.min(self.buf.len() as u64) as usize;
            let chunk = &mut self.buf[..n];
            self.diff
                .read_exact(chunk)
                .map_err(|e| Error::reading(Section::Diff, e))?;

            let start = self.old_pos;
            let end = start.saturating_add(n as i64);
            let lo = start.max(0);
            let hi = end.min(old_len);
            if lo < hi {
                let avail = (hi - lo) as usize;
                let offset = (lo - start) as usize;
                let old_chunk = &mut self.old_buf[..avail];
                old.seek(SeekFrom::Start(lo as u64))?;
                old.read_exact(old_chunk)
                    .map_err(|e| Error::reading(Section::Old, e))?;
                for (d, o) in chunk[offset..offset + avail].iter_mut().zip(old_chunk.iter()) {
                    *d = d.wrapping_add(*o);
                }
            }

            out.write_all(chunk)?;

            self.old_pos = end;
            self.new_pos += n as u64;
            remaining -= n as u64;
        }

        Ok(())
    }

    fn copy_extra<W: Write>(&mut self, out: &mut W, len: u64) -> Result<()> {
        let mut remaining = len;
        while remaining > 0 {
            let n = remaining.min(self.buf.len() as u64) as usize;
            let chunk = &mut self.buf[..n];
            self.extra
                .read_exact(chunk)
                .map_err(|e| Error::reading(Section::Extra, e))?;
            out.write_all(chunk)?;
            self.new_pos += n as u64;
            remaining -= n as u64;
        }
        Ok(())
    }
}

fn expect_end<B: Read>(block: &mut B, section: Section) -> Result<()> {
    let mut byte = [0u8; 1];
    loop {
        match block.read(&mut byte) {
            Ok(0) => return Ok(()),
            Ok(_) => {
                return Err(Error::CorruptPatch(format!(
                    "{section} holds bytes past the last control"
                )));
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::reading(section, e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Opening the patch
// ---------------------------------------------------------------------------

/// Read and validate the header through a fresh patch reader.
fn read_header<F, P>(open_patch: &mut F) -> Result<PatchHeader>
where
    F: FnMut() -> io::Result<P>,
    P: Read + Seek,
{
    let mut patch = open_patch()?;
    PatchHeader::read_from(&mut patch)
}

/// Open a patch reader positioned `offset` bytes past its starting point
/// and wrap it in a block decompressor.
fn open_block<F, P>(open_patch: &mut F, offset: u64) -> Result<BzDecoder<P>>
where
    F: FnMut() -> io::Result<P>,
    P: Read + Seek,
{
    let offset = i64::try_from(offset)
        .map_err(|_| Error::CorruptPatch(format!("block offset {offset} out of range")))?;
    let mut patch = open_patch()?;
    patch.seek(SeekFrom::Current(offset))?;
    Ok(BlockCompression::reader(patch))
}

/// Apply a patch to `old`, writing the reconstructed new data to `output`.
///
/// `open_patch` must return a reader positioned at the start of the patch
/// each time it is called; four readers are opened and three of them are
/// alive at the same time (separate file handles, or independent cursors
/// over shared bytes).
///
/// The header is fully validated before anything is written. A failure
/// later on leaves `output` incomplete.
pub fn apply<R, F, P, W>(
    old: &mut R,
    mut open_patch: F,
    output: &mut W,
    opts: &ApplyOptions,
) -> Result<u64>
where
    R: Read + Seek,
    F: FnMut() -> io::Result<P>,
    P: Read + Seek,
    W: Write,
{
    if opts.buffer_size == 0 {
        return Err(Error::InvalidArgument("buffer size must be non-zero".into()));
    }

    let header = read_header(&mut open_patch)?;
    let old_len = old.seek(SeekFrom::End(0))?;
    debug!(
        "apply: old {old_len} bytes, control block {} bytes, diff block {} bytes, new {} bytes",
        header.control_len, header.diff_len, header.new_len
    );

    let control = open_block(&mut open_patch, header.control_offset())?;
    let diff = open_block(&mut open_patch, header.diff_offset())?;
    let extra = open_block(&mut open_patch, header.extra_offset())?;

    let mut applier = PatchApplier::new(&header, old_len, control, diff, extra, opts.buffer_size);
    let written = applier.run(old, output)?;
    debug!("apply: {} controls, {written} bytes written", applier.controls_applied());
    applier.finish()?;
    Ok(written)
}

/// Decode the header and every control triple of a patch without applying
/// it.
pub fn read_controls<F, P>(mut open_patch: F) -> Result<(PatchHeader, Vec<Control>)>
where
    F: FnMut() -> io::Result<P>,
    P: Read + Seek,
{
    let header = read_header(&mut open_patch)?;
    let mut block = open_block(&mut open_patch, header.control_offset())?;
    let mut controls = Vec::new();
    while let Some(control) =
        Control::read_from(&mut block).map_err(|e| Error::reading(Section::Control, e))?
    {
        controls.push(control);
    }
    Ok((header, controls))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
