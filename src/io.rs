// File-level helpers for patch creation and application.
//
// `create_file()` and `apply_file()` wrap the codec with buffered file I/O
// and report sizes. With the `file-io` feature a SHA-256 of the new data is
// computed along the way.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
#[cfg(feature = "file-io")]
use std::io;

use log::debug;

use crate::codec::{self, ApplyOptions, DiffOptions};
use crate::error::Result;
use crate::format::PatchHeader;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `create_file()`.
#[derive(Debug, Clone)]
pub struct CreateStats {
    /// Old file size in bytes.
    pub old_size: u64,
    /// New file size in bytes.
    pub new_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Header written at the start of the patch.
    pub header: PatchHeader,
    /// SHA-256 of the new file (if `file-io` feature is enabled).
    pub new_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `apply_file()`.
#[derive(Debug, Clone)]
pub struct ApplyStats {
    /// Old file size in bytes.
    pub old_size: u64,
    /// Patch file size in bytes.
    pub patch_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// create_file
// ---------------------------------------------------------------------------

/// Create a patch turning the file at `old_path` into the file at
/// `new_path`, writing it to `patch_path`.
///
/// Both inputs are read fully into memory; the suffix sort needs random
/// access to the whole old file and the scan to the whole new file.
pub fn create_file(
    old_path: &Path,
    new_path: &Path,
    patch_path: &Path,
    opts: &DiffOptions,
) -> Result<CreateStats> {
    let old = fs::read(old_path)?;
    let new = fs::read(new_path)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(patch_path)?);
    let header = codec::create(&old, &new, &mut writer, opts)?;
    let patch_size = writer
        .into_inner()
        .map_err(|e| e.into_error())?
        .metadata()?
        .len();

    #[cfg(feature = "file-io")]
    let new_sha256 = Some(sha2::Sha256::digest(&new).into());
    #[cfg(not(feature = "file-io"))]
    let new_sha256: Option<[u8; 32]> = None;

    debug!(
        "create_file: {} -> {} ({patch_size} byte patch)",
        old_path.display(),
        new_path.display()
    );

    Ok(CreateStats {
        old_size: old.len() as u64,
        new_size: new.len() as u64,
        patch_size,
        header,
        new_sha256,
    })
}

// ---------------------------------------------------------------------------
// apply_file
// ---------------------------------------------------------------------------

/// Apply the patch at `patch_path` to the file at `old_path`, writing the
/// result to `output_path`.
///
/// The old file is read through a seekable handle rather than loaded, and
/// the patch is opened once per block so each block has its own cursor.
/// The header is checked before `output_path` is created, so a patch that
/// is not `BSDIFF40` leaves no output behind.
pub fn apply_file(
    old_path: &Path,
    patch_path: &Path,
    output_path: &Path,
    opts: &ApplyOptions,
) -> Result<ApplyStats> {
    let old_file = File::open(old_path)?;
    let old_size = old_file.metadata()?.len();
    let mut old = BufReader::with_capacity(BUF_SIZE, old_file);

    let patch_size = fs::metadata(patch_path)?.len();
    let open_patch = || File::open(patch_path).map(|f| BufReader::with_capacity(BUF_SIZE, f));
    PatchHeader::read_from(&mut open_patch()?)?;

    let mut output_writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);

    #[cfg(feature = "file-io")]
    let mut output_hasher = sha2::Sha256::new();

    #[cfg(feature = "file-io")]
    let output_size = {
        let mut hashing_writer = HashingWriter {
            inner: &mut output_writer,
            hasher: &mut output_hasher,
        };
        codec::apply(&mut old, open_patch, &mut hashing_writer, opts)?
    };

    #[cfg(not(feature = "file-io"))]
    let output_size = codec::apply(&mut old, open_patch, &mut output_writer, opts)?;

    output_writer.flush()?;

    #[cfg(feature = "file-io")]
    let output_sha256 = Some(output_hasher.finalize().into());
    #[cfg(not(feature = "file-io"))]
    let output_sha256: Option<[u8; 32]> = None;

    Ok(ApplyStats {
        old_size,
        patch_size,
        output_size,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing writer (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
struct HashingWriter<'a, W: Write> {
    inner: &'a mut W,
    hasher: &'a mut sha2::Sha256,
}

#[cfg(feature = "file-io")]
impl<W: Write> Write for HashingWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
