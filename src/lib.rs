//! Oxidiff: bsdiff 4.x (`BSDIFF40`) binary patches in Rust.
//!
//! The crate provides:
//! - A suffix index over the old data (`index`)
//! - The delta scan producing control triples and payloads (`diff`)
//! - The patch container format (`format`) and its codec (`codec`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! Patches are interchangeable with the classic `bsdiff`/`bspatch` tools.
//!
//! # Quick Start
//!
//! ```
//! let old = b"hello old world";
//! let new = b"hello new world";
//!
//! let patch = oxidiff::create_patch(old, new).unwrap();
//! let rebuilt = oxidiff::apply_patch(old, &patch).unwrap();
//! assert_eq!(rebuilt, new);
//! ```

use std::io::Cursor;

pub mod codec;
pub mod diff;
pub mod error;
pub mod format;
pub mod index;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::{ApplyOptions, DiffOptions};
pub use error::{Error, Result, Section};
pub use format::{Control, PatchHeader};

/// Create a patch turning `old` into `new`, held in memory.
pub fn create_patch(old: &[u8], new: &[u8]) -> Result<Vec<u8>> {
    let mut patch = Cursor::new(Vec::new());
    codec::create(old, new, &mut patch, &DiffOptions::default())?;
    Ok(patch.into_inner())
}

/// Apply an in-memory patch to `old`, returning the new data.
pub fn apply_patch(old: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
    let header = PatchHeader::read_from(&mut &patch[..])?;
    // `new_len` comes from untrusted input; cap the up-front reservation.
    let reserve = usize::try_from(header.new_len).unwrap_or(usize::MAX).min(1 << 24);
    let mut out = Vec::with_capacity(reserve);
    codec::apply(
        &mut Cursor::new(old),
        || Ok(Cursor::new(patch)),
        &mut out,
        &ApplyOptions::default(),
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_roundtrip() {
        let old = b"abcdefghijklmnopqrstuvwxyz".repeat(10);
        let mut new = old.clone();
        new[100] = b'!';
        new.truncate(200);
        let patch = create_patch(&old, &new).unwrap();
        assert_eq!(apply_patch(&old, &patch).unwrap(), new);
    }

    #[test]
    fn truncated_header_is_reported() {
        let err = apply_patch(b"", b"BSDIFF40\0\0").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedEndOfInput {
                section: Section::Header
            }
        ));
    }
}
