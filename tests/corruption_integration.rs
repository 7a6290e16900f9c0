use std::io::Cursor;

use oxidiff::codec::{self, ApplyOptions};
use oxidiff::format::int::encode_i64;
use oxidiff::{Error, Section, apply_patch, create_patch};

fn sample_patch() -> (Vec<u8>, Vec<u8>) {
    let old = b"The quick brown fox jumps over the lazy dog".repeat(20);
    let mut new = old.clone();
    new[123] = b'#';
    new.extend_from_slice(b" and then some");
    (old.clone(), create_patch(&old, &new).unwrap())
}

/// Apply and return the error along with whatever was written.
fn apply_err(old: &[u8], patch: &[u8]) -> (Error, Vec<u8>) {
    let mut out = Vec::new();
    let err = codec::apply(
        &mut Cursor::new(old),
        || Ok(Cursor::new(patch)),
        &mut out,
        &ApplyOptions::default(),
    )
    .unwrap_err();
    (err, out)
}

#[test]
fn bad_magic_fails_before_output() {
    let (old, mut patch) = sample_patch();
    patch[7] = b'1';
    let (err, out) = apply_err(&old, &patch);
    assert!(matches!(err, Error::CorruptPatch(_)), "{err:?}");
    assert!(out.is_empty());
}

#[test]
fn negative_header_lengths_fail_before_output() {
    for field in [8, 16, 24] {
        let (old, mut patch) = sample_patch();
        let mut raw = [0u8; 8];
        encode_i64(-5, &mut raw);
        patch[field..field + 8].copy_from_slice(&raw);
        let (err, out) = apply_err(&old, &patch);
        assert!(matches!(err, Error::CorruptPatch(_)), "field {field}: {err:?}");
        assert!(out.is_empty(), "field {field}");
    }
}

#[test]
fn truncated_header() {
    let (old, patch) = sample_patch();
    let (err, _) = apply_err(&old, &patch[..20]);
    assert!(matches!(
        err,
        Error::UnexpectedEndOfInput {
            section: Section::Header
        }
    ));
}

#[test]
fn truncated_tail_is_an_error() {
    let (old, patch) = sample_patch();
    let err = apply_patch(&old, &patch[..patch.len() - 10]).unwrap_err();
    assert!(
        matches!(
            err,
            Error::CorruptPatch(_) | Error::UnexpectedEndOfInput { .. } | Error::Io(_)
        ),
        "{err:?}"
    );
}

#[test]
fn understated_new_length_is_corrupt() {
    let (old, mut patch) = sample_patch();
    let mut raw = [0u8; 8];
    encode_i64(10, &mut raw);
    patch[24..32].copy_from_slice(&raw);
    let (err, out) = apply_err(&old, &patch);
    assert!(matches!(err, Error::CorruptPatch(_)), "{err:?}");
    assert!(out.len() <= 10);
}

#[test]
fn overstated_new_length_runs_out_of_controls() {
    let (old, mut patch) = sample_patch();
    let mut raw = [0u8; 8];
    encode_i64(1 << 30, &mut raw);
    patch[24..32].copy_from_slice(&raw);
    let (err, _) = apply_err(&old, &patch);
    assert!(matches!(
        err,
        Error::UnexpectedEndOfInput {
            section: Section::Control
        }
    ));
}

#[test]
fn flipped_bytes_never_panic() {
    let (old, patch) = sample_patch();
    for i in (32..patch.len()).step_by(7) {
        let mut damaged = patch.clone();
        damaged[i] ^= 0x5A;
        // Any outcome is fine as long as it is a value, not a panic.
        let _ = apply_patch(&old, &damaged);
    }
}

#[test]
fn opener_failure_is_io_error() {
    let mut out = Vec::new();
    let err = codec::apply(
        &mut Cursor::new(b"old"),
        || -> std::io::Result<Cursor<Vec<u8>>> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
        },
        &mut out,
        &ApplyOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
