use std::io::Cursor;

use oxidiff::codec::{self, DiffOptions};
use oxidiff::format::int::{decode_i64, encode_i64};
use oxidiff::{apply_patch, create_patch};
use proptest::prelude::*;

fn create(old: &[u8], new: &[u8], level: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    codec::create(old, new, &mut out, &DiffOptions { level }).unwrap();
    out.into_inner()
}

proptest! {
    #[test]
    fn prop_create_apply_roundtrip(
        old in proptest::collection::vec(any::<u8>(), 0..4096),
        new in proptest::collection::vec(any::<u8>(), 0..4096),
        level in 1u32..=9u32
    ) {
        let patch = create(&old, &new, level);
        let rebuilt = apply_patch(&old, &patch).unwrap();
        prop_assert_eq!(rebuilt, new);
    }

    #[test]
    fn prop_small_alphabet_roundtrip(
        old in proptest::collection::vec(0u8..4, 0..2048),
        new in proptest::collection::vec(0u8..4, 0..2048)
    ) {
        // Few distinct bytes means long tied groups and many overlapping
        // candidate matches.
        let patch = create_patch(&old, &new).unwrap();
        prop_assert_eq!(apply_patch(&old, &patch).unwrap(), new);
    }

    #[test]
    fn prop_create_is_deterministic(
        old in proptest::collection::vec(any::<u8>(), 0..2048),
        new in proptest::collection::vec(any::<u8>(), 0..2048)
    ) {
        prop_assert_eq!(create_patch(&old, &new).unwrap(), create_patch(&old, &new).unwrap());
    }

    #[test]
    fn prop_small_mutation_keeps_patch_small(
        old in proptest::collection::vec(any::<u8>(), 2048..8192)
    ) {
        let mut new = old.clone();
        let len = new.len();
        for i in (0..len).step_by((len / 16).max(1)) {
            new[i] = new[i].wrapping_add(1);
        }
        let patch = create_patch(&old, &new).unwrap();
        prop_assert!(patch.len() < new.len(), "patch={} new={}", patch.len(), new.len());
    }

    #[test]
    fn prop_sign_magnitude_roundtrip(value in -i64::MAX..=i64::MAX) {
        let mut buf = [0u8; 8];
        encode_i64(value, &mut buf);
        prop_assert_eq!(decode_i64(&buf), value);
        prop_assert_eq!(buf[7] & 0x80 != 0, value < 0);
    }
}

#[test]
#[ignore = "performance properties are workload and machine dependent"]
fn perf_property_apply_not_pathological() {
    use std::time::Instant;
    let make = |n: usize| -> Vec<u8> { (0..n).map(|i| (i % 251) as u8).collect() };
    let old = make(4 * 1024 * 1024);
    let mut new = old.clone();
    for i in (0..new.len()).step_by(4096) {
        new[i] = new[i].wrapping_add(3);
    }

    let patch = create(&old, &new, 9);
    let t0 = Instant::now();
    let rebuilt = apply_patch(&old, &patch).unwrap();
    let dt = t0.elapsed();
    assert_eq!(rebuilt, new);
    assert!(dt.as_secs_f64() < 20.0, "apply took {:?}", dt);
}
