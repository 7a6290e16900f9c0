#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary patch bytes must only ever produce errors, never panics.
    let _ = oxidiff::apply_patch(&[], data);

    // Also with a non-empty old input.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (old, patch) = data.split_at(split);
        let _ = oxidiff::apply_patch(old, patch);
    }
});
