#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let split = 1 + (data[0] as usize % (data.len() - 1));
    let old = &data[1..split];
    let new = &data[split..];

    let patch = oxidiff::create_patch(old, new).unwrap();
    let rebuilt = oxidiff::apply_patch(old, &patch).unwrap();
    assert_eq!(rebuilt, new);
});
