#![no_main]
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes must decode to an error or valid output, never panic.
fuzz_target!(|data: &[u8]| {
    let mut input = data;
    let mut output = Vec::new();
    let _ = bcm::decompress(&mut input, &mut output);
});
