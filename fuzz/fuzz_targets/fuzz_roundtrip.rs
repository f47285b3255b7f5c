#![no_main]
use libfuzzer_sys::fuzz_target;

// Compression followed by decompression must reproduce the input exactly,
// for any input and a block size small enough to exercise block splits.
fuzz_target!(|data: &[u8]| {
    let mut packed = Vec::new();
    let mut input = data;
    bcm::compress(&mut input, &mut packed, 1 << 12).unwrap();

    let mut unpacked = Vec::new();
    let mut coded = &packed[..];
    bcm::decompress(&mut coded, &mut unpacked).unwrap();
    assert_eq!(data, &unpacked[..]);
});
