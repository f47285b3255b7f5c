//! Compression and decompression throughput benchmarks.
//!
//! Run with: `cargo bench`
//! Compare with baseline: `cargo bench -- --save-baseline main`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn lcg_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

/// Text-like input: repetitive phrases with a sprinkle of noise, the
/// profile BWT compression is built for.
fn text_like(len: usize) -> Vec<u8> {
    let phrase = b"the quick brown fox jumps over the lazy dog. ";
    let noise = lcg_bytes(3, len / 16);
    let mut data = Vec::with_capacity(len);
    while data.len() < len {
        data.extend_from_slice(phrase);
        if let Some(&b) = noise.get(data.len() / 16) {
            data.push(b);
        }
    }
    data.truncate(len);
    data
}

fn bench_compress(c: &mut Criterion) {
    let data = text_like(1 << 20);

    let mut group = c.benchmark_group("compress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    group.bench_function("text_1mib", |b| {
        b.iter(|| {
            let mut packed = Vec::new();
            let mut input = &data[..];
            bcm::compress(&mut input, &mut packed, 1 << 20).unwrap();
            black_box(packed)
        });
    });

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let data = text_like(1 << 20);
    let mut packed = Vec::new();
    bcm::compress(&mut &data[..], &mut packed, 1 << 20).unwrap();

    let mut group = c.benchmark_group("decompress");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.sample_size(10);

    group.bench_function("text_1mib", |b| {
        b.iter(|| {
            let mut unpacked = Vec::new();
            let mut input = &packed[..];
            bcm::decompress(&mut input, &mut unpacked).unwrap();
            black_box(unpacked)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
