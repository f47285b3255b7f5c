//! Burrows-Wheeler transform of a block.
//!
//! The forward transform sorts the rotations of the block with a virtual
//! sentinel appended (smaller than every byte), drops the sentinel from
//! the last column, and reports where it was dropped as a 1-based primary
//! index. Sorting rotations of `block + sentinel` is the same as sorting
//! the suffixes of `block` with shorter-suffix-first tie-breaking, which
//! is what the prefix-doubling sort below produces.
//!
//! The inverse rebuilds the block in place from the transformed bytes and
//! the primary index via the LF mapping.

use crate::error::{BcmError, Result};

/// Forward-transform `block` in place.
///
/// Returns the 1-based primary index, in `[1, block.len()]`. An empty
/// block returns 0.
pub fn forward(block: &mut [u8]) -> usize {
    let n = block.len();
    if n == 0 {
        return 0;
    }

    let sa = suffix_array(block);

    // Sorted rotations of block+sentinel are the sentinel rotation first
    // (ending with the last input byte), then the suffixes in order. The
    // rotation of suffix i ends with block[i - 1], except suffix 0 whose
    // rotation ends with the sentinel itself and is dropped.
    let mut out = Vec::with_capacity(n);
    out.push(block[n - 1]);
    let mut idx = 0;
    for (rank, &start) in sa.iter().enumerate() {
        if start == 0 {
            idx = rank + 1;
        } else {
            out.push(block[start as usize - 1]);
        }
    }

    block.copy_from_slice(&out);
    idx
}

/// Suffix array by prefix doubling.
///
/// Ranks double in resolved prefix length each round; the sort key pairs
/// the rank at `i` with the rank at `i + k`, where a suffix that ends
/// before `i + k` sorts first. O(n log^2 n), no dependencies.
fn suffix_array(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    let mut sa: Vec<u32> = (0..n as u32).collect();
    let mut rank: Vec<u32> = text.iter().map(|&b| u32::from(b)).collect();
    let mut fresh: Vec<u32> = vec![0; n];

    let mut k = 1usize;
    loop {
        let key = |i: u32| -> u64 {
            let i = i as usize;
            let head = u64::from(rank[i]);
            let tail = if i + k < n { u64::from(rank[i + k]) + 1 } else { 0 };
            (head << 32) | tail
        };

        sa.sort_unstable_by_key(|&i| key(i));

        fresh[sa[0] as usize] = 0;
        for w in 1..n {
            let bump = u32::from(key(sa[w]) != key(sa[w - 1]));
            fresh[sa[w] as usize] = fresh[sa[w - 1] as usize] + bump;
        }

        std::mem::swap(&mut rank, &mut fresh);
        if rank[sa[n - 1] as usize] as usize == n - 1 {
            // All ranks distinct: fully sorted.
            break;
        }
        k *= 2;
    }

    sa
}

/// Invert the transform in place.
///
/// `lf` is reusable scratch for the LF mapping; it is resized to the
/// block length. `idx` is the 1-based primary index and must already be
/// validated to lie in `[1, block.len()]`.
///
/// For well-formed input the LF chain is a single cycle through the
/// block. Corrupt input can produce a chain that escapes early; that is
/// detected and reported rather than read out of bounds.
pub fn inverse(block: &mut [u8], lf: &mut Vec<u32>, idx: usize) -> Result<()> {
    let n = block.len();
    if n == 0 {
        return Ok(());
    }
    debug_assert!(idx >= 1 && idx <= n);

    lf.clear();
    lf.resize(n, 0);

    // Bucket start per byte value, via counts at c + 1.
    let mut cnt = [0u32; 257];
    for &b in block.iter() {
        cnt[usize::from(b) + 1] += 1;
    }
    for c in 1..256 {
        cnt[c] += cnt[c - 1];
    }

    // LF mapping. The position at the primary index held the dropped
    // sentinel, so sources past it shift down by one; the slot fed from
    // i == 0 gets a sentinel value that is only ever read on the final
    // step of the walk below.
    for (i, &b) in block.iter().enumerate() {
        let slot = cnt[usize::from(b)] as usize;
        cnt[usize::from(b)] += 1;
        lf[slot] = (i as u32).wrapping_sub(u32::from(i < idx));
    }

    // cnt[c] is now the end of byte c's bucket. Walk the chain, decoding
    // each position back to its byte by binary search over the buckets.
    let mut p = idx - 1;
    for i in 0..n {
        let mut c = 0usize;
        let mut half = 127usize;
        for _ in 0..8 {
            if (cnt[c + half] as usize) <= p {
                c += half + 1;
            }
            half >>= 1;
        }
        block[i] = c as u8;

        p = lf[p] as usize;
        if p >= n && i + 1 < n {
            return Err(BcmError::CorruptInput);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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

    /// Reference transform: literally sort the rotations of input+sentinel.
    fn naive_bwt(input: &[u8]) -> (Vec<u8>, usize) {
        let mut s: Vec<i16> = input.iter().map(|&b| i16::from(b)).collect();
        s.push(-1);
        let m = s.len();

        let mut rotations: Vec<usize> = (0..m).collect();
        rotations.sort_by_key(|&r| (0..m).map(|o| s[(r + o) % m]).collect::<Vec<_>>());

        let mut out = Vec::with_capacity(input.len());
        let mut idx = 0;
        for (rank, &r) in rotations.iter().enumerate() {
            let last = s[(r + m - 1) % m];
            if last < 0 {
                idx = rank;
            } else {
                out.push(last as u8);
            }
        }
        (out, idx)
    }

    fn check_against_naive(input: &[u8]) {
        let (expected, expected_idx) = naive_bwt(input);
        let mut block = input.to_vec();
        let idx = forward(&mut block);
        assert_eq!(block, expected, "transform of {input:?}");
        assert_eq!(idx, expected_idx, "index of {input:?}");
    }

    fn check_round_trip(input: &[u8]) {
        let mut block = input.to_vec();
        let idx = forward(&mut block);
        if !input.is_empty() {
            assert!(idx >= 1 && idx <= input.len());
        }
        let mut lf = Vec::new();
        inverse(&mut block, &mut lf, idx).unwrap();
        assert_eq!(block, input);
    }

    #[test]
    fn test_known_transform() {
        let mut block = *b"banana";
        let idx = forward(&mut block);
        assert_eq!(&block, b"annbaa");
        assert_eq!(idx, 4);

        let mut lf = Vec::new();
        inverse(&mut block, &mut lf, idx).unwrap();
        assert_eq!(&block, b"banana");
    }

    #[test]
    fn test_matches_rotation_sort() {
        check_against_naive(b"A");
        check_against_naive(b"abracadabra");
        check_against_naive(b"mississippi");
        check_against_naive(&[0, 0, 0, 0]);
        check_against_naive(&[255, 0, 255, 0, 255]);
        check_against_naive(&lcg_bytes(7, 257));
        check_against_naive(&lcg_bytes(8, 500));
    }

    #[test]
    fn test_round_trips() {
        check_round_trip(b"");
        check_round_trip(b"A");
        check_round_trip(b"to be or not to be");
        check_round_trip(&vec![0x55; 4096]);
        let ramp: Vec<u8> = (0..=255).collect();
        check_round_trip(&ramp);
        check_round_trip(&lcg_bytes(99, 100_000));
    }

    #[test]
    fn test_single_byte() {
        let mut block = [0x41];
        assert_eq!(forward(&mut block), 1);
        assert_eq!(block, [0x41]);
    }

    #[test]
    fn test_lying_primary_index_never_panics() {
        // A wrong primary index must either invert to some block or
        // report corruption; it must never read out of bounds.
        let mut lf = Vec::new();
        for idx in 1..=4 {
            let mut block = *b"bbba";
            let _ = inverse(&mut block, &mut lf, idx);
        }
    }
}
