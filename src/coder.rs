//! Binary range coder with byte-wise renormalization.
//!
//! A 32-bit interval coder: the encoder narrows `[low, high]` around each
//! bit according to an externally supplied probability and emits the top
//! byte whenever encoder and decoder agree on it (`low` and `high` share
//! their top byte). There is no carry bookkeeping; the `+1` offset when
//! coding a 0-bit keeps the interval non-empty, and the shift always fires
//! before it can collapse.
//!
//! Probabilities are fractions of `1 << P_LOG`. The context model codes
//! with `P_LOG = 18`; fixed 32-bit fields are coded bit-by-bit at
//! probability one half (`P_LOG = 1`, `p = 1`).

use std::io::{self, Read, Write};

const TOP_BYTE_SHIFT: u32 = 24;

/// Encoding half of the range coder, writing to `W`.
///
/// Wrap the destination in a `BufWriter` when it is a file; the coder
/// emits one byte at a time.
pub struct RangeEncoder<W: Write> {
    low: u32,
    high: u32,
    output: W,
}

impl<W: Write> RangeEncoder<W> {
    pub fn new(output: W) -> Self {
        Self { low: 0, high: 0xFFFF_FFFF, output }
    }

    /// Encode one bit with probability `p / (1 << P_LOG)` of being 1.
    ///
    /// `p` must satisfy `0 < p < (1 << P_LOG)`.
    #[inline]
    pub fn encode_bit<const P_LOG: u32>(&mut self, bit: bool, p: u32) -> io::Result<()> {
        let range = u64::from(self.high - self.low);
        let mid = self.low + ((range * u64::from(p)) >> P_LOG) as u32;

        if bit {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }

        while (self.low ^ self.high) < (1 << TOP_BYTE_SHIFT) {
            self.output.write_all(&[(self.low >> TOP_BYTE_SHIFT) as u8])?;
            self.low <<= 8;
            self.high = (self.high << 8) | 0xFF;
        }

        Ok(())
    }

    /// Code 32 bits MSB-first at probability one half.
    pub fn put_u32(&mut self, x: u32) -> io::Result<()> {
        let mut mask = 1u32 << 31;
        while mask > 0 {
            self.encode_bit::<1>(x & mask != 0, 1)?;
            mask >>= 1;
        }
        Ok(())
    }

    /// Emit the four bytes of `low` and hand back the writer.
    ///
    /// The decoder pre-reads exactly four bytes at startup, so these
    /// trailing bytes keep the streams in lockstep.
    pub fn finish(mut self) -> io::Result<W> {
        for _ in 0..4 {
            self.output.write_all(&[(self.low >> TOP_BYTE_SHIFT) as u8])?;
            self.low <<= 8;
        }
        Ok(self.output)
    }
}

/// Decoding half of the range coder, reading from `R`.
///
/// Construction pulls four bytes to seed the code word; decoding then
/// mirrors the encoder's interval updates exactly.
pub struct RangeDecoder<R: Read> {
    low: u32,
    high: u32,
    code: u32,
    input: R,
}

impl<R: Read> RangeDecoder<R> {
    pub fn new(input: R) -> io::Result<Self> {
        let mut dec = Self { low: 0, high: 0xFFFF_FFFF, code: 0, input };
        for _ in 0..4 {
            dec.code = (dec.code << 8) | u32::from(dec.next_byte()?);
        }
        Ok(dec)
    }

    #[inline]
    fn next_byte(&mut self) -> io::Result<u8> {
        let mut byte = [0u8; 1];
        self.input.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Decode one bit that was encoded with probability `p / (1 << P_LOG)`.
    #[inline]
    pub fn decode_bit<const P_LOG: u32>(&mut self, p: u32) -> io::Result<bool> {
        let range = u64::from(self.high - self.low);
        let mid = self.low + ((range * u64::from(p)) >> P_LOG) as u32;

        let bit = self.code <= mid;
        if bit {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }

        while (self.low ^ self.high) < (1 << TOP_BYTE_SHIFT) {
            self.low <<= 8;
            self.high = (self.high << 8) | 0xFF;
            self.code = (self.code << 8) | u32::from(self.next_byte()?);
        }

        Ok(bit)
    }

    /// Decode 32 bits MSB-first at probability one half.
    pub fn get_u32(&mut self) -> io::Result<u32> {
        let mut x = 0u32;
        for _ in 0..32 {
            x = (x << 1) | u32::from(self.decode_bit::<1>(1)?);
        }
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Deterministic pseudo-random stream for probabilities and bits.
    fn lcg(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        *state >> 33
    }

    #[test]
    fn test_u32_round_trip() {
        let values = [0u32, 1, 0xFFFF_FFFF, 0x1234_5678, 0x8000_0000, 42];

        let mut enc = RangeEncoder::new(Vec::new());
        for &v in &values {
            enc.put_u32(v).unwrap();
        }
        let packed = enc.finish().unwrap();

        let mut dec = RangeDecoder::new(&packed[..]).unwrap();
        for &v in &values {
            assert_eq!(dec.get_u32().unwrap(), v);
        }
    }

    #[test]
    fn test_biased_bits_round_trip() {
        // Bits and probabilities drawn from the same generator on both
        // sides; probabilities span (0, 1 << 18).
        let mut state = 0x1357_9BDF;
        let mut bits = Vec::with_capacity(10_000);
        let mut probs = Vec::with_capacity(10_000);
        for _ in 0..10_000 {
            probs.push((lcg(&mut state) % ((1 << 18) - 1) + 1) as u32);
            bits.push(lcg(&mut state) & 7 == 0);
        }

        let mut enc = RangeEncoder::new(Vec::new());
        for (&bit, &p) in bits.iter().zip(&probs) {
            enc.encode_bit::<18>(bit, p).unwrap();
        }
        let packed = enc.finish().unwrap();

        let mut dec = RangeDecoder::new(&packed[..]).unwrap();
        for (&bit, &p) in bits.iter().zip(&probs) {
            assert_eq!(dec.decode_bit::<18>(p).unwrap(), bit);
        }
    }

    #[test]
    fn test_skewed_probability_compresses() {
        // 4096 zero-bits at a strongly zero-leaning probability should
        // shrink well below one byte per bit.
        let mut enc = RangeEncoder::new(Vec::new());
        for _ in 0..4096 {
            enc.encode_bit::<18>(false, 1).unwrap();
        }
        let packed = enc.finish().unwrap();
        assert!(packed.len() < 64, "packed to {} bytes", packed.len());
    }

    #[test]
    fn test_truncated_stream_errors() {
        let mut enc = RangeEncoder::new(Vec::new());
        for _ in 0..64 {
            enc.put_u32(0xA5A5_A5A5).unwrap();
        }
        let packed = enc.finish().unwrap();

        let cut = &packed[..packed.len() / 2];
        let mut dec = RangeDecoder::new(cut).unwrap();
        let err = (0..64).find_map(|_| dec.get_u32().err()).unwrap();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
