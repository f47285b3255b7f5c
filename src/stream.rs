//! Block pipeline and container framing.
//!
//! A compressed file is the 4-byte magic followed by one range-coded
//! stream. Decoded, that stream is a sequence of blocks — length, primary
//! index, then the transformed bytes — terminated by a zero length and
//! the CRC-32 of the original data:
//!
//! ```text
//! "BCM!" | { n, idx, n transformed bytes }* | 0 | crc32 | 4 flush bytes
//! ```
//!
//! Lengths and indices are coded through `put_u32`/`get_u32`; everything
//! after the magic lives inside the coder's framing, so the file has no
//! further byte-aligned structure. Model, coder, and CRC state carry
//! across blocks — the stream is one continuous coding session.

use std::io::{self, Read, Write};

use crate::bwt;
use crate::coder::{RangeDecoder, RangeEncoder};
use crate::crc32::Crc32;
use crate::error::{BcmError, Result};
use crate::model::Model;

/// Container magic, "BCM!" (bytes `42 43 4D 21` on disk).
pub const MAGIC: u32 = 0x214D_4342;

/// Default block size: 16 MiB.
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 24;

/// Largest block length the decoder accepts.
const MAX_BLOCK: usize = i32::MAX as usize;

/// Compress `input` to `output` in blocks of at most `block_size` bytes.
///
/// `block_size` is clamped to `[1, i32::MAX]`. Callers that know the
/// input length can pass `min(block_size, len)` to avoid over-allocating
/// for small inputs; the choice only affects memory use and ratio, never
/// the decoded result.
pub fn compress<R, W>(input: &mut R, output: &mut W, block_size: usize) -> Result<()>
where
    R: Read,
    W: Write,
{
    let block_size = block_size.clamp(1, MAX_BLOCK);

    output.write_all(&MAGIC.to_le_bytes())?;

    let mut crc = Crc32::new();
    let mut model = Model::new();
    let mut enc = RangeEncoder::new(output);
    let mut buf = vec![0u8; block_size];

    loop {
        let n = read_fill(input, &mut buf)?;
        if n == 0 {
            break;
        }
        crc.update(&buf[..n]);

        let idx = bwt::forward(&mut buf[..n]);

        enc.put_u32(n as u32)?;
        enc.put_u32(idx as u32)?;
        for &byte in &buf[..n] {
            model.encode_byte(&mut enc, byte)?;
        }
    }

    enc.put_u32(0)?;
    enc.put_u32(crc.value())?;
    enc.finish()?;
    Ok(())
}

/// Decompress `input` to `output`.
///
/// Buffers are sized from the first block's length; a later block that
/// claims to be larger is corruption. The CRC check runs after all
/// output has been written.
pub fn decompress<R, W>(input: &mut R, output: &mut W) -> Result<()>
where
    R: Read,
    W: Write,
{
    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;
    if u32::from_le_bytes(magic) != MAGIC {
        return Err(BcmError::InvalidSignature);
    }

    let mut crc = Crc32::new();
    let mut model = Model::new();
    let mut dec = RangeDecoder::new(input)?;

    let mut buf: Vec<u8> = Vec::new();
    let mut lf: Vec<u32> = Vec::new();
    let mut cap = 0usize;

    loop {
        let n = dec.get_u32()? as usize;
        if n == 0 {
            break;
        }
        if cap == 0 {
            if n > MAX_BLOCK {
                return Err(BcmError::CorruptInput);
            }
            cap = n;
            buf.resize(cap, 0);
        }

        let idx = dec.get_u32()? as usize;
        if n > cap || idx < 1 || idx > n {
            return Err(BcmError::CorruptInput);
        }

        for slot in buf[..n].iter_mut() {
            *slot = model.decode_byte(&mut dec)?;
        }

        bwt::inverse(&mut buf[..n], &mut lf, idx)?;
        crc.update(&buf[..n]);
        output.write_all(&buf[..n])?;
    }

    let expected = dec.get_u32()?;
    let actual = crc.value();
    if expected != actual {
        return Err(BcmError::CrcMismatch { expected, actual });
    }
    Ok(())
}

/// Read until `buf` is full or the source is exhausted.
fn read_fill<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(k) => filled += k,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
