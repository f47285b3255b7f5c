//! Context-mixing bit model.
//!
//! Each byte is coded MSB-first as 8 binary decisions. For every bit the
//! model blends three adaptive counters — order-0, order-1 on the previous
//! byte, and the order-1 table probed with the byte before that — then
//! refines the blend through a secondary estimator (SSE): a per-context
//! table of 17 probability buckets, linearly interpolated, selected by
//! whether the stream is inside a run of identical bytes. After BWT the
//! input is exactly such a mix of long runs and locally-skewed regions,
//! which is what this split models.
//!
//! All model state persists across block boundaries; resetting any of it
//! mid-stream would break the wire format.

use std::io::{self, Read, Write};

use crate::coder::{RangeDecoder, RangeEncoder};
use crate::counter::Counter;

/// Log2 denominator of the probabilities handed to the range coder.
const P_LOG: u32 = 18;

/// Run length above which the run-mode SSE table takes over.
const RUN_THRESHOLD: u32 = 2;

pub struct Model {
    /// Order-0 counters, indexed by bit context.
    order0: [Counter<2>; 256],
    /// Order-1 counters, indexed by (previous byte, bit context).
    order1: Box<[[Counter<4>; 256]; 256]>,
    /// SSE tables, indexed by (run flag, bit context, probability bucket).
    sse: Box<[[[Counter<6>; 17]; 256]; 2]>,
    /// Previous byte.
    c1: usize,
    /// Byte before the previous one.
    c2: usize,
    /// Length of the current run of identical bytes.
    run: u32,
}

impl Model {
    pub fn new() -> Self {
        let mut sse = Box::new([[[Counter::with_p(0); 17]; 256]; 2]);
        for flag in sse.iter_mut() {
            for ctx in flag.iter_mut() {
                for (bucket, counter) in ctx.iter_mut().enumerate() {
                    // Linear ramp over the probability range; the top entry
                    // saturates at 0xFFFF instead of wrapping.
                    let p = ((bucket as u32) << 12) - u32::from(bucket == 16);
                    *counter = Counter::with_p(p as u16);
                }
            }
        }

        Self {
            order0: [Counter::new(); 256],
            order1: Box::new([[Counter::new(); 256]; 256]),
            sse,
            c1: 0,
            c2: 0,
            run: 0,
        }
    }

    /// Blend the three counters for `ctx` and refine through the SSE.
    ///
    /// Returns the coding probability (18-bit range) and the SSE bucket
    /// consulted, so the update can touch the same entries.
    #[inline]
    fn mix(&self, f: usize, ctx: usize) -> (u32, usize) {
        let p0 = u32::from(self.order0[ctx].p());
        let p1 = u32::from(self.order1[self.c1][ctx].p());
        let p2 = u32::from(self.order1[self.c2][ctx].p());
        let p = ((p0 + p1) * 7 + 2 * p2) >> 4;

        let j = (p >> 12) as usize;
        let x1 = i32::from(self.sse[f][ctx][j].p());
        let x2 = i32::from(self.sse[f][ctx][j + 1].p());
        let ssep = x1 + (((x2 - x1) * (p & 0xFFF) as i32) >> 12);

        (p + 3 * ssep as u32, j)
    }

    /// Update the counters consulted for this bit.
    ///
    /// The order-1 counter probed with `c2` is read-only: it contributes
    /// to the mix but is never trained. Changing that would change the
    /// bitstream.
    #[inline]
    fn train(&mut self, f: usize, ctx: usize, j: usize, bit: bool) {
        if bit {
            self.order0[ctx].update1();
            self.order1[self.c1][ctx].update1();
            self.sse[f][ctx][j].update1();
            self.sse[f][ctx][j + 1].update1();
        } else {
            self.order0[ctx].update0();
            self.order1[self.c1][ctx].update0();
            self.sse[f][ctx][j].update0();
            self.sse[f][ctx][j + 1].update0();
        }
    }

    /// Shift the finished byte into the history.
    #[inline]
    fn push_history(&mut self, byte: u8) {
        self.c2 = self.c1;
        self.c1 = usize::from(byte);
        if self.c1 == self.c2 {
            self.run += 1;
        } else {
            self.run = 0;
        }
    }

    /// Encode one byte, MSB first.
    pub fn encode_byte<W: Write>(
        &mut self,
        enc: &mut RangeEncoder<W>,
        byte: u8,
    ) -> io::Result<()> {
        let f = usize::from(self.run > RUN_THRESHOLD);

        let mut ctx = 1usize;
        for i in (0..8).rev() {
            let bit = byte & (1 << i) != 0;
            let (p, j) = self.mix(f, ctx);
            enc.encode_bit::<P_LOG>(bit, p)?;
            self.train(f, ctx, j, bit);
            ctx = (ctx << 1) | usize::from(bit);
        }

        self.push_history(byte);
        Ok(())
    }

    /// Decode one byte, MSB first.
    pub fn decode_byte<R: Read>(&mut self, dec: &mut RangeDecoder<R>) -> io::Result<u8> {
        let f = usize::from(self.run > RUN_THRESHOLD);

        let mut ctx = 1usize;
        while ctx < 256 {
            let (p, j) = self.mix(f, ctx);
            let bit = dec.decode_bit::<P_LOG>(p)?;
            self.train(f, ctx, j, bit);
            ctx = (ctx << 1) | usize::from(bit);
        }

        let byte = (ctx - 256) as u8;
        self.push_history(byte);
        Ok(byte)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
