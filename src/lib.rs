//! BCM-format block compressor.
//!
//! Lossless compression built from a Burrows-Wheeler front end and a
//! context-mixing binary range coder. The input is cut into blocks, each
//! block is BW-transformed, and the transformed bytes are coded bit by
//! bit under an adaptive model; a CRC-32 over the original data closes
//! the stream.
//!
//! ## Pipeline
//!
//! ```text
//! input bytes
//!       |
//! +-------------+
//! | block read  |  <- at most one block size per round
//! +-------------+
//!       |
//! +-------------+
//! | forward BWT |  <- clusters similar contexts, emits primary index
//! +-------------+
//!       |
//! +-------------+
//! | bit model   |  <- order-0/1/2 counters mixed, SSE-refined
//! +-------------+
//!       |
//! +-------------+
//! | range coder |  <- 32-bit interval, byte-wise renormalization
//! +-------------+
//!       |
//! compressed stream (+ CRC-32 trailer)
//! ```
//!
//! Model and coder state persist across blocks, so blocks cannot be
//! decoded independently; decompression is strictly sequential.
//!
//! ## Example
//!
//! ```rust
//! use bcm::{compress, decompress};
//!
//! let data = b"how much wood would a woodchuck chuck";
//!
//! let mut packed = Vec::new();
//! compress(&mut &data[..], &mut packed, 1 << 16).unwrap();
//!
//! let mut unpacked = Vec::new();
//! decompress(&mut &packed[..], &mut unpacked).unwrap();
//! assert_eq!(unpacked, data);
//! ```

pub mod bwt;
pub mod coder;
pub mod counter;
mod crc32;
pub mod error;
pub mod model;
mod stream;

pub use crc32::Crc32;
pub use error::{BcmError, Result};
pub use stream::{compress, decompress, DEFAULT_BLOCK_SIZE, MAGIC};
