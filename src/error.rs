//! Error types for BCM compression and decompression.
//!
//! All failure paths surface as [`BcmError`]. There is no local recovery:
//! a corrupt stream aborts decompression at the first inconsistency, and a
//! CRC mismatch is only detectable once the whole stream has been decoded.

use std::fmt;
use std::io;

/// Error type for BCM operations.
///
/// Covers the full failure taxonomy of the format:
///
/// | Category | Variant | Detected |
/// |----------|---------|----------|
/// | Format | [`InvalidSignature`] | before any output is written |
/// | Corruption | [`CorruptInput`] | at block headers or during inverse BWT |
/// | Corruption | [`CrcMismatch`] | at end of stream, after output is written |
/// | I/O | [`Io`] | anywhere |
///
/// [`InvalidSignature`]: BcmError::InvalidSignature
/// [`CorruptInput`]: BcmError::CorruptInput
/// [`CrcMismatch`]: BcmError::CrcMismatch
/// [`Io`]: BcmError::Io
#[derive(Debug)]
pub enum BcmError {
    /// The input does not start with the `BCM!` magic bytes.
    InvalidSignature,

    /// Structural corruption in the coded stream.
    ///
    /// Raised when a block length exceeds the decoder's allocation, a
    /// primary index falls outside `[1, n]`, or the inverse transform's
    /// LF chain escapes the block.
    CorruptInput,

    /// The CRC-32 recorded in the trailer does not match the decoded bytes.
    ///
    /// The output has already been written in full when this is raised;
    /// the caller decides whether to keep it.
    CrcMismatch {
        /// CRC-32 recorded in the compressed stream.
        expected: u32,
        /// CRC-32 of the bytes actually produced.
        actual: u32,
    },

    /// An I/O error from the underlying reader or writer.
    ///
    /// A truncated stream shows up here as
    /// [`std::io::ErrorKind::UnexpectedEof`].
    Io(io::Error),
}

impl fmt::Display for BcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "Not in BCM format"),
            Self::CorruptInput => write!(f, "Corrupt input!"),
            Self::CrcMismatch { expected, actual } => {
                write!(f, "CRC error! (expected {expected:08x}, got {actual:08x})")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for BcmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BcmError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, BcmError>;
