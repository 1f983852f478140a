use core::str::Utf8Error;
use std::io;

use thiserror::Error;

/// Failure of a buffer or codec operation.
#[derive(Error, Debug)]
pub enum Error {
    /// The sink rejected a flush, a pass-through write or a close.
    #[error("sink write failed: {0}")]
    Sink(#[source] io::Error),
    /// The source failed while the streaming window was being refilled.
    #[error("backing source failed: {0}")]
    Source(#[source] io::Error),
    /// Input ended before the requested bytes were available.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Bytes the read asked for.
        needed: usize,
        /// Bytes that were actually left.
        available: usize,
    },
    /// An end-of-stream probe found more data.
    #[error("not at end of input")]
    NotAtEnd,
    /// A seek would move before offset zero.
    #[error("seek to negative position {0}")]
    NegativePosition(i64),
    /// The source rejected a seek.
    #[error("seek failed: {0}")]
    Seek(#[source] io::Error),
    /// A varint width above eight bytes.
    #[error("invalid varint width {0}")]
    InvalidVarintWidth(u8),
    /// A string payload that is not UTF-8.
    #[error("invalid utf-8 in string payload: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Sink(e) | Error::Source(e) | Error::Seek(e) => e,
            Error::UnexpectedEof { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            Error::NegativePosition(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            Error::NotAtEnd | Error::InvalidVarintWidth(_) | Error::InvalidUtf8(_) => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
        }
    }
}
