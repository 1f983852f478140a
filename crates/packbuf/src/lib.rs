//! Compact little-endian wire format with throughput-oriented buffers.
//!
//! Two writers and two readers share one byte layout:
//!
//! - [`FixedBufferWriter`] batches writes in a fixed-size array and flushes to
//!   an [`std::io::Write`] sink only when the array would overflow.
//! - [`GrowableBuffer`] encodes into memory, doubling its backing array on
//!   overflow.
//! - [`StreamingReader`] decodes from an [`std::io::Read`] source through a
//!   refillable window.
//! - [`BytesReader`] decodes from a borrowed slice without copying.
//!
//! The encodings themselves live on the [`WireWrite`] and [`WireRead`] traits
//! so every writer/reader pairing agrees on the format.
//!
//! ```rust
//! use packbuf::{BytesReader, GrowableBuffer, WireRead, WireWrite};
//!
//! let mut buf = GrowableBuffer::with_capacity(16);
//! let Ok(()) = buf.write_varint(1000);
//! let Ok(()) = buf.write_str8("hello");
//!
//! let mut r = BytesReader::new(buf.as_bytes());
//! assert_eq!(r.read_varint().unwrap(), 1000);
//! assert_eq!(r.read_string8().unwrap(), "hello");
//! assert!(r.is_at_end());
//! ```

mod bytes_reader;
mod error;
mod fixed;
mod growable;
mod options;
mod record;
mod rune;
mod streaming;
mod varint;
mod wire;

#[cfg(test)]
mod tests;

pub use bytes_reader::BytesReader;
pub use error::Error;
pub use fixed::FixedBufferWriter;
pub use growable::GrowableBuffer;
pub use options::{ReaderOptions, WriterOptions};
pub use record::{Special, Special2};
pub use rune::{REPLACEMENT, encode_rune, narrow_sequence_len};
pub use streaming::StreamingReader;
pub use varint::varint_width;
pub use wire::{WireRead, WireWrite};
