use core::{convert::Infallible, str::Utf8Error};
use std::io;

use bstr::BStr;
use tracing::trace;

use crate::WireWrite;

/// In-memory encoder whose backing array doubles on overflow.
///
/// Capacity only ever increases; [`reset`](Self::reset) keeps it.
#[derive(Clone, Default)]
pub struct GrowableBuffer {
    data: Vec<u8>,
    cursor: usize,
}

impl GrowableBuffer {
    /// An empty buffer with `capacity` bytes preallocated.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity],
            cursor: 0,
        }
    }

    /// Forgets the written bytes, keeping the allocation.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Bytes written since the last reset.
    pub fn len(&self) -> usize {
        self.cursor
    }

    /// Whether nothing has been written since the last reset.
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Size of the backing array.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.cursor]
    }

    /// The written bytes as loosely-UTF-8 text.
    pub fn as_bstr(&self) -> &BStr {
        BStr::new(self.as_bytes())
    }

    /// The written bytes as text, if they are valid UTF-8.
    pub fn to_str(&self) -> Result<&str, Utf8Error> {
        core::str::from_utf8(self.as_bytes())
    }

    /// Makes room for `extra` more bytes past the cursor.
    #[inline]
    fn reserve(&mut self, extra: usize) {
        if self.cursor + extra > self.data.len() {
            self.grow(extra);
        }
    }

    #[cold]
    fn grow(&mut self, extra: usize) {
        let len = (self.data.len() + extra) * 2;
        trace!(from = self.data.len(), to = len, "growing buffer");
        self.data.resize(len, 0);
    }
}

impl WireWrite for GrowableBuffer {
    type Error = Infallible;

    #[inline]
    fn write_slice(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        self.reserve(bytes.len());
        self.data[self.cursor..self.cursor + bytes.len()].copy_from_slice(bytes);
        self.cursor += bytes.len();
        Ok(())
    }

    #[inline]
    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), Infallible> {
        self.reserve(N);
        self.data[self.cursor..self.cursor + N].copy_from_slice(&bytes);
        self.cursor += N;
        Ok(())
    }
}

impl io::Write for GrowableBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Ok(()) = self.write_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Buffers compare by their written bytes; capacity is ignored.
impl PartialEq for GrowableBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for GrowableBuffer {}

impl AsRef<[u8]> for GrowableBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl core::fmt::Debug for GrowableBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("bytes", &self.as_bstr())
            .field("capacity", &self.data.len())
            .finish()
    }
}
