/// Default capacity of a [`FixedBufferWriter`](crate::FixedBufferWriter).
pub(crate) const DEFAULT_WRITE_CAPACITY: usize = 100_000;

/// Default window size of a [`StreamingReader`](crate::StreamingReader).
pub(crate) const DEFAULT_READ_BUFFER: usize = 100_000;

/// Extra window space allocated beyond the requested buffer size.
pub(crate) const WINDOW_SLACK: usize = 512;

/// Configuration for a [`FixedBufferWriter`](crate::FixedBufferWriter).
///
/// # Examples
///
/// ```rust
/// use packbuf::{FixedBufferWriter, WriterOptions};
///
/// let writer = FixedBufferWriter::with_options(
///     Vec::new(),
///     WriterOptions {
///         capacity: 4096,
///     },
/// );
/// assert_eq!(writer.capacity(), 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterOptions {
    /// Size of the internal array in bytes.
    ///
    /// Writes are batched until the array would overflow; a single payload
    /// larger than this goes straight to the sink. A capacity of zero makes
    /// every write a pass-through.
    ///
    /// # Default
    ///
    /// `100_000`
    pub capacity: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WRITE_CAPACITY,
        }
    }
}

/// Configuration for a [`StreamingReader`](crate::StreamingReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderOptions {
    /// Requested window size in bytes. The window is allocated 512 bytes
    /// larger, and grows if a single read asks for more than it holds.
    ///
    /// # Default
    ///
    /// `100_000`
    pub buffer_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_READ_BUFFER,
        }
    }
}
