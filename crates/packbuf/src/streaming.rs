//! Streaming decoder over an [`io::Read`] source.
//!
//! Window invariants
//! - `buf[at..at + n]` holds fetched but unconsumed bytes, `at + n <= buf.len()`.
//! - A request for `x` bytes compacts the unconsumed bytes to offset zero and
//!   reads into the space behind them until `n >= x`.
//! - A failed or exhausted read fails the request; nothing is consumed and
//!   bytes fetched so far stay in the window.
//! - A request larger than the window doubles it as bytes arrive, up to `x`.

use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, trace};

use crate::{Error, ReaderOptions, WireRead, options::WINDOW_SLACK};

/// Decoder that pulls from a source through a refillable window.
pub struct StreamingReader<R> {
    source: R,
    buf: Box<[u8]>,
    at: usize,
    n: usize,
}

impl<R: Read> StreamingReader<R> {
    /// Wraps `source` with the default window size.
    pub fn new(source: R) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    /// Wraps `source` with an explicit configuration.
    pub fn with_options(source: R, options: ReaderOptions) -> Self {
        Self {
            source,
            buf: vec![0u8; options.buffer_size + WINDOW_SLACK].into_boxed_slice(),
            at: 0,
            n: 0,
        }
    }

    /// Allocated window size.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes fetched from the source but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.n
    }

    /// The source this reader is bound to.
    pub fn get_ref(&self) -> &R {
        &self.source
    }

    /// Confirms the input is exhausted.
    ///
    /// Returns `Ok(())` only if nothing is buffered and one read of the
    /// source reports end-of-input. Data returned by that read is kept, so a
    /// failed probe loses nothing.
    pub fn probe_eof(&mut self) -> Result<(), Error> {
        if self.n > 0 {
            return Err(Error::NotAtEnd);
        }
        self.at = 0;
        match self.source.read(&mut self.buf) {
            Ok(0) => Ok(()),
            Ok(m) => {
                self.n = m;
                Err(Error::NotAtEnd)
            }
            Err(e) => Err(Error::Source(e)),
        }
    }

    /// Rebinds the reader to `source`, discarding the window contents, and
    /// returns the previous source. The window allocation is reused.
    pub fn recycle(&mut self, source: R) -> R {
        debug!(discarded = self.n, "recycling streaming reader");
        self.at = 0;
        self.n = 0;
        core::mem::replace(&mut self.source, source)
    }

    /// Unwraps the source; unconsumed window bytes are lost. Dropping the
    /// source closes it.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Ensures at least `x` unconsumed bytes are in the window.
    #[inline]
    fn fill(&mut self, x: usize) -> Result<(), Error> {
        if self.n >= x {
            return Ok(());
        }
        self.refill(x)
    }

    #[cold]
    fn refill(&mut self, x: usize) -> Result<(), Error> {
        self.buf.copy_within(self.at..self.at + self.n, 0);
        self.at = 0;
        while self.n < x {
            if self.n == self.buf.len() {
                self.enlarge(x);
            }
            match self.source.read(&mut self.buf[self.n..]) {
                Ok(0) => {
                    return Err(Error::UnexpectedEof {
                        needed: x,
                        available: self.n,
                    });
                }
                Ok(m) => {
                    trace!(
                        requested = x,
                        buffered = self.n,
                        read = m,
                        "refilled read window"
                    );
                    self.n += m;
                }
                Err(e) => return Err(Error::Source(e)),
            }
        }
        Ok(())
    }

    /// Doubles the window, capped at `x`.
    #[cold]
    fn enlarge(&mut self, x: usize) {
        let to = x.min(self.buf.len().saturating_mul(2).max(WINDOW_SLACK));
        debug!(from = self.buf.len(), to, "enlarging read window");
        let mut wider = vec![0u8; to].into_boxed_slice();
        wider[..self.n].copy_from_slice(&self.buf[..self.n]);
        self.buf = wider;
    }
}

impl<R: Read + Seek> StreamingReader<R> {
    /// Seeks the source and discards the window.
    ///
    /// [`SeekFrom::Current`] is relative to the next unconsumed byte, not to
    /// the source's own position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, Error> {
        let pos = match pos {
            SeekFrom::Current(offset) => {
                let rewound = i64::try_from(self.n)
                    .ok()
                    .and_then(|n| offset.checked_sub(n))
                    .ok_or_else(|| {
                        Error::Seek(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "relative seek offset out of range",
                        ))
                    })?;
                SeekFrom::Current(rewound)
            }
            other => other,
        };
        debug!(?pos, discarded = self.n, "seeking streaming reader");
        self.at = 0;
        self.n = 0;
        self.source.seek(pos).map_err(Error::Seek)
    }
}

impl<R: Read> WireRead for StreamingReader<R> {
    #[inline]
    fn peek_u8(&mut self) -> Result<u8, Error> {
        self.fill(1)?;
        Ok(self.buf[self.at])
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&[u8], Error> {
        self.fill(n)?;
        let start = self.at;
        self.at += n;
        self.n -= n;
        Ok(&self.buf[start..start + n])
    }
}

impl<R: Read> Read for StreamingReader<R> {
    /// Serves buffered bytes first, then at most one read of the source.
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if self.n == 0 && !dst.is_empty() {
            self.at = 0;
            self.n = self.source.read(&mut self.buf)?;
        }
        let len = dst.len().min(self.n);
        dst[..len].copy_from_slice(&self.buf[self.at..self.at + len]);
        self.at += len;
        self.n -= len;
        Ok(len)
    }
}

impl<R> core::fmt::Debug for StreamingReader<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamingReader")
            .field("capacity", &self.buf.len())
            .field("at", &self.at)
            .field("n", &self.n)
            .finish_non_exhaustive()
    }
}
