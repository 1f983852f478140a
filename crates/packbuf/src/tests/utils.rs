//! Test doubles for sinks and sources.

use std::{
    cell::RefCell,
    io::{self, Read, Write},
    rc::Rc,
};

/// Sink that records every `write` call as a separate chunk.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    chunks: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    /// Shared handle to the recorded chunks.
    pub(crate) fn chunks(&self) -> Rc<RefCell<Vec<Vec<u8>>>> {
        Rc::clone(&self.chunks)
    }
}

impl Write for RecordingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.chunks.borrow_mut().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that refuses every operation.
#[derive(Debug)]
pub(crate) struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("write refused"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("flush refused"))
    }
}

/// Sink that accepts writes but refuses to flush.
#[derive(Debug, Default)]
pub(crate) struct UnflushableSink {
    pub(crate) written: Vec<u8>,
}

impl Write for UnflushableSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("flush refused"))
    }
}

/// Source that fails every read.
#[derive(Debug)]
pub(crate) struct BrokenSource;

impl Read for BrokenSource {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("read refused"))
    }
}

/// Source that hands out at most `max` bytes per read.
#[derive(Debug)]
pub(crate) struct Trickle<R> {
    inner: R,
    max: usize,
}

impl<R> Trickle<R> {
    pub(crate) fn new(inner: R, max: usize) -> Self {
        Self { inner, max }
    }
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.max);
        self.inner.read(&mut buf[..len])
    }
}
