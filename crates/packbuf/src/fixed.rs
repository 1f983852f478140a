//! Fixed-capacity auto-flushing writer.
//!
//! Bytes accumulate in an array of constant size. A write that would not fit
//! first flushes `[0, cursor)` to the sink, then lands at the start of the
//! emptied array. A payload that is larger than the whole array goes
//! straight to the sink after the flush. The sink therefore sees exactly the
//! written byte sequence, in order.
//!
//! A failed flush is reported, but the flushed bytes are treated as gone: the
//! cursor still resets and the new payload is still buffered.

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::{Error, WireWrite, WriterOptions};

/// Buffered writer with a fixed-size internal array.
///
/// Call [`flush`](Self::flush) or [`close`](Self::close) when done; pending
/// bytes are not written on drop.
pub struct FixedBufferWriter<W> {
    sink: W,
    data: Box<[u8]>,
    cursor: usize,
}

impl<W: Write> FixedBufferWriter<W> {
    /// Wraps `sink` with the default capacity.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, WriterOptions::default())
    }

    /// Wraps `sink` with an explicit configuration.
    pub fn with_options(sink: W, options: WriterOptions) -> Self {
        Self {
            sink,
            data: vec![0u8; options.capacity].into_boxed_slice(),
            cursor: 0,
        }
    }

    /// Size of the internal array.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes currently buffered and not yet handed to the sink.
    pub fn buffered(&self) -> usize {
        self.cursor
    }

    /// The sink this writer is bound to.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Writes out any pending bytes.
    ///
    /// The sink's own [`Write::flush`] is not called; see
    /// [`close`](Self::close).
    pub fn flush(&mut self) -> Result<(), Error> {
        self.drain()
    }

    /// Flushes pending bytes, then flushes the sink and hands it back.
    ///
    /// When both steps fail the error from writing the pending bytes wins.
    /// Dropping the returned sink closes it.
    pub fn close(mut self) -> Result<W, Error> {
        let drained = self.drain();
        let flushed = self.sink.flush().map_err(Error::Sink);
        debug!(
            ok = drained.is_ok() && flushed.is_ok(),
            "closing fixed buffer writer"
        );
        drained.and(flushed)?;
        Ok(self.sink)
    }

    /// Rebinds the writer to `sink`, discarding any pending bytes, and
    /// returns the previous sink. The internal array is reused.
    pub fn recycle(&mut self, sink: W) -> W {
        debug!(discarded = self.cursor, "recycling fixed buffer writer");
        self.cursor = 0;
        core::mem::replace(&mut self.sink, sink)
    }

    /// Writes `[0, cursor)` to the sink and empties the array, even on failure.
    fn drain(&mut self) -> Result<(), Error> {
        if self.cursor == 0 {
            return Ok(());
        }
        trace!(bytes = self.cursor, "flushing write buffer");
        let pending = core::mem::take(&mut self.cursor);
        self.sink.write_all(&self.data[..pending]).map_err(Error::Sink)
    }

    #[cold]
    fn write_overflowing(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let drained = self.drain();
        if bytes.len() > self.data.len() {
            debug!(
                len = bytes.len(),
                capacity = self.data.len(),
                "payload exceeds buffer capacity, writing through"
            );
            let direct = self.sink.write_all(bytes).map_err(Error::Sink);
            return drained.and(direct);
        }
        self.data[..bytes.len()].copy_from_slice(bytes);
        self.cursor = bytes.len();
        drained
    }
}

impl<W: Write> WireWrite for FixedBufferWriter<W> {
    type Error = Error;

    #[inline]
    fn write_slice(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let end = self.cursor + bytes.len();
        if end > self.data.len() {
            return self.write_overflowing(bytes);
        }
        self.data[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(())
    }

    #[inline]
    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), Error> {
        match self.data.get_mut(self.cursor..self.cursor + N) {
            Some(slot) => {
                slot.copy_from_slice(&bytes);
                self.cursor += N;
                Ok(())
            }
            None => self.write_overflowing(&bytes),
        }
    }
}

impl<W: Write> Write for FixedBufferWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_slice(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain()?;
        self.sink.flush()
    }
}

impl<W> core::fmt::Debug for FixedBufferWriter<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FixedBufferWriter")
            .field("capacity", &self.data.len())
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use rstest::rstest;
    use tracing_test::traced_test;

    use super::*;
    use crate::tests::utils::{BrokenSink, RecordingSink, UnflushableSink};

    fn writer(capacity: usize) -> (FixedBufferWriter<RecordingSink>, Rc<RefCell<Vec<Vec<u8>>>>) {
        let sink = RecordingSink::default();
        let log = sink.chunks();
        (
            FixedBufferWriter::with_options(sink, WriterOptions { capacity }),
            log,
        )
    }

    fn concat(log: &Rc<RefCell<Vec<Vec<u8>>>>) -> Vec<u8> {
        log.borrow().concat()
    }

    #[test]
    fn small_writes_stay_buffered() {
        let (mut w, log) = writer(16);
        w.write_u32(7).unwrap();
        w.write_u8(1).unwrap();
        assert_eq!(w.buffered(), 5);
        assert!(log.borrow().is_empty());
        w.flush().unwrap();
        assert_eq!(concat(&log), [7, 0, 0, 0, 1]);
        assert_eq!(w.buffered(), 0);
    }

    #[test]
    fn exact_fill_does_not_flush() {
        let (mut w, log) = writer(4);
        w.write_u32(u32::MAX).unwrap();
        assert_eq!(w.buffered(), 4);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn overflow_flushes_before_buffering() {
        let (mut w, log) = writer(4);
        w.write_u16(0x0201).unwrap();
        w.write_u24(0x05_0403).unwrap();
        assert_eq!(*log.borrow(), vec![vec![1, 2]]);
        assert_eq!(w.buffered(), 3);
        w.flush().unwrap();
        assert_eq!(concat(&log), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn oversized_payload_bypasses_array() {
        let (mut w, log) = writer(4);
        w.write_u8(9).unwrap();
        w.write_slice(b"abcdefgh").unwrap();
        assert_eq!(*log.borrow(), vec![vec![9], b"abcdefgh".to_vec()]);
        assert_eq!(w.buffered(), 0);
    }

    #[test]
    fn array_wider_than_capacity_goes_through() {
        let (mut w, log) = writer(4);
        w.write_u64(u64::MAX).unwrap();
        assert_eq!(concat(&log), [0xFF; 8]);
        assert_eq!(w.buffered(), 0);
    }

    #[test]
    fn zero_capacity_writes_everything_through() {
        let (mut w, log) = writer(0);
        w.write_bool(true).unwrap();
        w.write_u16(3).unwrap();
        assert_eq!(*log.borrow(), vec![vec![1], vec![3, 0]]);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(7)]
    #[case(64)]
    fn interleaved_sizes_preserve_order(#[case] capacity: usize) {
        let (mut w, log) = writer(capacity);
        let mut expected = Vec::new();
        for i in 0..200u32 {
            let len = (i as usize * 7) % 23;
            #[allow(clippy::cast_possible_truncation)]
            let chunk: Vec<u8> = (0..len).map(|j| (i as usize + j) as u8).collect();
            w.write_slice(&chunk).unwrap();
            expected.extend_from_slice(&chunk);
            w.write_varint(u64::from(i) << (i % 57)).unwrap();
            let mut tmp = [0u8; 9];
            let n = crate::varint::encode_varint(u64::from(i) << (i % 57), &mut tmp);
            expected.extend_from_slice(&tmp[..n]);
            assert!(w.buffered() <= capacity);
        }
        w.flush().unwrap();
        assert_eq!(concat(&log), expected);
    }

    #[test]
    fn failed_flush_reports_and_drains() {
        let mut w = FixedBufferWriter::with_options(BrokenSink, WriterOptions { capacity: 4 });
        w.write_u16(1).unwrap();
        let err = w.write_u24(2).unwrap_err();
        assert!(matches!(err, Error::Sink(_)));
        // Flushed bytes are lost, the new payload is kept.
        assert_eq!(w.buffered(), 3);
    }

    #[test]
    fn close_prefers_pending_write_error() {
        let mut w = FixedBufferWriter::with_options(BrokenSink, WriterOptions { capacity: 8 });
        w.write_u8(1).unwrap();
        let err = w.close().unwrap_err();
        match err {
            Error::Sink(e) => assert_eq!(e.to_string(), "write refused"),
            other => panic!("expected sink error, got {other:?}"),
        }
    }

    #[test]
    fn close_reports_sink_flush_error_after_drain() {
        let sink = UnflushableSink::default();
        let mut w = FixedBufferWriter::with_options(sink, WriterOptions { capacity: 8 });
        w.write_u16(0x0201).unwrap();
        assert_eq!(w.get_ref().written, b"");
        w.flush().unwrap();
        assert_eq!(w.get_ref().written, [1, 2]);
        w.write_u8(3).unwrap();
        match w.close() {
            Err(Error::Sink(e)) => assert_eq!(e.to_string(), "flush refused"),
            other => panic!("expected flush error, got {other:?}"),
        }
    }

    #[test]
    fn io_flush_reports_sink_flush_error() {
        let sink = UnflushableSink::default();
        let mut w = FixedBufferWriter::with_options(sink, WriterOptions { capacity: 8 });
        w.write_u8(1).unwrap();
        let err = Write::flush(&mut w).unwrap_err();
        assert_eq!(err.to_string(), "flush refused");
        assert_eq!(w.get_ref().written, [1]);
        assert_eq!(w.buffered(), 0);
    }

    #[test]
    fn close_returns_flushed_sink() {
        let mut w = FixedBufferWriter::with_options(Vec::new(), WriterOptions { capacity: 8 });
        w.write_str8("hi").unwrap();
        assert_eq!(w.close().unwrap(), [2, b'h', b'i']);
    }

    #[test]
    fn recycle_discards_pending_and_rebinds() {
        let mut w = FixedBufferWriter::with_options(Vec::new(), WriterOptions { capacity: 8 });
        w.write_u8(1).unwrap();
        let old = w.recycle(Vec::new());
        assert!(old.is_empty());
        assert_eq!(w.buffered(), 0);
        assert_eq!(w.capacity(), 8);
        w.write_u8(2).unwrap();
        assert_eq!(w.close().unwrap(), [2]);
    }

    #[traced_test]
    #[test]
    fn flushes_and_pass_through_are_logged() {
        let (mut w, _log) = writer(2);
        w.write_u16(1).unwrap();
        w.write_u8(2).unwrap();
        assert!(logs_contain("flushing write buffer"));
        w.write_u32(3).unwrap();
        assert!(logs_contain("writing through"));
    }

    #[test]
    fn io_write_flush_reaches_sink() {
        let (mut w, log) = writer(8);
        Write::write_all(&mut w, b"xyz").unwrap();
        Write::flush(&mut w).unwrap();
        assert_eq!(concat(&log), b"xyz");
    }
}
