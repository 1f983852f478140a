use std::io::{self, SeekFrom};

use bstr::BStr;
use tracing::debug;

use crate::{Error, WireRead, rune::narrow_sequence_len};

/// Zero-copy decoder over a byte slice.
///
/// Every read advances the cursor by exactly the decoded width. Variable
/// length extraction hands out sub-slices of the original storage. Reading
/// past the end fails with [`Error::UnexpectedEof`] and leaves the cursor
/// where it was.
#[derive(Clone)]
pub struct BytesReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> BytesReader<'a> {
    /// Starts reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    /// Current cursor offset.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.cursor)
    }

    /// The whole underlying slice.
    pub fn get_ref(&self) -> &'a [u8] {
        self.data
    }

    /// Whether the cursor sits exactly at the end.
    pub fn is_at_end(&self) -> bool {
        self.cursor == self.data.len()
    }

    /// `Ok(())` at the end of the slice, [`Error::NotAtEnd`] otherwise.
    pub fn probe_eof(&self) -> Result<(), Error> {
        if self.is_at_end() {
            Ok(())
        } else {
            Err(Error::NotAtEnd)
        }
    }

    /// Borrows the next `n` bytes from the underlying slice.
    ///
    /// An empty read always succeeds, even with the cursor past the end.
    pub fn read_slice(&mut self, n: usize) -> Result<&'a [u8], Error> {
        if n == 0 {
            return Ok(&[]);
        }
        let data: &'a [u8] = self.data;
        let end = self.cursor.checked_add(n);
        match end.and_then(|end| data.get(self.cursor..end)) {
            Some(slice) => {
                self.cursor += n;
                Ok(slice)
            }
            None => Err(Error::UnexpectedEof {
                needed: n,
                available: self.remaining(),
            }),
        }
    }

    /// Borrows one 1..=3 byte UTF-8 sequence from the underlying slice.
    pub fn read_utf8_slice(&mut self) -> Result<&'a [u8], Error> {
        let len = narrow_sequence_len(self.peek_u8()?);
        self.read_slice(len)
    }

    /// Borrows text behind a one-byte length.
    pub fn read_str8(&mut self) -> Result<&'a str, Error> {
        let len = self.read_u8()?;
        Ok(core::str::from_utf8(self.read_slice(usize::from(len))?)?)
    }

    /// Borrows text behind a two-byte length.
    pub fn read_str16(&mut self) -> Result<&'a str, Error> {
        let len = self.read_u16()?;
        Ok(core::str::from_utf8(self.read_slice(usize::from(len))?)?)
    }

    /// Borrows text behind a four-byte length.
    pub fn read_str32(&mut self) -> Result<&'a str, Error> {
        let len = self.read_u32()?;
        Ok(core::str::from_utf8(self.read_slice(len as usize)?)?)
    }

    /// Moves the cursor. Positions past the end are allowed; positions
    /// before the start are rejected and leave the cursor unchanged.
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, Error> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(offset) => self.cursor as i128 + i128::from(offset),
            SeekFrom::End(offset) => self.data.len() as i128 + i128::from(offset),
        };
        if target < 0 {
            return Err(Error::NegativePosition(
                i64::try_from(target).unwrap_or(i64::MIN),
            ));
        }
        let cursor = usize::try_from(target).unwrap_or(usize::MAX);
        debug!(from = self.cursor, to = cursor, "seeking bytes reader");
        self.cursor = cursor;
        Ok(cursor as u64)
    }
}

impl WireRead for BytesReader<'_> {
    #[inline]
    fn peek_u8(&mut self) -> Result<u8, Error> {
        self.data
            .get(self.cursor)
            .copied()
            .ok_or(Error::UnexpectedEof {
                needed: 1,
                available: 0,
            })
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&[u8], Error> {
        self.read_slice(n)
    }
}

impl io::Read for BytesReader<'_> {
    fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let len = dst.len().min(self.remaining());
        let Ok(src) = self.read_slice(len) else {
            return Ok(0);
        };
        dst[..len].copy_from_slice(src);
        Ok(len)
    }
}

impl io::Seek for BytesReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(BytesReader::seek(self, pos)?)
    }
}

impl core::fmt::Debug for BytesReader<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BytesReader")
            .field("cursor", &self.cursor)
            .field(
                "rest",
                &BStr::new(self.data.get(self.cursor..).unwrap_or_default()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use rstest::rstest;

    use super::*;

    #[test]
    fn slices_borrow_original_storage() {
        let data = [3, b'a', b'b', b'c', 0xFF];
        let mut r = BytesReader::new(&data);
        let len = r.read_u8().unwrap();
        let s = r.read_slice(usize::from(len)).unwrap();
        assert_eq!(s, b"abc");
        assert!(core::ptr::eq(s.as_ptr(), data[1..].as_ptr()));
        assert_eq!(r.position(), 4);
        assert_eq!(r.remaining(), 1);
    }

    #[test]
    fn borrowed_strings_outlive_reader() {
        let data = [2, b'h', b'i'];
        let s = {
            let mut r = BytesReader::new(&data);
            r.read_str8().unwrap()
        };
        assert_eq!(s, "hi");
    }

    #[test]
    fn overrun_leaves_cursor_alone() {
        let mut r = BytesReader::new(&[1, 2, 3]);
        match r.read_u32() {
            Err(Error::UnexpectedEof { needed, available }) => {
                assert_eq!((needed, available), (4, 3));
            }
            other => panic!("expected eof, got {other:?}"),
        }
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u24().unwrap(), 0x03_0201);
        assert!(matches!(r.read_u8(), Err(Error::UnexpectedEof { .. })));
    }

    #[rstest]
    #[case(SeekFrom::Start(2), 2)]
    #[case(SeekFrom::Current(1), 2)]
    #[case(SeekFrom::Current(-1), 0)]
    #[case(SeekFrom::End(0), 4)]
    #[case(SeekFrom::End(-3), 1)]
    #[case(SeekFrom::End(6), 10)]
    fn seek_reference_points(#[case] pos: SeekFrom, #[case] expected: u64) {
        let mut r = BytesReader::new(&[0, 1, 2, 3]);
        r.read_u8().unwrap();
        assert_eq!(r.seek(pos).unwrap(), expected);
        assert_eq!(r.position() as u64, expected);
    }

    #[rstest]
    #[case(SeekFrom::Current(-2))]
    #[case(SeekFrom::End(-5))]
    fn seek_rejects_negative(#[case] pos: SeekFrom) {
        let mut r = BytesReader::new(&[0, 1, 2, 3]);
        r.read_u8().unwrap();
        assert!(matches!(r.seek(pos), Err(Error::NegativePosition(-1))));
        assert_eq!(r.position(), 1);
    }

    #[test]
    fn past_end_cursor_reads_fail() {
        let mut r = BytesReader::new(&[0, 1]);
        r.seek(SeekFrom::Start(5)).unwrap();
        assert_eq!(r.remaining(), 0);
        assert!(!r.is_at_end());
        assert!(r.read_u8().is_err());
        assert_eq!(WireRead::take(&mut r, 0).unwrap(), b"");
        assert_eq!(r.read_varint().ok(), None);
        assert_eq!(r.position(), 5);
    }

    #[test]
    fn eof_is_cursor_comparison() {
        let mut r = BytesReader::new(&[1]);
        assert!(matches!(r.probe_eof(), Err(Error::NotAtEnd)));
        r.read_bool().unwrap();
        r.probe_eof().unwrap();
        assert!(BytesReader::new(&[]).is_at_end());
    }

    #[test]
    fn utf8_slice_takes_lead_byte_length() {
        let data = "aé€".as_bytes();
        let mut r = BytesReader::new(data);
        assert_eq!(r.read_utf8_slice().unwrap(), b"a");
        assert_eq!(r.read_utf8_slice().unwrap(), "é".as_bytes());
        assert_eq!(r.read_utf8_slice().unwrap(), "€".as_bytes());
        assert!(r.is_at_end());
    }

    #[test]
    fn io_read_copies_remaining() {
        let mut r = BytesReader::new(b"hello");
        let mut out = [0u8; 3];
        assert_eq!(r.read(&mut out).unwrap(), 3);
        assert_eq!(&out, b"hel");
        let mut rest = Vec::new();
        r.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"lo");
    }
}
