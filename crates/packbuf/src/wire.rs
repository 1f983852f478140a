//! The encoding contract shared by every writer and reader.
//!
//! Implementors provide raw byte movement; the format lives entirely in the
//! provided methods, so a value written through any [`WireWrite`] decodes
//! identically through any [`WireRead`].
//!
//! | Form                     | Layout                                             |
//! |--------------------------|----------------------------------------------------|
//! | `u16`/`u24`/`u32`/`u48`/`u64` | exact-width little-endian                     |
//! | varint                   | width byte (0..=8) + width value bytes             |
//! | varint pair              | `width1 << 4 \| width2` + both value runs          |
//! | small `u16`              | one byte below 255, else `255` + 2 raw bytes       |
//! | small `i16`              | `v + 127` for `-127..=127`, else `255` + 2 raw bytes |
//! | bool                     | one byte, non-zero is `true`                       |
//! | two bools                | bit 0 first, bit 1 second                          |
//! | nibbles                  | low nibble first, high nibble second               |
//! | string 8/16/32           | 1/2/4-byte length + bytes, truncated to fit        |
//! | floats                   | IEEE-754 bit pattern as `u32`/`u64`                |

use crate::{
    Error,
    record::{Special, Special2},
    rune::{decode_narrow, encode_rune, narrow_sequence_len},
    varint::{MAX_WIDTH, encode_varint, narrow_le, varint_width, widen_le},
};

/// Sentinel byte announcing a raw 16-bit value in the small forms.
const WIDE_16: u8 = 0xFF;

const MAX_LEN_16: usize = u16::MAX as usize;

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn clamp_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

fn max_len_32() -> usize {
    usize::try_from(u32::MAX).unwrap_or(usize::MAX)
}

/// Encoder half of the wire format.
pub trait WireWrite {
    /// Failure reported by the backing store.
    type Error;

    /// Appends arbitrary bytes.
    fn write_slice(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Appends a small group of bytes as one unit.
    ///
    /// This is the hot path for every fixed-width value; implementations
    /// should avoid going through a slice where they can.
    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), Self::Error>;

    /// Appends one byte.
    fn write_u8(&mut self, v: u8) -> Result<(), Self::Error> {
        self.write_array([v])
    }

    /// `0` or `1`.
    fn write_bool(&mut self, v: bool) -> Result<(), Self::Error> {
        self.write_u8(u8::from(v))
    }

    /// Two flags in bits 0 and 1 of one byte.
    fn write_two_bools(&mut self, first: bool, second: bool) -> Result<(), Self::Error> {
        self.write_u8(u8::from(first) | (u8::from(second) << 1))
    }

    /// Two 4-bit values in one byte; `low` takes the low nibble.
    fn write_nibbles(&mut self, low: u8, high: u8) -> Result<(), Self::Error> {
        self.write_u8((low & 0x0F) | (high << 4))
    }

    /// UTF-8 encodes a raw code point and returns the bytes written.
    ///
    /// Surrogates and out-of-range values are written as U+FFFD.
    fn write_rune(&mut self, code_point: u32) -> Result<usize, Self::Error> {
        let mut out = [0u8; 4];
        let len = encode_rune(code_point, &mut out);
        match len {
            1 => self.write_array([out[0]])?,
            2 => self.write_array([out[0], out[1]])?,
            3 => self.write_array([out[0], out[1], out[2]])?,
            _ => self.write_array(out)?,
        }
        Ok(len)
    }

    /// UTF-8 encodes `ch` and returns the bytes written.
    fn write_char(&mut self, ch: char) -> Result<usize, Self::Error> {
        self.write_rune(u32::from(ch))
    }

    /// Two bytes, little-endian.
    fn write_u16(&mut self, v: u16) -> Result<(), Self::Error> {
        self.write_array(v.to_le_bytes())
    }

    /// One byte when `v < 255`, otherwise `255` followed by the raw value.
    ///
    /// Pays off when most values are small.
    #[allow(clippy::cast_possible_truncation)]
    fn write_u16_small(&mut self, v: u16) -> Result<(), Self::Error> {
        if v < u16::from(WIDE_16) {
            return self.write_u8(v as u8);
        }
        let [lo, hi] = v.to_le_bytes();
        self.write_array([WIDE_16, lo, hi])
    }

    /// `v + 127` in one byte for `-127..=127`, otherwise `255` followed by
    /// the raw two's-complement value.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn write_i16_small(&mut self, v: i16) -> Result<(), Self::Error> {
        if (-127..=127).contains(&v) {
            return self.write_u8((v + 127) as u8);
        }
        let [lo, hi] = v.to_le_bytes();
        self.write_array([WIDE_16, lo, hi])
    }

    /// The low three bytes of `v`, little-endian.
    fn write_u24(&mut self, v: u32) -> Result<(), Self::Error> {
        self.write_array(narrow_le::<3>(u64::from(v)))
    }

    /// Four bytes, little-endian.
    fn write_u32(&mut self, v: u32) -> Result<(), Self::Error> {
        self.write_array(v.to_le_bytes())
    }

    /// The low six bytes of `v`, little-endian.
    fn write_u48(&mut self, v: u64) -> Result<(), Self::Error> {
        self.write_array(narrow_le::<6>(v))
    }

    /// Eight bytes, little-endian.
    fn write_u64(&mut self, v: u64) -> Result<(), Self::Error> {
        self.write_array(v.to_le_bytes())
    }

    /// Width byte plus the minimal little-endian value bytes.
    fn write_varint(&mut self, v: u64) -> Result<(), Self::Error> {
        let mut out = [0u8; 9];
        let len = encode_varint(v, &mut out);
        self.write_slice(&out[..len])
    }

    /// Two varints sharing one width byte, first width in the high nibble.
    fn write_varint_pair(&mut self, first: u64, second: u64) -> Result<(), Self::Error> {
        let (w1, w2) = (varint_width(first), varint_width(second));
        let (n1, n2) = (usize::from(w1), usize::from(w2));
        let mut out = [0u8; 17];
        out[0] = (w1 << 4) | w2;
        out[1..=n1].copy_from_slice(&first.to_le_bytes()[..n1]);
        out[1 + n1..=n1 + n2].copy_from_slice(&second.to_le_bytes()[..n2]);
        self.write_slice(&out[..1 + n1 + n2])
    }

    /// IEEE-754 bits as a `u32`.
    fn write_f32(&mut self, v: f32) -> Result<(), Self::Error> {
        self.write_u32(v.to_bits())
    }

    /// IEEE-754 bits as a `u64`.
    fn write_f64(&mut self, v: f64) -> Result<(), Self::Error> {
        self.write_u64(v.to_bits())
    }

    /// One-byte length prefix; bytes past 255 are dropped.
    #[allow(clippy::cast_possible_truncation)]
    fn write_bytes8(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let bytes = &bytes[..bytes.len().min(usize::from(u8::MAX))];
        self.write_u8(bytes.len() as u8)?;
        self.write_slice(bytes)
    }

    /// Two-byte length prefix; bytes past 65535 are dropped.
    #[allow(clippy::cast_possible_truncation)]
    fn write_bytes16(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let bytes = &bytes[..bytes.len().min(MAX_LEN_16)];
        self.write_u16(bytes.len() as u16)?;
        self.write_slice(bytes)
    }

    /// Four-byte length prefix; bytes past `u32::MAX` are dropped.
    #[allow(clippy::cast_possible_truncation)]
    fn write_bytes32(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let bytes = &bytes[..bytes.len().min(max_len_32())];
        self.write_u32(bytes.len() as u32)?;
        self.write_slice(bytes)
    }

    /// Like [`write_bytes8`](Self::write_bytes8), truncating on a char
    /// boundary so the stored text stays valid UTF-8.
    fn write_str8(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes8(clamp_str(s, usize::from(u8::MAX)).as_bytes())
    }

    /// Like [`write_bytes16`](Self::write_bytes16), truncating on a char
    /// boundary.
    fn write_str16(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes16(clamp_str(s, MAX_LEN_16).as_bytes())
    }

    /// Like [`write_bytes32`](Self::write_bytes32), truncating on a char
    /// boundary.
    fn write_str32(&mut self, s: &str) -> Result<(), Self::Error> {
        self.write_bytes32(clamp_str(s, max_len_32()).as_bytes())
    }

    /// One packed [`Special`] byte.
    fn write_special(&mut self, record: Special) -> Result<(), Self::Error> {
        self.write_u8(record.to_byte())
    }

    /// One packed [`Special2`] byte.
    fn write_special2(&mut self, record: Special2) -> Result<(), Self::Error> {
        self.write_u8(record.to_byte())
    }
}

/// Decoder half of the wire format.
pub trait WireRead {
    /// Returns the next byte without consuming it.
    fn peek_u8(&mut self) -> Result<u8, Error>;

    /// Consumes exactly `n` bytes and returns them.
    ///
    /// `take(0)` always succeeds with an empty slice.
    fn take(&mut self, n: usize) -> Result<&[u8], Error>;

    /// Consumes `N` bytes into an array.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Fills `dst` completely.
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        dst.copy_from_slice(self.take(dst.len())?);
        Ok(())
    }

    /// An owned copy of the next `n` bytes.
    fn read_vec(&mut self, n: usize) -> Result<Vec<u8>, Error> {
        Ok(self.take(n)?.to_vec())
    }

    /// One byte.
    fn read_u8(&mut self) -> Result<u8, Error> {
        let [b] = self.read_array()?;
        Ok(b)
    }

    /// Any non-zero byte is `true`.
    fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    /// Bits 0 and 1 of one byte.
    fn read_two_bools(&mut self) -> Result<(bool, bool), Error> {
        let b = self.read_u8()?;
        Ok((b & 0x01 != 0, b & 0x02 != 0))
    }

    /// `(low, high)` nibbles of one byte.
    fn read_nibbles(&mut self) -> Result<(u8, u8), Error> {
        let b = self.read_u8()?;
        Ok((b & 0x0F, b >> 4))
    }

    /// The raw bytes of one 1..=3 byte UTF-8 sequence.
    ///
    /// The length is chosen from the lead byte alone; the bytes are not
    /// validated.
    fn read_utf8(&mut self) -> Result<&[u8], Error> {
        let len = narrow_sequence_len(self.peek_u8()?);
        self.take(len)
    }

    /// Decodes one 1..=3 byte UTF-8 sequence, yielding U+FFFD when it is
    /// malformed. Four-byte sequences are not supported.
    fn read_rune(&mut self) -> Result<char, Error> {
        Ok(decode_narrow(self.read_utf8()?))
    }

    /// Two bytes, little-endian.
    fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Inverse of [`WireWrite::write_u16_small`].
    fn read_u16_small(&mut self) -> Result<u16, Error> {
        match self.read_u8()? {
            WIDE_16 => self.read_u16(),
            b => Ok(u16::from(b)),
        }
    }

    /// Inverse of [`WireWrite::write_i16_small`].
    fn read_i16_small(&mut self) -> Result<i16, Error> {
        match self.read_u8()? {
            WIDE_16 => Ok(i16::from_le_bytes(self.read_array()?)),
            b => Ok(i16::from(b) - 127),
        }
    }

    /// Three bytes, little-endian.
    #[allow(clippy::cast_possible_truncation)]
    fn read_u24(&mut self) -> Result<u32, Error> {
        Ok(widen_le(self.take(3)?) as u32)
    }

    /// Four bytes, little-endian.
    fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Six bytes, little-endian.
    fn read_u48(&mut self) -> Result<u64, Error> {
        Ok(widen_le(self.take(6)?))
    }

    /// Eight bytes, little-endian.
    fn read_u64(&mut self) -> Result<u64, Error> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Width byte plus value bytes.
    fn read_varint(&mut self) -> Result<u64, Error> {
        let width = self.read_u8()?;
        if width > MAX_WIDTH {
            return Err(Error::InvalidVarintWidth(width));
        }
        Ok(widen_le(self.take(usize::from(width))?))
    }

    /// Two varints sharing one width byte.
    fn read_varint_pair(&mut self) -> Result<(u64, u64), Error> {
        let widths = self.read_u8()?;
        let (w1, w2) = (widths >> 4, widths & 0x0F);
        if let Some(bad) = [w1, w2].into_iter().find(|w| *w > MAX_WIDTH) {
            return Err(Error::InvalidVarintWidth(bad));
        }
        let n1 = usize::from(w1);
        let both = self.take(n1 + usize::from(w2))?;
        Ok((widen_le(&both[..n1]), widen_le(&both[n1..])))
    }

    /// IEEE-754 bits from a `u32`.
    fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// IEEE-754 bits from a `u64`.
    fn read_f64(&mut self) -> Result<f64, Error> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Bytes behind a one-byte length.
    fn read_bytes8(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_u8()?;
        self.read_vec(usize::from(len))
    }

    /// Bytes behind a two-byte length.
    fn read_bytes16(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_u16()?;
        self.read_vec(usize::from(len))
    }

    /// Bytes behind a four-byte length.
    fn read_bytes32(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.read_u32()?;
        self.read_vec(len as usize)
    }

    /// Text behind a one-byte length.
    fn read_string8(&mut self) -> Result<String, Error> {
        let len = self.read_u8()?;
        Ok(core::str::from_utf8(self.take(usize::from(len))?)?.into())
    }

    /// Text behind a two-byte length.
    fn read_string16(&mut self) -> Result<String, Error> {
        let len = self.read_u16()?;
        Ok(core::str::from_utf8(self.take(usize::from(len))?)?.into())
    }

    /// Text behind a four-byte length.
    fn read_string32(&mut self) -> Result<String, Error> {
        let len = self.read_u32()?;
        Ok(core::str::from_utf8(self.take(len as usize)?)?.into())
    }

    /// One packed [`Special`] byte.
    fn read_special(&mut self) -> Result<Special, Error> {
        Ok(Special::from_byte(self.read_u8()?))
    }

    /// One packed [`Special2`] byte.
    fn read_special2(&mut self) -> Result<Special2, Error> {
        Ok(Special2::from_byte(self.read_u8()?))
    }
}
