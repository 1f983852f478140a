//! UTF-8 code point encoding and the narrow reader-side decoding.
//!
//! Encoding covers the full 1..=4 byte range. Decoding only recognises 1..=3
//! byte sequences: a lead byte with bit 5 clear is a 2-byte sequence,
//! otherwise 3 bytes are taken. Four-byte sequences therefore decode as
//! [`REPLACEMENT`] and leave their last continuation byte unread.

/// Substitute for code points that cannot be encoded or decoded.
pub const REPLACEMENT: char = char::REPLACEMENT_CHARACTER;

/// Encodes a raw code point into `out`, returning the byte count.
///
/// Surrogates and values above `U+10FFFF` are encoded as [`REPLACEMENT`].
///
/// ```rust
/// let mut out = [0u8; 4];
/// assert_eq!(packbuf::encode_rune(0x1F600, &mut out), 4);
/// assert_eq!(packbuf::encode_rune(0xD800, &mut out), 3);
/// assert_eq!(&out[..3], "\u{FFFD}".as_bytes());
/// ```
#[inline]
pub fn encode_rune(code_point: u32, out: &mut [u8; 4]) -> usize {
    char::from_u32(code_point)
        .unwrap_or(REPLACEMENT)
        .encode_utf8(out)
        .len()
}

/// Length of the sequence introduced by `first`, as the narrow decoder sees it.
#[inline]
#[must_use]
pub const fn narrow_sequence_len(first: u8) -> usize {
    if first < 0x80 {
        1
    } else if first & 0x20 == 0 {
        2
    } else {
        3
    }
}

/// Decodes a sequence obtained with [`narrow_sequence_len`].
#[inline]
pub(crate) fn decode_narrow(seq: &[u8]) -> char {
    match seq {
        [b] if *b < 0x80 => char::from(*b),
        _ => match bstr::decode_utf8(seq) {
            (Some(ch), _) => ch,
            (None, _) => REPLACEMENT,
        },
    }
}
