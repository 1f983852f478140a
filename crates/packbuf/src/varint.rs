//! Width-prefixed unsigned integers.
//!
//! A varint is stored as one width byte (0..=8) followed by that many
//! little-endian value bytes. Zero has width 0 and no value bytes. The pair
//! form packs both widths into one byte, first value in the high nibble.

/// Largest width a single varint may declare.
pub(crate) const MAX_WIDTH: u8 = 8;

/// Smallest number of little-endian bytes that hold `v`; `0` for zero.
///
/// ```rust
/// use packbuf::varint_width;
///
/// assert_eq!(varint_width(0), 0);
/// assert_eq!(varint_width(255), 1);
/// assert_eq!(varint_width(256), 2);
/// assert_eq!(varint_width(u64::MAX), 8);
/// ```
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn varint_width(v: u64) -> u8 {
    // Significant bits rounded up to whole bytes.
    (64 - v.leading_zeros()).div_ceil(8) as u8
}

/// Encodes `v` as `[width, value bytes..]` into a stack buffer and returns the
/// used prefix length.
#[inline]
pub(crate) fn encode_varint(v: u64, out: &mut [u8; 9]) -> usize {
    let width = varint_width(v);
    out[0] = width;
    let width = usize::from(width);
    out[1..=width].copy_from_slice(&v.to_le_bytes()[..width]);
    width + 1
}

/// Zero-extends up to eight little-endian bytes.
#[inline]
pub(crate) fn widen_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    let mut raw = [0u8; 8];
    raw[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

/// The low `N` bytes of `v`, little-endian.
#[inline]
pub(crate) fn narrow_le<const N: usize>(v: u64) -> [u8; N] {
    debug_assert!(N <= 8);
    let mut out = [0u8; N];
    out.copy_from_slice(&v.to_le_bytes()[..N]);
    out
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(254, 1)]
    #[case(255, 1)]
    #[case(256, 2)]
    #[case(u64::from(u16::MAX), 2)]
    #[case(1 << 16, 3)]
    #[case(u64::from(u32::MAX), 4)]
    #[case(1 << 32, 5)]
    #[case((1 << 40) - 1, 5)]
    #[case((1 << 48) - 1, 6)]
    #[case(1 << 48, 7)]
    #[case((1 << 56) - 1, 7)]
    #[case(1 << 56, 8)]
    #[case(u64::MAX, 8)]
    fn width_boundaries(#[case] value: u64, #[case] width: u8) {
        assert_eq!(varint_width(value), width);
    }

    #[quickcheck]
    fn width_is_monotonic(a: u64, b: u64) -> bool {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        varint_width(lo) <= varint_width(hi)
    }

    #[quickcheck]
    fn width_holds_value(v: u64) -> bool {
        let w = u32::from(varint_width(v));
        w <= 8 && (w == 8 || v >> (w * 8) == 0)
    }

    #[test]
    fn encode_zero_is_single_byte() {
        let mut out = [0xAA; 9];
        assert_eq!(encode_varint(0, &mut out), 1);
        assert_eq!(out[0], 0);
    }

    #[test]
    fn encode_full_width_keeps_every_byte() {
        let mut out = [0; 9];
        let v = 0x0102_0304_0506_0708;
        assert_eq!(encode_varint(v, &mut out), 9);
        assert_eq!(out, [8, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(widen_le(&out[1..]), v);
    }

    #[test]
    fn narrow_drops_high_bytes() {
        assert_eq!(narrow_le::<3>(0xAABB_CCDD), [0xDD, 0xCC, 0xBB]);
        assert_eq!(widen_le(&narrow_le::<6>(u64::MAX)), (1 << 48) - 1);
    }
}
