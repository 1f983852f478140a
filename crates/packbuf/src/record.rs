//! Single-byte bit-packed records.

/// A 3-bit value with four independent flags.
///
/// Layout: bits 0..=2 hold `value`, bit 7 holds `flags[0]`, bit 6
/// `flags[1]`, bit 5 `flags[2]`, bit 4 `flags[3]`. Bit 3 is always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Special {
    /// Small integer, `0..=7`; higher bits are dropped on encode.
    pub value: u8,
    /// Flags stored from bit 7 downwards.
    pub flags: [bool; 4],
}

impl Special {
    const FLAG_BITS: [u8; 4] = [0x80, 0x40, 0x20, 0x10];

    /// Packs the record into its wire byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        Self::FLAG_BITS
            .iter()
            .zip(self.flags)
            .filter(|(_, set)| *set)
            .fold(self.value & 0x07, |acc, (bit, _)| acc | bit)
    }

    /// Unpacks a wire byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        Self {
            value: byte & 0x07,
            flags: Self::FLAG_BITS.map(|bit| byte & bit != 0),
        }
    }
}

/// Three small integers and one flag.
///
/// Layout: bits 0..=2 hold `value1`, bits 3..=4 `value2`, bits 5..=6
/// `value3`, bit 7 `flag`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Special2 {
    /// `0..=7`.
    pub value1: u8,
    /// `0..=3`.
    pub value2: u8,
    /// `0..=3`.
    pub value3: u8,
    /// High bit.
    pub flag: bool,
}

impl Special2 {
    /// Packs the record into its wire byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        let mut byte =
            (self.value1 & 0x07) | ((self.value2 & 0x03) << 3) | ((self.value3 & 0x03) << 5);
        if self.flag {
            byte |= 0x80;
        }
        byte
    }

    /// Unpacks a wire byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        Self {
            value1: byte & 0x07,
            value2: (byte >> 3) & 0x03,
            value3: (byte >> 5) & 0x03,
            flag: byte & 0x80 != 0,
        }
    }
}
