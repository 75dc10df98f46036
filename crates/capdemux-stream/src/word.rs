//! Word layout of a capture.

use bytes::{Buf, BufMut};

/// One 32-bit unit of the capture stream.
pub type Word = u32;

/// Size of a [`Word`] in bytes.
pub const WORD_SIZE: usize = 4;

/// Idle marker. Always emitted in consecutive pairs by the device.
pub const FILLER: Word = 0xEEEE_EEEE;

/// Returns the 3-bit marker field (bits 24..=26) of a word.
///
/// A sync triple is three consecutive words whose fields read `0, 1, 0`.
pub fn sync_field(word: Word) -> u8 {
    ((word >> 24) & 0x07) as u8
}

/// Byte order used to turn four capture bytes into a [`Word`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordOrder {
    /// Host byte order, as written by the acquisition tool.
    #[default]
    Native,
    /// Little-endian.
    Little,
    /// Big-endian.
    Big,
}

impl WordOrder {
    /// Read one word from the front of `buf`, advancing it.
    ///
    /// Panics if fewer than [`WORD_SIZE`] bytes remain, like [`Buf::get_u32`].
    pub fn get_word(self, buf: &mut impl Buf) -> Word {
        match self {
            WordOrder::Native => buf.get_u32_ne(),
            WordOrder::Little => buf.get_u32_le(),
            WordOrder::Big => buf.get_u32(),
        }
    }

    /// Append a 32-bit sample in this order.
    pub fn put_u32(self, dst: &mut impl BufMut, value: u32) {
        match self {
            WordOrder::Native => dst.put_u32_ne(value),
            WordOrder::Little => dst.put_u32_le(value),
            WordOrder::Big => dst.put_u32(value),
        }
    }

    /// Append a 16-bit sample in this order.
    pub fn put_u16(self, dst: &mut impl BufMut, value: u16) {
        match self {
            WordOrder::Native => dst.put_u16_ne(value),
            WordOrder::Little => dst.put_u16_le(value),
            WordOrder::Big => dst.put_u16(value),
        }
    }

    /// Human-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            WordOrder::Native => "native",
            WordOrder::Little => "little",
            WordOrder::Big => "big",
        }
    }
}
