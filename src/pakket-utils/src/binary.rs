//! Little-endian word access over raw byte storage.
//!
//! All bit-level codecs in Pakket operate on 32-bit words which are
//! loaded from and stored to byte buffers at arbitrary byte offsets.

use byteorder::{ByteOrder, LittleEndian};

use crate::hints::cold_path;

/// The size of a codec word, in bytes.
pub const WORD_SIZE: usize = 4;

/// The size of a codec word, in bits.
pub const WORD_BITS: u32 = u32::BITS;

/// Loads a little-endian word starting at byte `offset` of `data`.
///
/// Bytes which lie past the end of `data` read as zero, so this never
/// fails for offsets close to or beyond the end of the slice.
#[inline]
pub fn load_word(data: &[u8], offset: usize) -> u32 {
    match data.get(offset..offset + WORD_SIZE) {
        Some(chunk) => LittleEndian::read_u32(chunk),

        None => {
            cold_path();

            let mut word = [0; WORD_SIZE];
            if let Some(tail) = data.get(offset..) {
                word[..tail.len()].copy_from_slice(tail);
            }

            LittleEndian::read_u32(&word)
        }
    }
}

/// Stores `value` as a little-endian word at byte `offset` of `data`.
///
/// # Panics
///
/// Panics when `data` does not hold [`WORD_SIZE`] bytes at `offset`.
#[inline]
pub fn store_word(data: &mut [u8], offset: usize, value: u32) {
    LittleEndian::write_u32(&mut data[offset..offset + WORD_SIZE], value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_full_word() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xFF];
        assert_eq!(load_word(&data, 0), 0x12345678);
        assert_eq!(load_word(&data, 1), 0xFF123456);
    }

    #[test]
    fn load_zero_fills_tail() {
        let data = [0xAA, 0xBB, 0xCC];
        assert_eq!(load_word(&data, 0), 0x00CCBBAA);
        assert_eq!(load_word(&data, 2), 0x000000CC);
        assert_eq!(load_word(&data, 3), 0);
        assert_eq!(load_word(&data, 64), 0);
    }

    #[test]
    fn store_word_in_place() {
        let mut data = [0; 6];
        store_word(&mut data, 1, 0xDEADBEEF);
        assert_eq!(data, [0, 0xEF, 0xBE, 0xAD, 0xDE, 0]);
    }
}
