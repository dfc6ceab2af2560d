use byteorder::{ByteOrder, LittleEndian};
use pakket_utils::{
    binary::{load_word, WORD_BITS, WORD_SIZE},
    bits::{low_mask32, sign_extend},
    hints::cold_path,
};

use crate::{byte_bits, check_width, Error, Result};

/// A cursor which enables bit-based deserialization of data.
///
/// The reader owns an immutable copy of its input and a single bit
/// cursor. Every read advances the cursor by the number of bits it
/// consumed.
///
/// Failed reads never move the cursor, so a caller may retry a
/// shorter read at the same position.
#[derive(Clone, Debug, Default)]
pub struct BitReader {
    // The input bytes, sized exactly to the data.
    data: Vec<u8>,

    // The capacity of `data` in bits.
    total_bits: usize,

    // The number of bits consumed so far.
    current_bit: usize,
}

macro_rules! word_read_impl {
    ($($(#[$doc:meta])* $fn:ident() -> $ty:ty),* $(,)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $fn(&mut self) -> Result<$ty> {
                self.read_uint(<$ty>::BITS).map(|v| v as $ty)
            }
        )*
    };
}

macro_rules! bytes_read_impl {
    ($($fn:ident() -> $ty:ty => $conv:path),* $(,)*) => {
        $(
            #[doc = concat!("Reads a little-endian [`", stringify!($ty), "`] value.")]
            #[inline]
            pub fn $fn(&mut self) -> Result<$ty> {
                let bytes: [u8; std::mem::size_of::<$ty>()] = self.read_array()?;
                Ok($conv(&bytes))
            }
        )*
    };
}

impl BitReader {
    /// Creates a new [`BitReader`] over the given bytes.
    ///
    /// The capacity of the reader is exactly `data.len() * 8` bits.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        Self {
            total_bits: data.len() << 3,
            data,
            current_bit: 0,
        }
    }

    /// Gets the total size of the input, in bits.
    #[inline]
    pub fn size(&self) -> usize {
        self.total_bits
    }

    /// Gets the full input as a byte slice.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the [`BitReader`] and returns the input bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Gets the number of bits consumed so far.
    #[inline]
    pub fn bits_read(&self) -> usize {
        self.current_bit
    }

    /// Gets the number of bits left for reading.
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.total_bits.saturating_sub(self.current_bit)
    }

    /// Moves the cursor to an absolute bit position.
    ///
    /// The position is not validated; seeking past the end of the
    /// input makes every subsequent read fail.
    #[inline]
    pub fn seek(&mut self, bit: usize) {
        self.current_bit = bit;
    }

    /// Moves the cursor back to the start of the input.
    #[inline]
    pub fn reset(&mut self) {
        self.current_bit = 0;
    }

    fn ensure_in_bounds(&self, nbits: usize) -> Result<()> {
        let end = self.current_bit.saturating_add(nbits);
        if end <= self.total_bits {
            Ok(())
        } else {
            cold_path();

            let overflow = end - self.total_bits;
            log::trace!("Rejected read of {nbits} bits at bit {}", self.current_bit);

            Err(Error::OutOfBounds { overflow })
        }
    }

    // Extracts the next `nbits` bits, where `nbits` is in `1..=32`.
    //
    // The caller is responsible for checking bounds first.
    fn extract_word(&mut self, nbits: u32) -> u32 {
        debug_assert!((1..=WORD_BITS).contains(&nbits));

        let byte_offset = self.current_bit >> 3;
        let bit_offset = (self.current_bit & 7) as u32;
        self.current_bit += nbits as usize;

        // Starting from the containing byte, a field spans at most 39 bits.
        // The second word only matters when the field spills into it.
        let low = load_word(&self.data, byte_offset) >> bit_offset;
        let high = if bit_offset + nbits > WORD_BITS {
            load_word(&self.data, byte_offset + WORD_SIZE) << (WORD_BITS - bit_offset)
        } else {
            0
        };

        (low | high) & low_mask32(nbits)
    }

    // Copies the next `nbits` bits into `out`, with a partial trailing
    // byte right-justified.
    //
    // The caller is responsible for checking bounds first.
    fn fill_bits(&mut self, out: &mut [u8], nbits: usize) {
        debug_assert!(out.len() >= nbits.div_ceil(8));

        let mut left = nbits;
        let mut idx = 0;

        while left >= WORD_BITS as usize {
            let word = self.extract_word(WORD_BITS);
            LittleEndian::write_u32(&mut out[idx..idx + WORD_SIZE], word);

            idx += WORD_SIZE;
            left -= WORD_BITS as usize;
        }

        while left >= 8 {
            out[idx] = self.extract_word(u8::BITS) as u8;

            idx += 1;
            left -= 8;
        }

        if left > 0 {
            out[idx] = self.extract_word(left as u32) as u8;
        }
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.ensure_in_bounds(N << 3)?;

        let mut bytes = [0; N];
        self.fill_bits(&mut bytes, N << 3);

        Ok(bytes)
    }

    /// Reads an unsigned `nbits` wide value.
    ///
    /// `nbits` must be in `1..=64`. Values wider than a word are
    /// assembled from two word-sized reads.
    pub fn read_uint(&mut self, nbits: u32) -> Result<u64> {
        check_width(nbits)?;
        self.ensure_in_bounds(nbits as usize)?;

        let value = if nbits <= WORD_BITS {
            self.extract_word(nbits) as u64
        } else {
            let low = self.extract_word(WORD_BITS) as u64;
            let high = self.extract_word(nbits - WORD_BITS) as u64;
            low | high << WORD_BITS
        };

        Ok(value)
    }

    /// Reads a signed `nbits` wide value, replicating bit `nbits - 1`
    /// into all higher bits of the result.
    pub fn read_int(&mut self, nbits: u32) -> Result<i64> {
        self.read_uint(nbits).map(|v| sign_extend(v, nbits))
    }

    /// Reads a single bit as a [`bool`].
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_uint(1).map(|v| v != 0)
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8> {
        self.read_u8()
    }

    word_read_impl! {
        /// Reads an unsigned 8-bit value.
        read_u8() -> u8,
        /// Reads a signed 8-bit value.
        read_i8() -> i8,
        /// Reads an unsigned 16-bit value.
        read_u16() -> u16,
        /// Reads a signed 16-bit value.
        read_i16() -> i16,
        /// Reads an unsigned 32-bit value.
        read_u32() -> u32,
        /// Reads a signed 32-bit value.
        read_i32() -> i32,
    }

    bytes_read_impl! {
        read_u64() -> u64 => LittleEndian::read_u64,
        read_i64() -> i64 => LittleEndian::read_i64,
        read_f32() -> f32 => LittleEndian::read_f32,
        read_f64() -> f64 => LittleEndian::read_f64,
    }

    /// Reads the next `nbits` bits into a byte vector.
    ///
    /// A trailing partial byte holds the remaining bits in its low
    /// bits. Fails without consuming anything when fewer than `nbits`
    /// bits are left.
    pub fn read_bits(&mut self, nbits: usize) -> Result<Vec<u8>> {
        self.ensure_in_bounds(nbits)?;

        let mut out = vec![0; nbits.div_ceil(8)];
        self.fill_bits(&mut out, nbits);

        Ok(out)
    }

    /// Reads `count` whole bytes.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.read_bits(byte_bits(count))
    }

    /// Reads a null-terminated byte string.
    ///
    /// At most `max_len` bytes are read; without a limit, reading stops
    /// at the end of the input. A zero byte ends the string early and
    /// is consumed, but not included in the result.
    ///
    /// This never fails for running off the end of the input.
    pub fn read_cstr(&mut self, max_len: Option<usize>) -> Vec<u8> {
        let available = self.remaining_bits() >> 3;
        let limit = max_len.map_or(available, |max| max.min(available));

        let mut out = Vec::new();
        for _ in 0..limit {
            match self.extract_word(u8::BITS) as u8 {
                0 => break,
                b => out.push(b),
            }
        }

        out
    }

    /// Reads a null-terminated UTF-8 string.
    ///
    /// See [`BitReader::read_cstr`] for the termination rules. When the
    /// data is not valid UTF-8, the bytes are still consumed.
    pub fn read_string(&mut self, max_len: Option<usize>) -> Result<String> {
        String::from_utf8(self.read_cstr(max_len)).map_err(Into::into)
    }
}
