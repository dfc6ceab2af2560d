use byteorder::{ByteOrder, LittleEndian};
use pakket_utils::{
    binary::{load_word, store_word, WORD_BITS, WORD_SIZE},
    bits::{low_mask32, normalize_signed},
    hints::cold_path,
    text::truncate_str,
};

use crate::{byte_bits, check_width, Error, Result};

fn check_no_nul(bytes: &[u8]) -> Result<()> {
    match bytes.iter().position(|&b| b == 0) {
        Some(position) => Err(Error::InteriorNul { position }),
        None => Ok(()),
    }
}

// Replaces the bits of `word` selected by `mask` with those of `value`,
// leaving everything else untouched.
#[inline(always)]
fn merge(word: u32, value: u32, mask: u32) -> u32 {
    word ^ (mask & (value ^ word))
}

/// A cursor which enables bit-based serialization of data into a
/// buffer of fixed capacity.
///
/// Individual bit writing starts at the LSB of the byte, working
/// towards the MSB.
///
/// A write which does not fit into the remaining capacity fails and
/// exhausts the writer: the cursor is moved to the end of the buffer
/// and every subsequent write fails as well. Seeking or resetting an
/// exhausted writer does not make it writable again.
#[derive(Clone, Debug)]
pub struct BitWriter {
    // The output storage. This is one word larger than the requested
    // capacity so that spills into a following word stay in bounds.
    inner: Vec<u8>,

    // The logical capacity of the writer in bits.
    total_bits: usize,

    // The position where the next write will start.
    current_bit: usize,

    // High-water mark of bits committed by sequential writes.
    bits_written: usize,

    // Set by the first write that overflowed the capacity.
    exhausted: bool,
}

macro_rules! word_write_impl {
    ($($fn:ident($ty:ty) => $conv:expr),* $(,)*) => {
        $(
            #[doc = concat!("Writes a [`", stringify!($ty), "`] value.")]
            #[inline]
            pub fn $fn(&mut self, v: $ty) -> Result<()> {
                self.write_uint($conv(v), <$ty>::BITS)
            }
        )*
    };
}

macro_rules! bytes_write_impl {
    ($($fn:ident($ty:ty)),* $(,)*) => {
        $(
            #[doc = concat!("Writes a little-endian [`", stringify!($ty), "`] value.")]
            #[inline]
            pub fn $fn(&mut self, v: $ty) -> Result<()> {
                self.write_bytes(&v.to_le_bytes())
            }
        )*
    };
}

impl BitWriter {
    /// Creates a zeroed [`BitWriter`] with room for `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: vec![0; capacity + WORD_SIZE],
            total_bits: capacity << 3,
            current_bit: 0,
            bits_written: 0,
            exhausted: false,
        }
    }

    /// Gets the logical capacity of the writer, in bits.
    #[inline]
    pub fn capacity_bits(&self) -> usize {
        self.total_bits
    }

    /// Gets the bit position where the next write will start.
    #[inline]
    pub fn position(&self) -> usize {
        self.current_bit
    }

    /// Gets the number of bits left until the writer is full.
    #[inline]
    pub fn remaining_bits(&self) -> usize {
        self.total_bits - self.current_bit
    }

    /// Whether a previous write overflowed the capacity.
    ///
    /// Every write on an exhausted writer fails.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Gets the number of bits committed by sequential writes.
    ///
    /// Rewriting earlier data after a [`BitWriter::seek`] does not
    /// extend this.
    #[inline]
    pub fn bits_written(&self) -> usize {
        self.bits_written
    }

    /// Gets the number of bytes needed to hold all committed bits.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.bits_written.div_ceil(8)
    }

    /// Gets a view of the committed bytes.
    ///
    /// A partially written trailing byte is included, with its unused
    /// high bits zeroed unless they were touched by seeking writes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner[..self.bytes_written()]
    }

    /// Consumes the [`BitWriter`] and returns the committed bytes.
    #[inline]
    pub fn into_inner(mut self) -> Vec<u8> {
        self.inner.truncate(self.bytes_written());
        self.inner
    }

    /// Moves the cursor to an absolute bit position.
    ///
    /// Positions past the capacity are clamped to it.
    #[inline]
    pub fn seek(&mut self, bit: usize) {
        self.current_bit = bit.min(self.total_bits);
    }

    /// Moves the cursor back to the start of the buffer.
    #[inline]
    pub fn reset(&mut self) {
        self.current_bit = 0;
    }

    fn ensure_capacity(&mut self, nbits: usize) -> Result<()> {
        if self.exhausted {
            cold_path();
            log::trace!("Rejecting {nbits} bit write on an exhausted writer");
            return Err(Error::OutOfBounds { overflow: nbits });
        }

        let end = self.current_bit.saturating_add(nbits);
        if end <= self.total_bits {
            Ok(())
        } else {
            cold_path();
            Err(self.exhaust(end - self.total_bits))
        }
    }

    // Pins the cursor to the end of the buffer after a failed write.
    //
    // A failed sequential write is treated as having filled up the
    // buffer, so the high-water mark follows the cursor.
    fn exhaust(&mut self, overflow: usize) -> Error {
        log::debug!(
            "Writer exhausted at bit {} of {}, overflowing by {overflow} bits",
            self.current_bit,
            self.total_bits,
        );

        if self.current_bit == self.bits_written {
            self.bits_written = self.total_bits;
        }
        self.current_bit = self.total_bits;
        self.exhausted = true;

        Error::OutOfBounds { overflow }
    }

    // Injects the low `nbits` bits of `value`, where `nbits` is in `1..=32`.
    //
    // The caller is responsible for checking capacity first.
    fn inject_word(&mut self, value: u32, nbits: u32) {
        debug_assert!((1..=WORD_BITS).contains(&nbits));

        let offset = (self.current_bit / WORD_BITS as usize) * WORD_SIZE;
        let bit_offset = (self.current_bit % WORD_BITS as usize) as u32;

        let mask = low_mask32(nbits);
        let rotated = (value & mask).rotate_left(bit_offset);

        // `mask1` selects the field bits in the first word, `mask2` the
        // bits which spill over into the next one.
        let mask1 = mask << bit_offset;
        let mask2 = mask.checked_shr(WORD_BITS - bit_offset).unwrap_or(0);

        let word = load_word(&self.inner, offset);
        store_word(&mut self.inner, offset, merge(word, rotated, mask1));

        // With no spill, the second merge would be a no-op. Skipping it also
        // keeps the access in bounds for words at the very end of storage.
        if mask2 != 0 {
            let word = load_word(&self.inner, offset + WORD_SIZE);
            store_word(&mut self.inner, offset + WORD_SIZE, merge(word, rotated, mask2));
        }

        if self.current_bit == self.bits_written {
            self.bits_written += nbits as usize;
        }
        self.current_bit += nbits as usize;
    }

    // Injects the first `nbits` bits of `data`, a trailing partial byte
    // taken from its low bits.
    //
    // The caller is responsible for checking capacity first.
    fn put_bits(&mut self, data: &[u8], nbits: usize) {
        let mut left = nbits;
        let mut idx = 0;

        while left >= WORD_BITS as usize {
            let word = LittleEndian::read_u32(&data[idx..idx + WORD_SIZE]);
            self.inject_word(word, WORD_BITS);

            idx += WORD_SIZE;
            left -= WORD_BITS as usize;
        }

        while left >= 8 {
            self.inject_word(data[idx] as u32, u8::BITS);

            idx += 1;
            left -= 8;
        }

        if left > 0 {
            self.inject_word(data[idx] as u32, left as u32);
        }
    }

    /// Writes the low `nbits` bits of `value`.
    ///
    /// `nbits` must be in `1..=64`. Values wider than a word are split
    /// into two word-sized writes.
    pub fn write_uint(&mut self, value: u64, nbits: u32) -> Result<()> {
        check_width(nbits)?;
        self.ensure_capacity(nbits as usize)?;

        if nbits <= WORD_BITS {
            self.inject_word(value as u32, nbits);
        } else {
            self.inject_word(value as u32, WORD_BITS);
            self.inject_word((value >> WORD_BITS) as u32, nbits - WORD_BITS);
        }

        Ok(())
    }

    /// Writes a signed value as an `nbits` wide two's complement field.
    ///
    /// Reading the field back with [`BitReader::read_int`] yields
    /// `value` again, provided it fits into `nbits` bits.
    ///
    /// [`BitReader::read_int`]: crate::BitReader::read_int
    pub fn write_int(&mut self, value: i64, nbits: u32) -> Result<()> {
        check_width(nbits)?;
        self.write_uint(normalize_signed(value, nbits), nbits)
    }

    /// Writes a single bit.
    #[inline]
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_uint(v as u64, 1)
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_byte(&mut self, v: u8) -> Result<()> {
        self.write_u8(v)
    }

    word_write_impl! {
        write_u8(u8) => u64::from,
        write_i8(i8) => |v: i8| normalize_signed(v.into(), i8::BITS),
        write_u16(u16) => u64::from,
        write_i16(i16) => |v: i16| normalize_signed(v.into(), i16::BITS),
        write_u32(u32) => u64::from,
        write_i32(i32) => |v: i32| normalize_signed(v.into(), i32::BITS),
    }

    bytes_write_impl! {
        write_u64(u64),
        write_i64(i64),
        write_f32(f32),
        write_f64(f64),
    }

    /// Writes the first `nbits` bits of `data`.
    ///
    /// When `nbits` is not a multiple of 8, the remaining bits are
    /// taken from the low bits of the last byte.
    ///
    /// Fails with [`Error::ShortSource`] when `data` holds fewer than
    /// `nbits` bits. The writer is left untouched in that case.
    pub fn write_bits(&mut self, data: &[u8], nbits: usize) -> Result<()> {
        let available = byte_bits(data.len());
        if nbits > available {
            cold_path();
            return Err(Error::ShortSource {
                requested: nbits,
                available,
            });
        }

        self.ensure_capacity(nbits)?;
        self.put_bits(data, nbits);

        Ok(())
    }

    /// Writes whole bytes from `data`.
    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.write_bits(data, byte_bits(data.len()))
    }

    /// Writes a string followed by a null terminator.
    ///
    /// Strings with an embedded null byte are rejected with
    /// [`Error::InteriorNul`], since they could not be read back whole.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        let bytes = s.as_bytes();
        check_no_nul(bytes)?;
        self.ensure_capacity(byte_bits(bytes.len()).saturating_add(8))?;

        self.put_bits(bytes, bytes.len() << 3);
        self.inject_word(0, u8::BITS);

        Ok(())
    }

    /// Writes a string into a field of at most `max_len` bytes.
    ///
    /// Longer strings are truncated to the last character boundary at
    /// or before `max_len` bytes. The null terminator is only written
    /// when the written part is shorter than `max_len`, mirroring how
    /// [`BitReader::read_cstr`] consumes bounded strings.
    ///
    /// Null bytes within the written part are rejected like in
    /// [`BitWriter::write_string`].
    ///
    /// [`BitReader::read_cstr`]: crate::BitReader::read_cstr
    pub fn write_string_bounded(&mut self, s: &str, max_len: usize) -> Result<()> {
        let bytes = truncate_str(s, max_len).as_bytes();
        check_no_nul(bytes)?;

        let terminated = bytes.len() < max_len;
        self.ensure_capacity(byte_bits(bytes.len() + terminated as usize))?;

        self.put_bits(bytes, bytes.len() << 3);
        if terminated {
            self.inject_word(0, u8::BITS);
        }

        Ok(())
    }
}
