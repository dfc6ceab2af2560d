//! Provides bit level serialization of compact binary formats.
//!
//! Network protocols of games frequently pack fields into fewer
//! bits than their natural type width. This crate provides a pair
//! of cursors over fixed-capacity byte buffers which are addressable
//! at single-bit resolution.
//!
//! Bits are numbered starting at the LSB of the first byte, working
//! towards the MSB. All multi-byte values are little endian.
//!
//! # Implementation
//!
//! Both cursors operate on 32-bit words loaded at byte or word
//! granularity. A field of at most 32 bits never straddles more
//! than two such words, so every primitive access is a load, a
//! shift or rotation and a masked merge of at most two words.
//! Wider fields are split into two word-sized accesses.
//!
//! [`BitWriter`] over-allocates its storage by one extra word to
//! keep the spill into a following word in bounds at all times.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod reader;
pub use reader::BitReader;

mod writer;
pub use writer::BitWriter;

/// The maximum number of bits a single primitive access can handle.
pub const MAX_WIDTH: u32 = u64::BITS;

#[inline]
fn check_width(nbits: u32) -> Result<()> {
    if (1..=MAX_WIDTH).contains(&nbits) {
        Ok(())
    } else {
        Err(Error::UnsupportedWidth(nbits))
    }
}

// Converts a byte count into bits. Counts too large to express in bits
// saturate, which no buffer can satisfy, so bounds checks still reject them.
#[inline]
fn byte_bits(count: usize) -> usize {
    count.saturating_mul(8)
}
