use std::string::FromUtf8Error;

use thiserror::Error;

/// Errors produced by [`BitReader`][crate::BitReader] and
/// [`BitWriter`][crate::BitWriter] operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// The requested bit range exceeds the capacity of the buffer.
    #[error("attempted to access out of bounds by {overflow} bits")]
    OutOfBounds {
        /// The number of bits past the end of the buffer the access
        /// would have reached.
        overflow: usize,
    },

    /// A primitive access was requested with a width of zero bits or
    /// more than [`MAX_WIDTH`][crate::MAX_WIDTH] bits.
    #[error("cannot handle {0} bits in a single access")]
    UnsupportedWidth(u32),

    /// A string to be written contains a null byte, which a reader
    /// would take for the terminator.
    #[error("string contains a null byte at offset {position}")]
    InteriorNul {
        /// The byte offset of the first null byte in the string.
        position: usize,
    },

    /// More bits were requested from a byte slice than it holds.
    #[error("requested {requested} bits from a source of {available} bits")]
    ShortSource {
        /// The number of bits asked for.
        requested: usize,
        /// The number of bits the source slice holds.
        available: usize,
    },

    /// String data read from the buffer is not valid UTF-8.
    #[error("invalid UTF-8 in string data: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),
}

/// Result type for bit buffer operations.
pub type Result<T> = std::result::Result<T, Error>;
