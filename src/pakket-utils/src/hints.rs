//! Hints for the compiler that affect code optimization.

/// Marks the calling code path as unlikely to be taken.
///
/// The bit codecs call this on bounds failures and slow-path word
/// loads, so that the common in-bounds case is laid out as the
/// fallthrough. Stands in for `std::hint::cold_path` until that
/// is stabilized.
#[cold]
#[inline(always)]
pub fn cold_path() {}
