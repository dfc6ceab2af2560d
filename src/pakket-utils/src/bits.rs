//! Miscellaneous utilities for working with bits.

/// Builds a mask with the low `nbits` bits set.
///
/// Unlike `(1 << nbits) - 1`, this is well-defined for the full
/// width of the type.
#[inline]
pub const fn low_mask(nbits: u32) -> u64 {
    if nbits == 0 {
        0
    } else {
        (2u64 << (nbits - 1)).wrapping_sub(1)
    }
}

/// The 32-bit counterpart of [`low_mask`].
#[inline]
pub const fn low_mask32(nbits: u32) -> u32 {
    if nbits == 0 {
        0
    } else {
        (2u32 << (nbits - 1)).wrapping_sub(1)
    }
}

/// Sign-extends an `nbits` wide value to [`i64`].
///
/// `nbits` must be in `1..=64`.
#[inline]
pub fn sign_extend(value: u64, nbits: u32) -> i64 {
    let shift = u64::BITS - nbits;
    (value << shift) as i64 >> shift
}

/// Re-normalizes a signed value for storage in `nbits` bits.
///
/// All bits above `nbits` are cleared and then refilled with ones if
/// bit `nbits - 1` is set. The low `nbits` bits of the result are the
/// two's complement pattern a width-aware reader will sign-extend back
/// to `value`, provided `value` fits in `nbits`.
#[inline]
pub fn normalize_signed(value: i64, nbits: u32) -> u64 {
    let mask = low_mask(nbits);
    let bits = value as u64 & mask;

    if nbits != 0 && (bits >> (nbits - 1)) & 1 == 1 {
        bits | !mask
    } else {
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(1), 1);
        assert_eq!(low_mask(17), 0x1FFFF);
        assert_eq!(low_mask(64), u64::MAX);

        assert_eq!(low_mask32(3), 0b111);
        assert_eq!(low_mask32(32), u32::MAX);
    }

    #[test]
    fn sign_extension() {
        assert_eq!(sign_extend(0b111, 3), -1);
        assert_eq!(sign_extend(0b011, 3), 3);
        assert_eq!(sign_extend(0x80, 8), -128);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_signed(-1, 4), u64::MAX);
        assert_eq!(normalize_signed(5, 4), 5);
        assert_eq!(normalize_signed(-8, 4) & 0xF, 0b1000);

        // Bits above the field are dropped before the sign is re-applied.
        assert_eq!(normalize_signed(0x17, 4), 7);
        assert_eq!(normalize_signed(i64::MIN, 64), i64::MIN as u64);
    }

    #[test]
    fn normalized_values_sign_extend_back() {
        for nbits in 2..=16 {
            let min = -(1i64 << (nbits - 1));
            let max = (1i64 << (nbits - 1)) - 1;

            for value in [min, -1, 0, 1, max] {
                let stored = normalize_signed(value, nbits) & low_mask(nbits);
                assert_eq!(sign_extend(stored, nbits), value);
            }
        }
    }
}
