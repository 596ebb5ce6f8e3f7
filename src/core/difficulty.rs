use crate::utils::Hash;
use num_bigint::BigUint;
use std::cmp::Ordering;

// The target starts from a single bit at position 255 of a 256-bit integer.
const TARGET_TOP_BIT: usize = 255;

/// Convert a bit-shift difficulty parameter into a 256-bit target:
/// `(1 << 255) >> bit_shift`. Larger shifts give smaller targets.
///
/// This is not the same as setting byte 0 to `0x01` and shifting, which starts
/// from `2^248` and is 128 times stricter at every shift.
pub fn calculate_target(bit_shift: u8) -> BigUint {
    let top = BigUint::from(1u8) << TARGET_TOP_BIT;
    top >> usize::from(bit_shift)
}

/// Interpret `hash` as a big-endian unsigned integer and compare it with `target`.
pub fn compare(hash: &Hash, target: &BigUint) -> Ordering {
    BigUint::from_bytes_be(hash).cmp(target)
}

/// Accept rule shared by mining and validation: the hash must be strictly below
/// the target.
pub fn meets_target(hash: &Hash, target: &BigUint) -> bool {
    compare(hash, target) == Ordering::Less
}
