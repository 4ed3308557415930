//! # Position Arithmetic — Pointer-Free Forest Indexing
//!
//! Pure functions over zero-based `u64` indices into the accumulator's flat
//! array, treating the array as an implicit binary-forest packing (standard
//! MMR indexing, as in Grin/Mimblewimble). Structural relationships (height,
//! parent, sibling, peak) are computed from the index alone; nothing is
//! cached and nothing is stored.
//!
//! All arithmetic is unsigned 64-bit and bounds-checked by the callers;
//! heights never exceed 63 for any reachable forest size, so the shifts here
//! cannot overflow.

/// True if `n`'s binary representation is all 1-bits (1, 3, 7, 15, ...).
///
/// In 1-indexed form these are exactly the roots of leftmost complete trees.
fn all_ones(n: u64) -> bool {
    n > 0 && (n & n.wrapping_add(1)) == 0
}

/// Height of the node at position `pos` (leaves have height 0).
///
/// Converts to 1-indexed form, then repeatedly jumps left by stripping the
/// most significant bit until the index is all-ones; the height is then one
/// less than the bit length. O(log n).
pub fn height(pos: u64) -> u32 {
    let mut n = pos + 1;
    while !all_ones(n) {
        let bit_length = 64 - n.leading_zeros();
        n = n - (1u64 << (bit_length - 1)) + 1;
    }
    n.count_ones() - 1
}

/// Offset from a left-child node at height `h` to its parent: `2^(h+1)`.
pub fn parent_offset(h: u32) -> u64 {
    2u64 << h
}

/// Offset from a node at height `h` to its same-height sibling: `2^(h+1) - 1`.
pub fn sibling_offset(h: u32) -> u64 {
    (2u64 << h) - 1
}

/// The tallest, left-most peak fitting under a forest of `size` nodes.
///
/// Doubles a candidate peak position until it would exceed `size`, then backs
/// off one step. Returns `(height, position)`. Callers must ensure `size > 0`.
pub fn left_peak_height_and_pos(size: u64) -> (u32, u64) {
    // A complete tree of height h rooted at the far left occupies positions
    // 0..=(2^(h+1) - 2).
    let mut h: u32 = 0;
    while matches!(peak_pos_at_height(h + 1), Some(p) if p < size) {
        h += 1;
    }
    // h only grew while the position existed, so this cannot be None.
    (h, peak_pos_at_height(h).unwrap_or(0))
}

/// Position of the leftmost peak of height `h`: `2^(h+1) - 2`.
///
/// `None` once the position no longer fits in a `u64` (h = 64 and up).
fn peak_pos_at_height(h: u32) -> Option<u64> {
    let tree = 1u64.checked_shl(h)?;
    (tree - 1).checked_mul(2)
}

/// From a known peak, find the next peak to its right, or `None`.
///
/// Jumps to the same-height sibling position; while that overflows the
/// forest, walks down-left one height at a time until a valid position is
/// found or the heights are exhausted.
pub fn right_peak(mut height: u32, mut pos: u64, size: u64) -> Option<(u32, u64)> {
    pos += sibling_offset(height);
    while pos >= size {
        if height == 0 {
            return None;
        }
        // Step to the left child of the overflowing candidate.
        pos -= 1u64 << height;
        height -= 1;
    }
    Some((height, pos))
}

/// Enumerate all peaks of a forest of `size` nodes, left-to-right,
/// as `(height, position)` pairs. Empty for `size == 0`.
///
/// Recomputed on demand; never cached.
pub fn get_peaks(size: u64) -> Vec<(u32, u64)> {
    if size == 0 {
        return Vec::new();
    }
    let mut peaks = Vec::new();
    let (mut h, mut pos) = left_peak_height_and_pos(size);
    peaks.push((h, pos));
    while let Some((nh, npos)) = right_peak(h, pos, size) {
        peaks.push((nh, npos));
        h = nh;
        pos = npos;
    }
    peaks
}

/// Flat position of the `i`-th leaf (0-based): `2i - popcount(i)`.
///
/// Equivalently, the forest size just before that leaf was pushed.
pub fn leaf_index_to_pos(leaf_index: u64) -> u64 {
    2 * leaf_index - u64::from(leaf_index.count_ones())
}

/// Total node count of a forest holding `leaves` leaves: `2n - popcount(n)`.
pub fn size_for_leaves(leaves: u64) -> u64 {
    if leaves == 0 {
        return 0;
    }
    2 * leaves - u64::from(leaves.count_ones())
}
