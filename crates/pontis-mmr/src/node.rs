//! # Node Record — The Unit Stored at Each Forest Position
//!
//! One `NodeRecord` per flat-array position, leaf or interior. Records are
//! created only by `push` (leaves) and `merge` (interiors, synthesized while
//! equal-height peaks collapse) and are immutable thereafter.
//!
//! ## Invariants
//!
//! - Interior `cumulative_difficulty` equals the sum of its children's.
//! - Interior `leaf_count` equals the sum of its children's.
//! - `difficulty_end - difficulty_start` equals the subtree's own cumulative
//!   difficulty; consecutive leaves' ranges are contiguous and
//!   non-overlapping, which is what makes difficulty-ordered binary search
//!   possible.

use serde::{Deserialize, Serialize};

use pontis_core::digest::{node_hash, Digest32};

/// A single node of the difficulty-weighted forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Content hash: the leaf-hash of the underlying header for leaves, the
    /// interior-node hash of the two children for merged nodes.
    pub hash: Digest32,
    /// Sum of difficulty over every leaf in the subtree rooted here.
    pub cumulative_difficulty: u128,
    /// Number of leaves in the subtree rooted here.
    pub leaf_count: u64,
    /// This record's own flat-array position. Redundant, kept so `merge`
    /// can cross-check adjacency.
    pub index: u64,
    /// Running total difficulty immediately before this subtree's first leaf.
    pub difficulty_start: u128,
    /// Running total difficulty immediately after this subtree's last leaf.
    pub difficulty_end: u128,
}

impl NodeRecord {
    /// Construct a leaf record at position `index`.
    ///
    /// `running_total` is the accumulator-wide difficulty total before this
    /// leaf, which becomes `difficulty_start`.
    pub fn leaf(hash: Digest32, difficulty: u128, index: u64, running_total: u128) -> Self {
        Self {
            hash,
            cumulative_difficulty: difficulty,
            leaf_count: 1,
            index,
            difficulty_start: running_total,
            difficulty_end: running_total + difficulty,
        }
    }

    /// Merge two sibling subtrees into their parent record.
    ///
    /// The parent's position is one past the right child's; its difficulty
    /// range spans both children. Pure, no side effects beyond the new record.
    pub fn merge(left: &NodeRecord, right: &NodeRecord) -> Self {
        debug_assert_eq!(
            left.leaf_count, right.leaf_count,
            "sibling subtrees must be complete trees of equal height"
        );
        // Siblings holding k leaves each sit sibling_offset(h) = 2k - 1
        // positions apart in the flat array.
        debug_assert_eq!(
            right.index,
            left.index + 2 * left.leaf_count - 1,
            "merged subtrees must be adjacent siblings"
        );
        debug_assert_eq!(
            left.difficulty_end, right.difficulty_start,
            "sibling subtrees must cover contiguous difficulty ranges"
        );
        Self {
            hash: node_hash(&left.hash, &right.hash),
            cumulative_difficulty: left.cumulative_difficulty + right.cumulative_difficulty,
            leaf_count: left.leaf_count + right.leaf_count,
            index: right.index + 1,
            difficulty_start: left.difficulty_start,
            difficulty_end: right.difficulty_end,
        }
    }

    /// True if this record is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.leaf_count == 1
    }

    /// The difficulty this subtree contributes, derived from its range.
    ///
    /// Always equals `cumulative_difficulty` for a well-formed record.
    pub fn range_difficulty(&self) -> u128 {
        self.difficulty_end - self.difficulty_start
    }
}
