//! # Accumulator — Append-Only Difficulty-Weighted Forest
//!
//! The flat array of [`NodeRecord`]s plus the operations that maintain the
//! peak-bagging invariant: `push` with equal-height peak merging, the `pop`
//! rollback inverse, peak enumeration, root bagging, and difficulty-ordered
//! leaf search.
//!
//! ## Bagging Convention
//!
//! Peaks fold right-to-left: `bag = peaks[last]`, then for each earlier peak
//! moving leftward `bag = node_hash(peak, bag)`. The empty forest's root is
//! the all-zero sentinel digest. Prover and verifier share this convention.
//!
//! ## Writer Discipline
//!
//! Single writer: `push`/`pop` take `&mut self` and mutate the peak set
//! across several appends, so the caller serializes them. Read paths capture
//! the forest size once and bound all position arithmetic to that snapshot.

use pontis_core::digest::{leaf_hash, node_hash, Digest32};
use pontis_core::error::AccumulatorError;

use crate::node::NodeRecord;
use crate::position;
use crate::store::{MemStore, NodeStore};

/// Append-only difficulty-weighted Merkle Mountain Range.
///
/// An explicit handle: callers own its lifetime and locking discipline.
/// There is no process-wide accumulator state.
#[derive(Debug, Clone, Default)]
pub struct Accumulator<S: NodeStore = MemStore> {
    store: S,
}

impl Accumulator<MemStore> {
    /// Create an empty in-memory accumulator.
    pub fn new() -> Self {
        Self {
            store: MemStore::new(),
        }
    }
}

impl<S: NodeStore> Accumulator<S> {
    /// Wrap an existing node store (e.g. one recovered from disk).
    ///
    /// The store must hold a well-formed forest; this is not revalidated.
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    /// Consume the handle and return the underlying node store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Total number of nodes (leaves plus interiors) in the forest.
    pub fn size(&self) -> u64 {
        self.store.len()
    }

    /// Read the record at a flat position, bounds-checked.
    pub fn node(&self, pos: u64) -> Result<NodeRecord, AccumulatorError> {
        self.store.get(pos).ok_or_else(|| {
            AccumulatorError::OutOfRange(format!(
                "position {pos} beyond forest size {}",
                self.store.len()
            ))
        })
    }

    /// Read the `i`-th leaf record, bounds-checked.
    pub fn leaf(&self, leaf_index: u64) -> Result<NodeRecord, AccumulatorError> {
        if leaf_index >= self.leaf_number() {
            return Err(AccumulatorError::OutOfRange(format!(
                "leaf index {leaf_index} beyond leaf count {}",
                self.leaf_number()
            )));
        }
        self.node(position::leaf_index_to_pos(leaf_index))
    }

    /// Current peak records, left-to-right (tallest first).
    pub fn peaks(&self) -> Vec<NodeRecord> {
        let size = self.size();
        position::get_peaks(size)
            .into_iter()
            .filter_map(|(_, pos)| self.store.get(pos))
            .collect()
    }

    /// Number of leaves pushed so far (sum of peak leaf counts).
    pub fn leaf_number(&self) -> u64 {
        self.peaks().iter().map(|p| p.leaf_count).sum()
    }

    /// Total difficulty committed so far (sum of peak cumulative difficulty).
    pub fn root_difficulty(&self) -> u128 {
        self.peaks().iter().map(|p| p.cumulative_difficulty).sum()
    }

    /// Bag the current peaks into the root hash.
    ///
    /// Folds right-to-left: `bag = node_hash(peak, bag)`. Returns the
    /// all-zero sentinel for an empty forest.
    pub fn root(&self) -> Digest32 {
        bag_peak_hashes(&self.peaks().iter().map(|p| p.hash).collect::<Vec<_>>())
    }

    /// Append a header's leaf and merge equal-height peaks.
    ///
    /// `difficulty_start` is the previous running total, `difficulty_end`
    /// that total plus `difficulty`. While the two most recent peaks sit at
    /// the same height, their merged parent is appended too. Returns every
    /// newly appended record in order (leaf first). O(log n) worst case.
    pub fn push(
        &mut self,
        header_digest: Digest32,
        difficulty: u128,
    ) -> Result<Vec<NodeRecord>, AccumulatorError> {
        let running_total = self.running_total();
        let mut pos = self.store.len();

        let leaf = NodeRecord::leaf(leaf_hash(&header_digest), difficulty, pos, running_total);
        self.store.append(leaf.clone());
        let mut appended = vec![leaf];

        // The freshly appended node is a right child exactly when the next
        // position is its parent; keep collapsing until it is not.
        let mut h: u32 = 0;
        while position::height(pos + 1) == h + 1 {
            let left_pos = pos - position::sibling_offset(h);
            let left = self.node(left_pos)?;
            let right = self.node(pos)?;
            let parent = NodeRecord::merge(&left, &right);
            self.store.append(parent.clone());
            appended.push(parent);
            pos += 1;
            h += 1;
        }

        Ok(appended)
    }

    /// Roll back the most recent `push`.
    ///
    /// Removes the last leaf and every interior node that only existed
    /// because of it, restoring the previous peak configuration. Returns the
    /// removed leaf. Local bookkeeping only (chain reorgs); never part of a
    /// transmitted proof.
    pub fn pop(&mut self) -> Result<NodeRecord, AccumulatorError> {
        let size = self.size();
        if size == 0 {
            return Err(AccumulatorError::EmptyAccumulator);
        }
        // Interior nodes at the tail are ancestors of the last leaf; walk
        // back to the highest position at height 0.
        let mut pos = size - 1;
        while position::height(pos) > 0 {
            pos -= 1;
        }
        let leaf = self.node(pos)?;
        self.store.truncate(pos);
        Ok(leaf)
    }

    /// Find the leaf whose difficulty range contains `target`.
    ///
    /// Binary search over the contiguous `difficulty_start`/`difficulty_end`
    /// leaf ranges: the result is the first leaf with
    /// `difficulty_end >= target` (so a target of 0, and any target on a
    /// range boundary, resolves to the earlier leaf).
    pub fn find_leaf_by_difficulty(&self, target: u128) -> Result<u64, AccumulatorError> {
        let leaves = self.leaf_number();
        if leaves == 0 {
            return Err(AccumulatorError::EmptyAccumulator);
        }
        if target > self.root_difficulty() {
            return Err(AccumulatorError::OutOfRange(format!(
                "target difficulty {target} beyond total {}",
                self.root_difficulty()
            )));
        }

        let mut lo = 0u64;
        let mut hi = leaves - 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.leaf(mid)?.difficulty_end >= target {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(lo)
    }

    /// The accumulator-wide running difficulty total.
    fn running_total(&self) -> u128 {
        // The most recent record, leaf or interior, always ends at the
        // current total.
        match self.size() {
            0 => 0,
            n => self
                .store
                .get(n - 1)
                .map(|r| r.difficulty_end)
                .unwrap_or(0),
        }
    }
}

/// Bag an ordered list of peak hashes right-to-left into one root.
///
/// Shared by the live accumulator and the verifier's per-block recomputation.
pub fn bag_peak_hashes(peaks: &[Digest32]) -> Digest32 {
    let Some(last) = peaks.last() else {
        return Digest32::ZERO;
    };
    let mut bag = *last;
    for peak in peaks[..peaks.len() - 1].iter().rev() {
        bag = node_hash(peak, &bag);
    }
    bag
}
