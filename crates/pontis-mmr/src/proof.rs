//! # Proof Objects and Extraction
//!
//! A proof is a self-contained, immutable value: the claimed root, leaf
//! count, and total difficulty, plus one [`ProofBlock`] per revealed leaf.
//! It owns every hash it carries and holds no reference back into the live
//! accumulator; it is created on demand, transmitted, and consumed exactly
//! once by a verifier.
//!
//! Two extraction modes share one tagged type ([`ProofMode`]) and one
//! verification entry point, instead of parallel near-duplicate
//! function pairs:
//!
//! - **Probabilistic**: anchor a difficulty target, let the
//!   sampling-security calculator pick the revealed leaves.
//! - **Explicit range**: reveal every leaf in a bounded span.
//!
//! ## Wire Format
//!
//! Serde fixed-schema encoding; struct field order is the canonical field
//! order, and `serde_json` round-trips are the reference encoding.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pontis_core::digest::Digest32;
use pontis_core::error::{AccumulatorError, ProofError};

use crate::accumulator::Accumulator;
use crate::position;
use crate::sampling::{SampleSet, SamplingParams};
use crate::store::NodeStore;

/// Which side a sibling hash sits on during upward folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Sibling is the left input: `node_hash(sibling, acc)`.
    Left,
    /// Sibling is the right input: `node_hash(acc, sibling)`.
    Right,
}

/// One step of a sibling path, leaf-to-peak order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Which side the sibling folds in on.
    pub side: Side,
    /// The sibling hash.
    pub hash: Digest32,
}

/// One sampled leaf with its full inclusion path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProofBlock {
    /// The leaf's 0-based index in append order.
    pub leaf_index: u64,
    /// The leaf's own hash (already through the leaf-hash pipeline).
    pub leaf_hash: Digest32,
    /// Running total difficulty immediately before this leaf.
    pub difficulty_start: u128,
    /// Running total difficulty immediately after this leaf.
    pub difficulty_end: u128,
    /// Sibling hashes from the leaf up to its peak.
    pub path: Vec<PathStep>,
    /// The ordered hashes of every peak at extraction time; the slot at
    /// `peak_index` is this leaf's own peak and gets replaced by the
    /// recomputed value during verification before re-bagging.
    pub peaks: Vec<Digest32>,
    /// Which peak slot this leaf folds up into.
    pub peak_index: usize,
}

/// Two blocks are the same sample iff leaf index and leaf hash match.
impl PartialEq for ProofBlock {
    fn eq(&self, other: &Self) -> bool {
        self.leaf_index == other.leaf_index && self.leaf_hash == other.leaf_hash
    }
}

impl Eq for ProofBlock {}

/// How the revealed leaf set was chosen. Verification dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProofMode {
    /// Difficulty-biased statistical sampling.
    Probabilistic {
        /// Security parameter λ in bits.
        lambda: u32,
        /// Adversary weighting constant.
        c: f64,
        /// Shared sampling seed (derived from the tip hash).
        seed: [u8; 32],
        /// The cumulative-difficulty value the proof anchors.
        target_difficulty: u128,
    },
    /// Every leaf in an explicit inclusive span.
    ExplicitRange {
        /// First revealed leaf index.
        start_leaf: u64,
        /// Last revealed leaf index.
        end_leaf: u64,
    },
}

/// A compact, self-contained accumulator proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// The bagged root the proof claims.
    pub root: Digest32,
    /// The claimed total leaf count.
    pub leaf_count: u64,
    /// The claimed total difficulty.
    pub total_difficulty: u128,
    /// How the revealed leaf set was chosen.
    pub mode: ProofMode,
    /// The revealed leaves, sorted ascending by leaf index, deduplicated.
    pub blocks: Vec<ProofBlock>,
}

impl<S: NodeStore> Accumulator<S> {
    /// Extract a probabilistic proof that `target_difficulty` of cumulative
    /// work is committed in this accumulator.
    ///
    /// Binary-searches the anchor leaf whose difficulty range contains the
    /// target, asks the sampling-security calculator for the biased sample
    /// set, and always includes the anchor block unconditionally so the
    /// claim is pinned to a concrete leaf regardless of sampling.
    ///
    /// Valid targets span `(0, root_difficulty()]`: the upper bound is
    /// inclusive, a target equal to the accumulated total anchors at the
    /// last leaf and the calculator degrades to revealing every leaf.
    /// Targets above the total are out of range.
    pub fn create_new_proof(
        &self,
        target_difficulty: u128,
        params: &SamplingParams,
        seed: [u8; 32],
    ) -> Result<Proof, ProofError> {
        // Snapshot the forest once; all arithmetic below is bounded to it.
        let size = self.size();
        let leaf_count = self.leaf_number();
        if leaf_count == 0 {
            return Err(AccumulatorError::EmptyAccumulator.into());
        }

        let anchor = self.find_leaf_by_difficulty(target_difficulty)?;
        let total_difficulty = self.root_difficulty();

        let mut indices = match params.sample_indices(
            seed,
            leaf_count,
            target_difficulty,
            total_difficulty,
        )? {
            SampleSet::All => (0..leaf_count).collect::<BTreeSet<_>>(),
            SampleSet::Indices(indices) => indices,
        };
        indices.insert(anchor);

        debug!(
            target_difficulty,
            anchor,
            samples = indices.len(),
            leaf_count,
            "extracting probabilistic proof"
        );

        let blocks = indices
            .iter()
            .map(|&i| self.build_block(i, size))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Proof {
            root: self.root(),
            leaf_count,
            total_difficulty,
            mode: ProofMode::Probabilistic {
                lambda: params.lambda,
                c: params.c,
                seed,
                target_difficulty,
            },
            blocks,
        })
    }

    /// Extract a deterministic, non-probabilistic proof covering every leaf
    /// in `[start_leaf, end_leaf]`: a full proof of a bounded span.
    pub fn generate_proof(&self, start_leaf: u64, end_leaf: u64) -> Result<Proof, ProofError> {
        let size = self.size();
        let leaf_count = self.leaf_number();
        if leaf_count == 0 {
            return Err(AccumulatorError::EmptyAccumulator.into());
        }
        if start_leaf > end_leaf || end_leaf >= leaf_count {
            return Err(AccumulatorError::OutOfRange(format!(
                "leaf span [{start_leaf}, {end_leaf}] invalid for {leaf_count} leaves"
            ))
            .into());
        }

        debug!(start_leaf, end_leaf, leaf_count, "extracting explicit-range proof");

        let blocks = (start_leaf..=end_leaf)
            .map(|i| self.build_block(i, size))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Proof {
            root: self.root(),
            leaf_count,
            total_difficulty: self.root_difficulty(),
            mode: ProofMode::ExplicitRange {
                start_leaf,
                end_leaf,
            },
            blocks,
        })
    }

    /// Build one leaf's inclusion path: sibling hashes up to its peak, then
    /// the ordered peak list the bagging walk needs.
    fn build_block(&self, leaf_index: u64, size: u64) -> Result<ProofBlock, AccumulatorError> {
        let peaks = position::get_peaks(size);
        let leaf = self.leaf(leaf_index)?;

        let mut path = Vec::new();
        let mut pos = position::leaf_index_to_pos(leaf_index);
        let mut h: u32 = 0;
        while !peaks.iter().any(|&(_, p)| p == pos) {
            // A node is a right child exactly when its parent immediately
            // follows it in the array.
            let (sibling, parent, side) = if position::height(pos + 1) == h + 1 {
                (pos - position::sibling_offset(h), pos + 1, Side::Left)
            } else {
                let sibling = pos + position::sibling_offset(h);
                (sibling, sibling + 1, Side::Right)
            };
            path.push(PathStep {
                side,
                hash: self.node(sibling)?.hash,
            });
            pos = parent;
            h += 1;
        }

        let peak_index = peaks
            .iter()
            .position(|&(_, p)| p == pos)
            .ok_or_else(|| AccumulatorError::OutOfRange(format!("no peak above position {pos}")))?;
        let peak_hashes = peaks
            .iter()
            .map(|&(_, p)| self.node(p).map(|r| r.hash))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProofBlock {
            leaf_index,
            leaf_hash: leaf.hash,
            difficulty_start: leaf.difficulty_start,
            difficulty_end: leaf.difficulty_end,
            path,
            peaks: peak_hashes,
            peak_index,
        })
    }
}
