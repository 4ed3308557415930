//! # Verifier — Stateless Proof Checking
//!
//! Runs with only the proof object, a trusted root (from a checkpoint or an
//! independent channel), and the relying party's own agreed sampling
//! parameters and tip digest; it never touches the full accumulator. The
//! verifier independently recomputes the required sample-index set exactly
//! as extraction did, demands the proof reveal exactly that set, re-derives
//! the bagged root from every inclusion path, and checks the difficulty
//! bookkeeping. Any mismatch is a hard rejection; retry policy belongs to
//! the calling protocol.
//!
//! ## Security Invariant
//!
//! λ, c, and the seed come from the caller, never from the proof. The
//! parameters the proof carries are only cross-checked against the agreed
//! values; a prover who picks a weaker λ or its own seed is rejected before
//! any sampling happens, so the 1 − 2^−λ detection bound cannot be
//! negotiated down by the peer being verified.

use std::collections::BTreeSet;

use tracing::debug;

use pontis_core::digest::{node_hash, Digest32};
use pontis_core::error::ProofError;

use crate::accumulator::bag_peak_hashes;
use crate::proof::{Proof, ProofBlock, ProofMode, Side};
use crate::sampling::{sample_seed, SampleSet, SamplingParams};

/// Verify a proof against a trusted root, under the relying party's agreed
/// sampling parameters and the tip digest the seed is derived from.
///
/// All-or-nothing: the first failed check rejects the whole proof.
pub fn verify(
    proof: &Proof,
    trusted_root: &Digest32,
    params: &SamplingParams,
    tip: &Digest32,
) -> Result<(), ProofError> {
    if proof.root != *trusted_root {
        return Err(ProofError::RootMismatch {
            claimed: proof.root,
            computed: *trusted_root,
        });
    }

    check_shape(proof)?;

    let required = required_indices(proof, params, sample_seed(tip))?;
    let revealed: BTreeSet<u64> = proof.blocks.iter().map(|b| b.leaf_index).collect();
    if let Some(&missing) = required.difference(&revealed).next() {
        return Err(ProofError::MissingRequiredSample {
            leaf_index: missing,
        });
    }
    if let Some(&extra) = revealed.difference(&required).next() {
        // Extra, unrequested leaves are rejected outright so a prover cannot
        // pad a cherry-picked favorable subset.
        return Err(ProofError::UnexpectedExtraSamples { leaf_index: extra });
    }

    check_difficulty_ranges(proof)?;

    for block in &proof.blocks {
        let computed = recompute_root(block)?;
        if computed != proof.root {
            return Err(ProofError::RootMismatch {
                claimed: proof.root,
                computed,
            });
        }
    }

    debug!(
        blocks = proof.blocks.len(),
        leaf_count = proof.leaf_count,
        "proof verified"
    );
    Ok(())
}

/// Structural checks: sorted, deduplicated, in-bounds blocks with usable
/// peak lists.
fn check_shape(proof: &Proof) -> Result<(), ProofError> {
    if proof.blocks.is_empty() {
        return Err(ProofError::Malformed("proof reveals no leaves".to_string()));
    }
    for pair in proof.blocks.windows(2) {
        if pair[0].leaf_index >= pair[1].leaf_index {
            return Err(ProofError::Malformed(format!(
                "blocks must be strictly ascending by leaf index, saw {} then {}",
                pair[0].leaf_index, pair[1].leaf_index
            )));
        }
    }
    for block in &proof.blocks {
        if block.leaf_index >= proof.leaf_count {
            return Err(ProofError::Malformed(format!(
                "leaf index {} beyond claimed leaf count {}",
                block.leaf_index, proof.leaf_count
            )));
        }
        if block.peaks.is_empty() || block.peak_index >= block.peaks.len() {
            return Err(ProofError::Malformed(format!(
                "peak index {} unusable with {} peaks",
                block.peak_index,
                block.peaks.len()
            )));
        }
    }
    Ok(())
}

/// Recompute the leaf set the proof was required to reveal, dispatching on
/// the mode tag exactly as extraction did.
///
/// The sampling inputs are the caller's agreed `params` and `expected_seed`;
/// the values embedded in the proof are only cross-checked against them.
fn required_indices(
    proof: &Proof,
    params: &SamplingParams,
    expected_seed: [u8; 32],
) -> Result<BTreeSet<u64>, ProofError> {
    match proof.mode {
        ProofMode::Probabilistic {
            lambda,
            c,
            seed,
            target_difficulty,
        } => {
            if lambda != params.lambda || c != params.c {
                return Err(ProofError::InvalidParameters(format!(
                    "proof sampled with lambda={lambda}, c={c}; agreed lambda={}, c={}",
                    params.lambda, params.c
                )));
            }
            if seed != expected_seed {
                return Err(ProofError::InvalidParameters(
                    "proof seed does not match the agreed tip digest".to_string(),
                ));
            }
            let mut required = match params.sample_indices(
                expected_seed,
                proof.leaf_count,
                target_difficulty,
                proof.total_difficulty,
            )? {
                SampleSet::All => (0..proof.leaf_count).collect::<BTreeSet<_>>(),
                SampleSet::Indices(indices) => indices,
            };
            required.insert(anchor_index(proof, target_difficulty)?);
            Ok(required)
        }
        ProofMode::ExplicitRange {
            start_leaf,
            end_leaf,
        } => {
            if start_leaf > end_leaf || end_leaf >= proof.leaf_count {
                return Err(ProofError::Malformed(format!(
                    "leaf span [{start_leaf}, {end_leaf}] invalid for {} leaves",
                    proof.leaf_count
                )));
            }
            Ok((start_leaf..=end_leaf).collect())
        }
    }
}

/// Locate the mandatory anchor (tail) block: the revealed leaf whose
/// difficulty range contains the target.
fn anchor_index(proof: &Proof, target_difficulty: u128) -> Result<u64, ProofError> {
    proof
        .blocks
        .iter()
        .find(|b| {
            (target_difficulty == 0 && b.leaf_index == 0)
                || (b.difficulty_start < target_difficulty
                    && target_difficulty <= b.difficulty_end)
        })
        .map(|b| b.leaf_index)
        .ok_or(ProofError::MissingRequiredSample {
            // By convention the report names the first leaf the target could
            // live in; the true index is unknowable without the anchor block.
            leaf_index: 0,
        })
}

/// Difficulty bookkeeping: every range well-formed and inside the claimed
/// total, consecutive revealed ranges ordered and non-overlapping.
fn check_difficulty_ranges(proof: &Proof) -> Result<(), ProofError> {
    for block in &proof.blocks {
        if block.difficulty_start > block.difficulty_end {
            return Err(ProofError::InconsistentDifficultyRange(format!(
                "leaf {} has inverted range", block.leaf_index
            )));
        }
        if block.difficulty_end > proof.total_difficulty {
            return Err(ProofError::InconsistentDifficultyRange(format!(
                "leaf {} range ends past claimed total difficulty",
                block.leaf_index
            )));
        }
    }
    for pair in proof.blocks.windows(2) {
        if pair[0].difficulty_end > pair[1].difficulty_start {
            return Err(ProofError::InconsistentDifficultyRange(format!(
                "leaves {} and {} have overlapping or disordered ranges",
                pair[0].leaf_index, pair[1].leaf_index
            )));
        }
    }
    Ok(())
}

/// Fold one block's sibling path up to its peak, substitute the result into
/// the carried peak list, and re-bag right-to-left.
fn recompute_root(block: &ProofBlock) -> Result<Digest32, ProofError> {
    let mut acc = block.leaf_hash;
    for step in &block.path {
        acc = match step.side {
            Side::Left => node_hash(&step.hash, &acc),
            Side::Right => node_hash(&acc, &step.hash),
        };
    }
    let mut peaks = block.peaks.clone();
    peaks[block.peak_index] = acc;
    Ok(bag_peak_hashes(&peaks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::Accumulator;
    use crate::sampling::sample_seed;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sha2::{Digest, Sha256};

    fn header(i: u64) -> Digest32 {
        Digest32(Sha256::digest(format!("header-{i}").as_bytes()).into())
    }

    fn build(n: u64, difficulty: u128) -> Accumulator {
        let mut acc = Accumulator::new();
        for i in 0..n {
            acc.push(header(i), difficulty).unwrap();
        }
        acc
    }

    fn probabilistic_proof(acc: &Accumulator, target: u128) -> Proof {
        let seed = sample_seed(&acc.root());
        acc.create_new_proof(target, &SamplingParams::default(), seed)
            .unwrap()
    }

    /// Verify under the default agreed parameters, seeding from the root the
    /// proofs in these tests were extracted against.
    fn check(proof: &Proof, acc: &Accumulator) -> Result<(), ProofError> {
        verify(proof, &acc.root(), &SamplingParams::default(), &acc.root())
    }

    #[test]
    fn test_completeness_various_sizes() {
        for n in [1u64, 2, 3, 4, 7, 8, 1000] {
            let acc = build(n, 100);
            let target = acc.root_difficulty() / 2 + 1;
            let proof = probabilistic_proof(&acc, target);
            check(&proof, &acc).unwrap_or_else(|e| {
                panic!("honest probabilistic proof rejected for n={n}: {e}")
            });

            let range = acc.generate_proof(0, n - 1).unwrap();
            check(&range, &acc)
                .unwrap_or_else(|e| panic!("honest range proof rejected for n={n}: {e}"));
        }
    }

    #[test]
    fn test_wrong_trusted_root_rejected() {
        let acc = build(9, 10);
        let proof = acc.generate_proof(0, 8).unwrap();
        let wrong = acc.root().with_flipped_bit(5);
        assert!(matches!(
            verify(&proof, &wrong, &SamplingParams::default(), &acc.root()),
            Err(ProofError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_tampered_sibling_hash_rejected() {
        let acc = build(9, 10);
        let mut proof = acc.generate_proof(0, 8).unwrap();
        proof.blocks[3].path[0].hash = proof.blocks[3].path[0].hash.with_flipped_bit(0);
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_soundness_random_single_bit_corruptions() {
        // Every single-bit corruption of any carried hash must be caught.
        let acc = build(50, 10);
        let honest = acc.generate_proof(0, 49).unwrap();
        let root = acc.root();
        let mut rng = StdRng::from_seed([9u8; 32]);

        for trial in 0..1000 {
            let mut proof = honest.clone();
            let b = rng.gen_range(0..proof.blocks.len());
            let block = &mut proof.blocks[b];
            let bit = rng.gen_range(0..256usize);
            // Corrupt one of: a sibling hash, a peak hash, or the leaf hash.
            match rng.gen_range(0..3) {
                0 if !block.path.is_empty() => {
                    let s = rng.gen_range(0..block.path.len());
                    block.path[s].hash = block.path[s].hash.with_flipped_bit(bit);
                }
                // Never corrupt the block's own peak slot: verification
                // replaces it with the recomputed value before bagging.
                1 if block.peaks.len() > 1 => {
                    let mut p = rng.gen_range(0..block.peaks.len());
                    if p == block.peak_index {
                        p = (p + 1) % block.peaks.len();
                    }
                    block.peaks[p] = block.peaks[p].with_flipped_bit(bit);
                }
                _ => {
                    block.leaf_hash = block.leaf_hash.with_flipped_bit(bit);
                }
            }
            assert!(
                matches!(
                    verify(&proof, &root, &SamplingParams::default(), &root),
                    Err(ProofError::RootMismatch { .. })
                ),
                "corruption in trial {trial} was not caught"
            );
        }
    }

    #[test]
    fn test_leaf_substitution_rejected() {
        // Swap one block's leaf payload for a different leaf's: the sibling
        // path no longer folds to the root.
        let acc = build(16, 10);
        let mut proof = acc.generate_proof(0, 15).unwrap();
        let other_hash = proof.blocks[7].leaf_hash;
        proof.blocks[2].leaf_hash = other_hash;
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_required_sample_rejected() {
        let acc = build(20, 10);
        let mut proof = acc.generate_proof(0, 19).unwrap();
        proof.blocks.remove(4);
        assert_eq!(
            check(&proof, &acc),
            Err(ProofError::MissingRequiredSample { leaf_index: 4 })
        );
    }

    #[test]
    fn test_unexpected_extra_sample_rejected() {
        let acc = build(20, 10);
        let full = acc.generate_proof(0, 19).unwrap();
        let mut proof = acc.generate_proof(0, 10).unwrap();
        // Pad with a leaf the verifier never asked for.
        proof.blocks.push(full.blocks[15].clone());
        assert_eq!(
            check(&proof, &acc),
            Err(ProofError::UnexpectedExtraSamples { leaf_index: 15 })
        );
    }

    #[test]
    fn test_missing_anchor_block_rejected() {
        let acc = build(1000, 1000);
        let mut proof = probabilistic_proof(&acc, 1000);
        // Strip the mandatory anchor (leaf 0).
        proof.blocks.retain(|b| b.leaf_index != 0);
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::MissingRequiredSample { .. })
        ));
    }

    #[test]
    fn test_tampered_difficulty_range_rejected() {
        let acc = build(10, 100);
        let mut proof = acc.generate_proof(0, 9).unwrap();
        proof.blocks[5].difficulty_end = proof.total_difficulty + 1;
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::InconsistentDifficultyRange(_))
        ));

        let mut proof = acc.generate_proof(0, 9).unwrap();
        proof.blocks[5].difficulty_start = proof.blocks[4].difficulty_end - 10;
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::InconsistentDifficultyRange(_))
        ));
    }

    #[test]
    fn test_unsorted_blocks_rejected() {
        let acc = build(10, 100);
        let mut proof = acc.generate_proof(0, 9).unwrap();
        proof.blocks.swap(2, 3);
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::Malformed(_))
        ));
    }

    #[test]
    fn test_concrete_thousand_leaf_scenario() {
        let acc = build(1000, 1000);
        assert_eq!(acc.root_difficulty(), 1_000_000);
        assert_eq!(acc.leaf_number(), 1000);

        let proof = probabilistic_proof(&acc, 1000);
        // The mandatory tail block anchors the claim at leaf 0.
        assert!(proof.blocks.iter().any(|b| b.leaf_index == 0));
        check(&proof, &acc).unwrap();

        let mut tampered = proof.clone();
        let block = tampered
            .blocks
            .iter_mut()
            .find(|b| !b.path.is_empty())
            .unwrap();
        block.path[0].hash = block.path[0].hash.with_flipped_bit(13);
        assert!(matches!(
            check(&tampered, &acc),
            Err(ProofError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_proof_survives_wire_roundtrip_and_verifies() {
        let acc = build(33, 7);
        let proof = probabilistic_proof(&acc, 100);
        let bytes = serde_json::to_vec(&proof).unwrap();
        let decoded: Proof = serde_json::from_slice(&bytes).unwrap();
        check(&decoded, &acc).unwrap();
    }

    #[test]
    fn test_weakened_security_parameter_rejected() {
        // A prover who samples under its own lambda reveals far fewer leaves;
        // the verifier must hold it to the agreed parameters instead of the
        // ones embedded in the proof.
        let acc = build(1000, 1000);
        let seed = sample_seed(&acc.root());
        let weak = SamplingParams::new(1, crate::sampling::DEFAULT_C).unwrap();
        let proof = acc.create_new_proof(1000, &weak, seed).unwrap();
        let honest = probabilistic_proof(&acc, 1000);
        assert!(
            proof.blocks.len() < honest.blocks.len(),
            "weak parameters must reveal fewer leaves for this test to bite"
        );
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_prover_chosen_seed_rejected() {
        // The seed must be derived from the tip digest the verifier trusts,
        // never taken from the proof itself.
        let acc = build(1000, 1000);
        let proof = acc
            .create_new_proof(1000, &SamplingParams::default(), [99u8; 32])
            .unwrap();
        assert!(matches!(
            check(&proof, &acc),
            Err(ProofError::InvalidParameters(_))
        ));
    }
}
