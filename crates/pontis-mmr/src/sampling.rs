//! # Sampling-Security Calculator
//!
//! FlyClient/NIPoPoW-style statistical security: given a security parameter
//! λ, a weighting constant c, the difficulty `B` of the segment being proved,
//! the total difficulty `T`, and the leaf count `n`, decide how many leaves
//! must be independently sampled, and which ones, so that a prover who has
//! forged any segment of relative weight ≥ c is caught with probability
//! ≥ 1 − 2^−λ.
//!
//! ## Determinism
//!
//! The draws are driven by a seed both sides derive from a public,
//! unpredictable value (the tip hash being proven against), so the verifier
//! regenerates the exact index set without trusting the prover's choices.
//!
//! ## Floating Point
//!
//! The sample-count formula uses `f64` logarithms and feeds a
//! security-critical count, so the result is always rounded **up**, and any
//! non-finite or non-positive outcome degrades to "sample everything",
//! never to zero samples.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use pontis_core::digest::Digest32;
use pontis_core::error::ProofError;

/// Default security parameter: 50 bits.
pub const DEFAULT_LAMBDA: u32 = 50;

/// Default adversary weighting constant.
pub const DEFAULT_C: f64 = 0.5;

/// Validated sampling parameters shared by prover and verifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Security parameter λ in bits.
    pub lambda: u32,
    /// Weighting constant c: the smallest relative forged weight the
    /// sampling must catch. Strictly between 0 and 1.
    pub c: f64,
}

impl SamplingParams {
    /// Construct parameters, rejecting out-of-domain values.
    pub fn new(lambda: u32, c: f64) -> Result<Self, ProofError> {
        if lambda == 0 {
            return Err(ProofError::InvalidParameters(
                "lambda must be positive".to_string(),
            ));
        }
        if !(c > 0.0 && c < 1.0) {
            return Err(ProofError::InvalidParameters(format!(
                "weighting constant must lie strictly between 0 and 1, got {c}"
            )));
        }
        Ok(Self { lambda, c })
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            c: DEFAULT_C,
        }
    }
}

/// How many leaves the proof must reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    /// Every leaf: full deterministic verification of the range.
    All,
    /// This many difficulty-biased draws.
    Count(u64),
}

/// Which leaves the proof must reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSet {
    /// Every leaf in `0..n`.
    All,
    /// The deduplicated drawn indices.
    Indices(BTreeSet<u64>),
}

/// Derive the sampling seed from the tip digest being proven against.
///
/// The tip hash is public and unpredictable before the block exists, which
/// is exactly what the shared-seed discipline needs.
pub fn sample_seed(tip: &Digest32) -> [u8; 32] {
    tip.0
}

impl SamplingParams {
    /// Minimum number of independent samples for the claim `B` out of `T`
    /// over `n` leaves:
    ///
    /// `m = (−λ − log2(c·n)) / log2(max(0, 1 − 1/log_c(B/T)))`
    ///
    /// A clamped inner term models certainty of detection, not zero samples,
    /// so it degrades to [`SampleCount::All`], as do `B == T` (proving the
    /// whole chain) and every non-finite or non-positive outcome.
    pub fn required_samples(
        &self,
        proved_difficulty: u128,
        total_difficulty: u128,
        leaf_count: u64,
    ) -> Result<SampleCount, ProofError> {
        if leaf_count == 0 || total_difficulty == 0 {
            return Err(ProofError::InsufficientHistory(format!(
                "{leaf_count} leaves, total difficulty {total_difficulty}"
            )));
        }
        if proved_difficulty >= total_difficulty {
            return Ok(SampleCount::All);
        }

        let delta = proved_difficulty as f64 / total_difficulty as f64;
        // log_c(delta); both logs are negative, so the ratio is positive.
        let log_c_delta = delta.ln() / self.c.ln();
        let inner = 1.0 - 1.0 / log_c_delta;
        if !inner.is_finite() || inner <= 0.0 {
            return Ok(SampleCount::All);
        }

        let numerator = -(self.lambda as f64) - (self.c * leaf_count as f64).log2();
        let m = numerator / inner.log2();
        if !m.is_finite() || m <= 0.0 {
            return Ok(SampleCount::All);
        }

        // Round up: undersampling is a security failure, oversampling is not.
        let m = m.ceil() as u64;
        if m >= leaf_count {
            return Ok(SampleCount::All);
        }
        Ok(SampleCount::Count(m))
    }

    /// Draw the deterministic, difficulty-biased sample index set.
    ///
    /// Each of the `m` draws inverts the CDF `F(y) = 1 − delta^y` against a
    /// uniform variate: `y = log_delta(1 − u·(1 − delta))`, with `y` read as
    /// a relative distance back from the tip, so high-recency leaves are
    /// drawn with higher density. Colliding draws collapse to one index
    /// (keep-one, via the ordered set).
    pub fn sample_indices(
        &self,
        seed: [u8; 32],
        leaf_count: u64,
        proved_difficulty: u128,
        total_difficulty: u128,
    ) -> Result<SampleSet, ProofError> {
        let m = match self.required_samples(proved_difficulty, total_difficulty, leaf_count)? {
            SampleCount::All => return Ok(SampleSet::All),
            SampleCount::Count(m) => m,
        };

        let delta = proved_difficulty as f64 / total_difficulty as f64;
        let mut rng = StdRng::from_seed(seed);
        let mut indices = BTreeSet::new();
        for _ in 0..m {
            let u: f64 = rng.gen();
            // y in [0, 1): 0 at the tip, approaching 1 toward the anchor.
            let y = (1.0 - u * (1.0 - delta)).log(delta);
            let offset = ((y * leaf_count as f64) as u64).min(leaf_count - 1);
            indices.insert(leaf_count - 1 - offset);
        }
        Ok(SampleSet::Indices(indices))
    }
}
