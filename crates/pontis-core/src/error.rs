//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the Pontis stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Accumulator-side errors (`AccumulatorError`) mean the *query* was bad:
//!   an index or difficulty target outside the current forest.
//! - Proof-side errors (`ProofError`) mean the *proof* was bad: reject it.
//!   None of them is retryable for the same proof instance; a caller may
//!   legitimately retry only by fetching a fresh proof from another peer.
//! - Position arithmetic never panics on adversarial inputs; every bounds
//!   failure surfaces as `OutOfRange`.

use thiserror::Error;

use crate::digest::Digest32;

/// Error parsing or constructing a digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// Hex input was not exactly 64 characters.
    #[error("expected 64 hex chars, got {0}")]
    BadLength(usize),

    /// Hex input contained a non-hex character.
    #[error("invalid hex: {0}")]
    BadHex(String),
}

/// Error from accumulator queries and mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumulatorError {
    /// A position, leaf index, or difficulty target fell outside the
    /// current accumulator bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The operation needs at least one leaf.
    #[error("accumulator has no leaves")]
    EmptyAccumulator,
}

/// Error from proof construction, sampling, or verification.
///
/// Every variant is a hard rejection of the proof instance at hand; there is
/// no partial credit at this layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The sampler was invoked on an accumulator with no history
    /// (zero leaves or zero total difficulty).
    #[error("insufficient history: {0}")]
    InsufficientHistory(String),

    /// The proof carries a leaf the deterministic sample set never asked for.
    /// Rejected outright so a prover cannot pad a cherry-picked subset.
    #[error("proof contains unrequested sample at leaf {leaf_index}")]
    UnexpectedExtraSamples {
        /// The offending leaf index.
        leaf_index: u64,
    },

    /// The proof is missing a leaf the deterministic sample set requires.
    #[error("proof is missing required sample at leaf {leaf_index}")]
    MissingRequiredSample {
        /// The absent leaf index.
        leaf_index: u64,
    },

    /// Recomputing the bagged root from an inclusion path did not reproduce
    /// the claimed root. The canonical "proof is forged or corrupted" signal.
    #[error("root mismatch: claimed {claimed}, computed {computed}")]
    RootMismatch {
        /// The root the proof claims.
        claimed: Digest32,
        /// The root the verifier recomputed.
        computed: Digest32,
    },

    /// The difficulty bookkeeping carried by the proof blocks violates the
    /// contiguous-range invariant or exceeds the claimed total.
    #[error("inconsistent difficulty range: {0}")]
    InconsistentDifficultyRange(String),

    /// The proof is structurally unusable: unsorted or duplicate blocks,
    /// peak index out of bounds, leaf index beyond the claimed leaf count.
    #[error("malformed proof: {0}")]
    Malformed(String),

    /// Sampling parameters outside their valid domain (λ must be positive,
    /// the weighting constant must lie strictly between 0 and 1), or a
    /// proof whose embedded parameters or seed disagree with the values the
    /// verifier agreed to.
    #[error("invalid sampling parameters: {0}")]
    InvalidParameters(String),

    /// An underlying accumulator query failed during extraction.
    #[error(transparent)]
    Accumulator(#[from] AccumulatorError),
}
