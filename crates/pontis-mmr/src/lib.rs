//! # pontis-mmr — Difficulty-Weighted Merkle Mountain Range
//!
//! The cryptographic core of the Pontis chain-to-chain relay: an append-only,
//! difficulty-weighted accumulator over chain headers, with compact
//! probabilistically-verifiable proofs that a claimed amount of cumulative
//! proof-of-work exists on top of a claimed point.
//!
//! ## Architecture
//!
//! Leaf-to-root dependency order:
//!
//! - [`position`] — pure index arithmetic over the flat binary-forest packing.
//!   No pointers are ever stored; parent, sibling, and peak relationships are
//!   all functions of the index.
//! - [`node`] — the [`NodeRecord`] stored at each position: content hash,
//!   cumulative difficulty, leaf count, and the leaf's difficulty range.
//! - [`store`] — the sequence abstraction ([`NodeStore`]) the accumulator
//!   writes through, so the node array can be backed by a durable store.
//! - [`accumulator`] — [`Accumulator`]: push with peak merging, rollback pop,
//!   peak enumeration, root bagging, and difficulty-ordered leaf search.
//! - [`sampling`] — the FlyClient-style sampling-security calculator that
//!   decides how many and which leaves a proof must reveal.
//! - [`proof`] — proof objects and extraction (probabilistic by difficulty
//!   target, or deterministic by explicit leaf range).
//! - [`verify`] — stateless verification against a trusted root, under the
//!   relying party's agreed sampling parameters.
//!
//! ## Concurrency Model
//!
//! The accumulator is single-writer: `push`/`pop` take `&mut self` and must
//! be serialized by the caller. Extraction and verification are read-only and
//! capture the forest size once at entry, so concurrent readers observe a
//! consistent snapshot. Node records are immutable once appended.

pub mod accumulator;
pub mod node;
pub mod position;
pub mod proof;
pub mod sampling;
pub mod store;
pub mod verify;

// Re-export primary types for ergonomic imports.
pub use accumulator::Accumulator;
pub use node::NodeRecord;
pub use proof::{PathStep, Proof, ProofBlock, ProofMode, Side};
pub use sampling::{sample_seed, SampleCount, SampleSet, SamplingParams};
pub use store::{MemStore, NodeStore};
pub use verify::verify;
