//! # pontis-core — Foundational Types for the Pontis Stack
//!
//! This crate is the bedrock of the Pontis light-client stack. It defines the
//! primitives shared by every other crate in the workspace; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype for digests.** `Digest32` wraps the raw 32 bytes; no bare
//!    `[u8; 32]` crosses a public API.
//! 2. **Domain-separated hashing.** All tree hashing flows through
//!    `leaf_hash()` / `node_hash()`, which prefix a domain byte before SHA-256.
//!    Leaf and interior preimages can never collide by construction.
//! 3. **Structured errors.** One `thiserror` enum per concern. Rejecting a
//!    proof and rejecting a query are different failure classes and carry
//!    different context.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pontis-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod digest;
pub mod error;

// Re-export primary types for ergonomic imports.
pub use digest::{leaf_hash, node_hash, Digest32};
pub use error::{AccumulatorError, DigestError, ProofError};
