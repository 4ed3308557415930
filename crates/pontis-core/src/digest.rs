//! # Content Digest — 32-byte Hashes and Tree Hashing
//!
//! Defines `Digest32`, the 32-byte content hash used throughout the Pontis
//! stack, together with the domain-separated SHA-256 functions that build the
//! accumulator's hash tree:
//!
//! - Leaf: `SHA256(0x00 || header_digest)`.
//! - Interior node: `SHA256(0x01 || left || right)`.
//!
//! ## Security Invariant
//!
//! The single-byte domain prefix guarantees that a leaf preimage can never be
//! reinterpreted as an interior-node preimage (and vice versa), so a forged
//! proof cannot splice a subtree root in place of a header hash.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::DigestError;

/// Domain prefix for leaf hashing.
const LEAF_PREFIX: u8 = 0x00;
/// Domain prefix for interior-node hashing (also used for peak bagging).
const NODE_PREFIX: u8 = 0x01;

/// A 32-byte content digest.
///
/// Used for header hashes, tree-node hashes, and bagged roots alike. The
/// all-zero digest is reserved as the empty-forest sentinel and is never a
/// valid SHA-256 output in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    /// The empty-forest sentinel: an accumulator with zero leaves has this root.
    pub const ZERO: Digest32 = Digest32([0u8; 32]);

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-char hex string into a digest.
    pub fn from_hex(hex: &str) -> Result<Self, DigestError> {
        let hex = hex.trim();
        if hex.len() != 64 {
            return Err(DigestError::BadLength(hex.len()));
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| DigestError::BadHex(format!("invalid utf8 at byte {i}: {e}")))?;
            out[i] = u8::from_str_radix(s, 16)
                .map_err(|e| DigestError::BadHex(format!("invalid hex at byte {i}: {e}")))?;
        }
        Ok(Digest32(out))
    }

    /// Flip a single bit, counting from the digest's first byte.
    ///
    /// Exists for corruption tests; a verifier never mutates digests.
    pub fn with_flipped_bit(mut self, bit: usize) -> Self {
        self.0[(bit / 8) % 32] ^= 1 << (bit % 8);
        self
    }
}

impl AsRef<[u8]> for Digest32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Digest32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the leaf hash for a header digest: `SHA256(0x00 || header_digest)`.
pub fn leaf_hash(header_digest: &Digest32) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(header_digest);
    Digest32(hasher.finalize().into())
}

/// Compute an interior-node hash: `SHA256(0x01 || left || right)`.
///
/// Also the folding step for peak bagging, so a bagged root is itself an
/// interior-node hash over the peak to its left and the bag so far.
pub fn node_hash(left: &Digest32, right: &Digest32) -> Digest32 {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    Digest32(hasher.finalize().into())
}
