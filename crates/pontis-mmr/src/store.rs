//! # Node Store — Sequence Abstraction Over the Flat Array
//!
//! The accumulator's array may be too large to hold in memory; this trait is
//! the seam a durable key-value backend plugs into. The core only requires
//! O(1) amortized append and O(1) random read by index; key encoding is the
//! backend's business.
//!
//! `truncate` exists solely for local rollback (`pop`); it is never driven by
//! the proof protocol.

use crate::node::NodeRecord;

/// Append-only (plus tail truncation) sequence of node records.
pub trait NodeStore {
    /// Append a record at the next position.
    fn append(&mut self, record: NodeRecord);

    /// Read the record at `index`, or `None` past the end.
    fn get(&self, index: u64) -> Option<NodeRecord>;

    /// Number of records currently stored.
    fn len(&self) -> u64;

    /// True if no records are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record at position `len` and beyond.
    fn truncate(&mut self, len: u64);
}

/// In-memory node store backed by a growable `Vec`.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    nodes: Vec<NodeRecord>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeStore for MemStore {
    fn append(&mut self, record: NodeRecord) {
        self.nodes.push(record);
    }

    fn get(&self, index: u64) -> Option<NodeRecord> {
        usize::try_from(index).ok().and_then(|i| self.nodes.get(i).cloned())
    }

    fn len(&self) -> u64 {
        self.nodes.len() as u64
    }

    fn truncate(&mut self, len: u64) {
        if let Ok(len) = usize::try_from(len) {
            self.nodes.truncate(len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pontis_core::digest::Digest32;

    #[test]
    fn test_mem_store_append_get_truncate() {
        let mut store = MemStore::new();
        assert!(store.is_empty());
        assert!(store.get(0).is_none());

        for i in 0..5u64 {
            store.append(NodeRecord::leaf(Digest32::ZERO, 1, i, i as u128));
        }
        assert_eq!(store.len(), 5);
        assert_eq!(store.get(3).map(|r| r.index), Some(3));
        assert!(store.get(5).is_none());

        store.truncate(2);
        assert_eq!(store.len(), 2);
        assert!(store.get(2).is_none());
    }
}
