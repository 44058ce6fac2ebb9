//! Merkle accounting nodes and encoded DAG shapes.

use serde::{Deserialize, Serialize};

use crate::Cid;

/// Per-index Merkle accounting entry: the node's digest and the cumulative
/// byte size of the subtree below it.
///
/// For a leaf, `size` is the byte length of the record and `hash` is the
/// leaf digest of the record payload. For an internal node, `size` is the
/// sum of both children's sizes and `hash` covers both children's
/// `(hash, size)` pairs. Immutable once computed — the append-only
/// discipline guarantees a node is never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Digest of the record (leaf) or of the children's hash/size pairs.
    pub hash: [u8; 32],
    /// Cumulative byte size of all records under this node.
    pub size: u64,
}

/// One full root as recorded in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry {
    /// Flat-tree index of the root node.
    pub index: u64,
    /// Identifier of the root's encoded DAG node.
    pub cid: Cid,
    /// Cumulative byte size of the subtree under this root.
    pub size: u64,
}

/// The three encoded DAG shapes.
///
/// Encoded with postcard; the enum discriminant makes the three shapes
/// distinguishable from the bytes alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DagNode {
    /// A leaf: one appended record. The record payload itself lives in the
    /// record blob store under `record`; the tree node only references it.
    Leaf {
        /// Byte length of the record.
        size: u64,
        /// Identifier of the raw record blob.
        record: Cid,
    },
    /// An internal node covering two finalized children.
    Branch {
        /// Sum of both children's sizes.
        size: u64,
        /// Merkle digest over both children's (hash, size) pairs.
        hash: [u8; 32],
        /// Left child's encoded-node identifier.
        left: Cid,
        /// Right child's encoded-node identifier.
        right: Cid,
    },
    /// Snapshot entry point for the log as of `length` appended records.
    Manifest {
        /// Number of records committed when this manifest was emitted.
        length: u64,
        /// Current full roots, left to right by leaf position.
        roots: Vec<RootEntry>,
    },
}

impl DagNode {
    /// Serialize to postcard bytes.
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Deserialize from postcard bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// Cumulative size for leaf and branch shapes; total size (sum of root
    /// sizes) for manifests.
    pub fn size(&self) -> u64 {
        match self {
            DagNode::Leaf { size, .. } | DagNode::Branch { size, .. } => *size,
            DagNode::Manifest { roots, .. } => roots.iter().map(|r| r.size).sum(),
        }
    }
}
