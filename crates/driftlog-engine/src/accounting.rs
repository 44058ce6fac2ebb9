//! Incremental Merkle accounting over the flat-tree index space.

use std::collections::HashMap;
use std::sync::Arc;

use driftlog_flattree as flat;
use driftlog_types::{NodeHasher, TreeNode};
use tracing::{debug, trace};

use crate::error::EngineError;

/// One node finalized as a side effect of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalized {
    /// Flat-tree index of the finalized node.
    pub index: u64,
    /// The node's accounting entry.
    pub node: TreeNode,
}

/// Result of a single append: the new leaf plus every internal node that
/// became full because of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// Leaf index assigned to the record (`2 * record_number`).
    pub leaf_index: u64,
    /// The leaf's accounting entry.
    pub leaf: TreeNode,
    /// Internal nodes finalized by this append, bottom-up. May be empty.
    pub internals: Vec<Finalized>,
}

/// Maintains `(hash, size)` per node index as records are appended.
///
/// Node data is stored in an index-keyed map rather than a pointer-linked
/// tree; all structure is derived from flat-tree arithmetic. A node's entry
/// never changes once set — the append-only discipline means no node is
/// ever recomputed.
///
/// Single-writer: callers serialize appends externally.
pub struct MerkleLog {
    nodes: HashMap<u64, TreeNode>,
    length: u64,
    hasher: Arc<dyn NodeHasher>,
}

impl MerkleLog {
    /// Create an empty log using `hasher` for leaf and parent digests.
    pub fn new(hasher: Arc<dyn NodeHasher>) -> Self {
        Self {
            nodes: HashMap::new(),
            length: 0,
            hasher,
        }
    }

    /// Number of records appended so far.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Append one record: store its leaf, then finalize every ancestor
    /// whose sibling subtree is now complete, walking upward until hitting
    /// a node still waiting on uncommitted leaves.
    pub fn append(&mut self, record: &[u8]) -> Appended {
        let leaf_index = flat::leaf_index(self.length);
        let leaf = TreeNode {
            hash: self.hasher.leaf_hash(record),
            size: record.len() as u64,
        };
        self.nodes.insert(leaf_index, leaf);
        self.length += 1;
        trace!(leaf_index, size = leaf.size, "stored leaf");

        // A parent is full once its rightmost covered leaf is committed.
        let mut internals = Vec::new();
        let mut current = leaf_index;
        loop {
            let parent = flat::parent(current);
            if flat::right_span(parent) >= 2 * self.length {
                break;
            }
            let node = match flat::children(parent) {
                Some((left, right)) => {
                    // Both children exist: every leaf under the parent is
                    // committed, so the whole subtree is finalized.
                    let left_node = self.nodes[&left];
                    let right_node = self.nodes[&right];
                    TreeNode {
                        hash: self.hasher.parent_hash(&left_node, &right_node),
                        size: left_node.size + right_node.size,
                    }
                }
                None => break,
            };
            self.nodes.insert(parent, node);
            internals.push(Finalized {
                index: parent,
                node,
            });
            current = parent;
        }

        debug!(
            leaf_index,
            finalized = internals.len(),
            length = self.length,
            "appended record"
        );

        Appended {
            leaf_index,
            leaf,
            internals,
        }
    }

    /// The accounting entry for a node. Fails with
    /// [`EngineError::NotFound`] if the node has not been finalized yet.
    pub fn get(&self, index: u64) -> Result<TreeNode, EngineError> {
        self.nodes
            .get(&index)
            .copied()
            .ok_or(EngineError::NotFound(index))
    }

    /// The full roots for a tree of `length` records, each annotated with
    /// its stored accounting entry, left to right.
    pub fn roots_at(&self, length: u64) -> Result<Vec<(u64, TreeNode)>, EngineError> {
        flat::full_roots(length)?
            .into_iter()
            .map(|index| Ok((index, self.get(index)?)))
            .collect()
    }

    /// Drop entries no longer needed for future appends.
    ///
    /// A node's entry is only ever read again to compute its parent; once
    /// the parent is finalized the child entry is dead weight. Callers
    /// should only prune after the affected nodes have been exported.
    /// Returns the number of entries dropped.
    pub fn prune_finalized_interiors(&mut self) -> usize {
        let dead: Vec<u64> = self
            .nodes
            .keys()
            .copied()
            .filter(|&index| self.nodes.contains_key(&flat::parent(index)))
            .collect();
        for index in &dead {
            self.nodes.remove(index);
        }
        if !dead.is_empty() {
            debug!(pruned = dead.len(), "pruned finalized interior nodes");
        }
        dead.len()
    }
}
