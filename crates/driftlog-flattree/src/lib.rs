//! Flat-tree index arithmetic.
//!
//! A binary Merkle tree laid over an append-only sequence of records can be
//! addressed with plain integers instead of pointers: the record for entry
//! `n` sits at leaf index `2n` (even indices), and odd indices are internal
//! nodes. Every operation here is pure arithmetic over those indices — the
//! tree itself is never materialized.
//!
//! ```text
//! 0
//!   1
//! 2
//!     3
//! 4
//!   5
//! 6
//! ```

/// Errors from flat-tree operations.
///
/// Indices are unsigned, so an invalid (negative) index is unrepresentable;
/// the only caller misuse left is asking for the roots of an empty tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlatTreeError {
    /// `full_roots` requires at least one committed record.
    #[error("invalid tree length: {0} (must be > 0)")]
    InvalidLength(u64),
}

/// Depth of a node: leaves are at depth 0, their parents at depth 1, etc.
///
/// Equal to the number of trailing one-bits in the index.
pub fn depth(index: u64) -> u32 {
    (!index).trailing_zeros()
}

/// Horizontal offset of a node within its depth row (leftmost is 0).
pub fn offset(index: u64) -> u64 {
    index >> (depth(index) + 1)
}

/// Index of the node at `depth` and horizontal `offset`.
pub fn index(depth: u32, offset: u64) -> u64 {
    ((2 * offset + 1) << depth) - 1
}

/// `true` if the index addresses a leaf.
pub fn is_leaf(i: u64) -> bool {
    i % 2 == 0
}

/// Leaf index holding record number `n`.
pub fn leaf_index(n: u64) -> u64 {
    2 * n
}

/// Record number stored at a leaf index. Meaningful for even indices only.
pub fn record_number(leaf: u64) -> u64 {
    leaf >> 1
}

/// Index of the node's parent, one level up.
///
/// Whether the node is the left or right child is determined by its offset
/// parity at its own depth, never by external input.
pub fn parent(i: u64) -> u64 {
    index(depth(i) + 1, offset(i) >> 1)
}

/// Index of the node's sibling (the other child of its parent).
pub fn sibling(i: u64) -> u64 {
    index(depth(i), offset(i) ^ 1)
}

/// The two children of an internal node, or `None` for a leaf.
pub fn children(i: u64) -> Option<(u64, u64)> {
    let d = depth(i);
    if d == 0 {
        return None;
    }
    let o = offset(i);
    Some((index(d - 1, 2 * o), index(d - 1, 2 * o + 1)))
}

/// Leftmost leaf index covered by the subtree rooted at `i`.
pub fn left_span(i: u64) -> u64 {
    offset(i) << (depth(i) + 1)
}

/// Rightmost leaf index covered by the subtree rooted at `i`.
pub fn right_span(i: u64) -> u64 {
    left_span(i) + (1u64 << (depth(i) + 1)) - 2
}

/// Inclusive `[first_leaf, last_leaf]` leaf-index range under `i`.
pub fn span(i: u64) -> (u64, u64) {
    (left_span(i), right_span(i))
}

/// Roots of the complete subtrees exactly covering the first `length`
/// records, ordered left to right by leaf position.
///
/// Greedy: repeatedly take the largest power-of-two block that fits in the
/// remaining uncovered prefix. The ordering is significant — manifests and
/// path resolution both rely on it.
pub fn full_roots(length: u64) -> Result<Vec<u64>, FlatTreeError> {
    if length == 0 {
        return Err(FlatTreeError::InvalidLength(length));
    }

    let mut roots = Vec::new();
    let mut remaining = length;
    let mut node_offset = 0u64;

    while remaining > 0 {
        let block = 1u64 << (63 - remaining.leading_zeros());
        roots.push(node_offset + block - 1);
        node_offset += 2 * block;
        remaining -= block;
    }

    Ok(roots)
}
