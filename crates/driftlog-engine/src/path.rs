//! Root-relative path derivation.

use driftlog_flattree as flat;
use driftlog_types::{Direction, TreePath};

use crate::error::EngineError;

/// Longest plausible walk from any node to a root: one step per tree
/// level, and a 64-bit index space has at most 64 levels.
const MAX_STEPS: usize = 64;

/// Derive the unique path from a root to `target`, given the current root
/// set in left-to-right order.
///
/// Walks upward via `parent()` until the walk lands on a root, recording
/// at each step whether the index being left was its parent's left or
/// right child (decided by offset parity, never external input). The
/// directions are discovered root-ward and reversed to leaf-ward.
///
/// Fails with [`EngineError::IndexNotInTree`] if no root is reached within
/// the depth bound — the index is outside the committed tree or the root
/// set is stale.
pub fn resolve_path(target: u64, roots: &[u64]) -> Result<TreePath, EngineError> {
    let mut directions = Vec::new();
    let mut current = target;

    for _ in 0..MAX_STEPS {
        if let Some(root_ordinal) = roots.iter().position(|&root| root == current) {
            directions.reverse();
            return Ok(TreePath {
                root_ordinal,
                directions,
            });
        }
        if flat::depth(current) >= MAX_STEPS as u32 - 1 {
            // Top of the 64-bit index space; no parent exists.
            break;
        }
        // Left children sit at even offsets within their depth row.
        directions.push(if flat::offset(current) % 2 == 0 {
            Direction::Left
        } else {
            Direction::Right
        });
        current = flat::parent(current);
    }

    Err(EngineError::IndexNotInTree(target))
}
