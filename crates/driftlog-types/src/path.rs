//! Root-relative paths through the DAG.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a descent from a root toward a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Descend into the left child.
    Left,
    /// Descend into the right child.
    Right,
}

/// A root-relative path locating one node without full-tree traversal.
///
/// `root_ordinal` selects a root from a manifest's ordered root sequence;
/// `directions` are applied leaf-ward from that root. The [`fmt::Display`]
/// form is `roots/<ordinal>/left/right/...`, usable as a path string by
/// path-based fetch collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreePath {
    /// Position of the root within the manifest's root sequence.
    pub root_ordinal: usize,
    /// Leaf-ward descent steps; empty for the root itself.
    pub directions: Vec<Direction>,
}

impl TreePath {
    /// A path naming a root itself.
    pub fn root(root_ordinal: usize) -> Self {
        Self {
            root_ordinal,
            directions: Vec::new(),
        }
    }

    /// Extend the path one step leaf-ward.
    pub fn child(&self, direction: Direction) -> Self {
        let mut directions = self.directions.clone();
        directions.push(direction);
        Self {
            root_ordinal: self.root_ordinal,
            directions,
        }
    }

    /// Number of descent steps below the root.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    /// `true` when the path names a root.
    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "roots/{}", self.root_ordinal)?;
        for direction in &self.directions {
            match direction {
                Direction::Left => write!(f, "/left")?,
                Direction::Right => write!(f, "/right")?,
            }
        }
        Ok(())
    }
}
