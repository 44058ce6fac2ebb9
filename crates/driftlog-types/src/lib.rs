//! Shared types for the driftlog workspace.
//!
//! This crate defines the vocabulary used across all driftlog crates:
//! content identifiers ([`Cid`], [`HashAlgorithm`], [`Codec`]), the Merkle
//! accounting node ([`TreeNode`]), the encoded DAG shapes ([`DagNode`],
//! [`RootEntry`]), root-relative paths ([`TreePath`], [`Direction`]), and
//! the pluggable digest seam ([`NodeHasher`]).

mod cid;
mod hasher;
mod node;
mod path;

pub use cid::{Cid, Codec, HashAlgorithm};
pub use hasher::{Blake3Hasher, NodeHasher, Sha2Hasher};
pub use node::{DagNode, RootEntry, TreeNode};
pub use path::{Direction, TreePath};
