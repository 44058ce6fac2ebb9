//! Pluggable Merkle digest seam.
//!
//! The digest used for tree hashing is configuration, not a constant:
//! implementations of [`NodeHasher`] define the leaf and parent preimages
//! once, parameterized only by the underlying algorithm.

use sha2::Digest as _;

use crate::{HashAlgorithm, TreeNode};

/// Leaf domain tag in hash preimages.
const LEAF_TAG: u8 = 0x00;
/// Parent domain tag in hash preimages.
const PARENT_TAG: u8 = 0x01;

/// Computes Merkle tree digests for leaves and internal nodes.
///
/// Leaf preimage: `0x00 || be64(len) || payload`.
/// Parent preimage: `0x01 || left.hash || be64(left.size) || right.hash ||
/// be64(right.size)` — the children's (hash, size) pairs, so a parent
/// commits to sizes as well as content.
pub trait NodeHasher: Send + Sync {
    /// The algorithm behind this hasher, recorded in manifest consumers'
    /// expectations and usable for CID derivation.
    fn algorithm(&self) -> HashAlgorithm;

    /// Digest a leaf record payload.
    fn leaf_hash(&self, payload: &[u8]) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(9 + payload.len());
        preimage.push(LEAF_TAG);
        preimage.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        preimage.extend_from_slice(payload);
        self.digest(&preimage)
    }

    /// Digest an internal node from its two children.
    fn parent_hash(&self, left: &TreeNode, right: &TreeNode) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(1 + 2 * (32 + 8));
        preimage.push(PARENT_TAG);
        preimage.extend_from_slice(&left.hash);
        preimage.extend_from_slice(&left.size.to_be_bytes());
        preimage.extend_from_slice(&right.hash);
        preimage.extend_from_slice(&right.size.to_be_bytes());
        self.digest(&preimage)
    }

    /// Raw digest primitive.
    fn digest(&self, preimage: &[u8]) -> [u8; 32];
}

/// BLAKE3-based [`NodeHasher`], the default choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl NodeHasher for Blake3Hasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Blake3
    }

    fn digest(&self, preimage: &[u8]) -> [u8; 32] {
        blake3::hash(preimage).into()
    }
}

/// SHA-256-based [`NodeHasher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha2Hasher;

impl NodeHasher for Sha2Hasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha2_256
    }

    fn digest(&self, preimage: &[u8]) -> [u8; 32] {
        sha2::Sha256::digest(preimage).into()
    }
}
