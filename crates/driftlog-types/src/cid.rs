//! Self-describing content identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

/// Digest algorithm used to derive a [`Cid`].
///
/// The algorithm is carried inside every identifier rather than fixed
/// globally, so a store populated with one algorithm can be read back
/// without out-of-band configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// BLAKE3, the default.
    Blake3,
    /// SHA-256.
    Sha2_256,
}

impl HashAlgorithm {
    /// Hash `data` with this algorithm, truncating nothing (both produce
    /// 32-byte digests).
    pub fn digest(&self, data: &[u8]) -> [u8; 32] {
        match self {
            HashAlgorithm::Blake3 => blake3::hash(data).into(),
            HashAlgorithm::Sha2_256 => sha2::Sha256::digest(data).into(),
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "b3",
            HashAlgorithm::Sha2_256 => "s2",
        }
    }
}

/// What the identified bytes are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Codec {
    /// Raw record payload bytes.
    Raw,
    /// A postcard-encoded [`DagNode`](crate::DagNode).
    Node,
}

impl Codec {
    fn tag(&self) -> &'static str {
        match self {
            Codec::Raw => "raw",
            Codec::Node => "node",
        }
    }
}

/// Content identifier: digest algorithm, codec, and a 32-byte digest of the
/// identified bytes.
///
/// Once assigned, a `Cid` is permanently bound to its content. Identifiers
/// are compared structurally, so the same bytes hashed with different
/// algorithms yield distinct (both valid) identifiers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cid {
    alg: HashAlgorithm,
    codec: Codec,
    digest: [u8; 32],
}

impl Cid {
    /// Derive the identifier for `data`.
    pub fn from_data(alg: HashAlgorithm, codec: Codec, data: &[u8]) -> Self {
        Self {
            alg,
            codec,
            digest: alg.digest(data),
        }
    }

    /// The digest algorithm this identifier was derived with.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.alg
    }

    /// The codec of the identified bytes.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// The raw 32-byte digest.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Verify that `data` matches this identifier.
    pub fn matches(&self, data: &[u8]) -> bool {
        self.alg.digest(data) == self.digest
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-", self.alg.tag(), self.codec.tag())?;
        for byte in &self.digest {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({self})")
    }
}
