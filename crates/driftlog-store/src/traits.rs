//! Store traits for record blobs and encoded DAG nodes.

use bytes::Bytes;
use driftlog_types::{Cid, DagNode, TreePath};

use crate::error::StoreError;

/// Content-addresses raw record payloads.
///
/// Record blobs are addressed separately from tree nodes: a leaf's encoded
/// DAG node references the record by this store's identifier rather than
/// embedding the payload.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Store a record payload, returning its content identifier.
    ///
    /// Idempotent: storing the same bytes twice returns the same identifier.
    async fn put_record(&self, data: Bytes) -> Result<Cid, StoreError>;

    /// Retrieve a record payload by identifier. `None` if not stored here.
    async fn get_record(&self, cid: Cid) -> Result<Option<Bytes>, StoreError>;
}

/// Stores encoded DAG nodes and serves path-based fetch.
///
/// All implementations must be `Send + Sync` for use across async tasks.
/// Encoded nodes are passed as [`Bytes`]; the store assigns identifiers by
/// hashing the encoded content, so nodes are immutable once stored.
#[async_trait::async_trait]
pub trait DagStore: Send + Sync {
    /// Store an encoded node, returning its content identifier.
    async fn put_node(&self, encoded: Bytes) -> Result<Cid, StoreError>;

    /// Retrieve an encoded node by identifier. `None` if not stored here.
    async fn get_node(&self, cid: Cid) -> Result<Option<Bytes>, StoreError>;

    /// Check whether a node exists.
    async fn contains(&self, cid: Cid) -> Result<bool, StoreError>;

    /// Fetch one node by walking a root-relative path from a manifest.
    ///
    /// Decodes only the nodes on the path — the manifest, the selected
    /// root, and one node per direction — never the whole DAG.
    async fn get_by_path(&self, manifest: Cid, path: &TreePath) -> Result<Bytes, StoreError> {
        let bytes = self
            .get_node(manifest)
            .await?
            .ok_or(StoreError::NotFound(manifest))?;
        let roots = match DagNode::decode(&bytes)? {
            DagNode::Manifest { roots, .. } => roots,
            _ => {
                return Err(StoreError::UnresolvedLink(format!(
                    "{manifest} is not a manifest"
                )))
            }
        };

        let root = roots.get(path.root_ordinal).ok_or_else(|| {
            StoreError::UnresolvedLink(format!(
                "roots/{} (manifest has {} roots)",
                path.root_ordinal,
                roots.len()
            ))
        })?;

        let mut current = root.cid;
        let mut bytes = self
            .get_node(current)
            .await?
            .ok_or(StoreError::NotFound(current))?;

        for (step, direction) in path.directions.iter().enumerate() {
            let (left, right) = match DagNode::decode(&bytes)? {
                DagNode::Branch { left, right, .. } => (left, right),
                _ => {
                    return Err(StoreError::UnresolvedLink(format!(
                        "step {step} of {path}: {current} has no children"
                    )))
                }
            };
            current = match direction {
                driftlog_types::Direction::Left => left,
                driftlog_types::Direction::Right => right,
            };
            bytes = self
                .get_node(current)
                .await?
                .ok_or(StoreError::NotFound(current))?;
        }

        Ok(bytes)
    }
}
