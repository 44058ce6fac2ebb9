//! Reconstructed read access from a manifest identifier alone.

use std::sync::Arc;

use bytes::Bytes;
use driftlog_flattree as flat;
use driftlog_store::{DagStore, RecordStore, StoreError};
use driftlog_types::{Cid, DagNode, Direction, RootEntry, TreePath};
use tracing::trace;

use crate::error::EngineError;
use crate::path::resolve_path;

/// A resolved byte offset: the containing leaf and where it starts in the
/// logical data stream.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Located {
    leaf_index: u64,
    leaf_start: u64,
    path: TreePath,
}

/// Reads a replicated log back out of the DAG, holding only a manifest
/// identifier — no accounting structure, no full-tree state.
///
/// Every operation fetches exactly the nodes on one root-relative path.
pub struct LogReader {
    dag: Arc<dyn DagStore>,
    records: Arc<dyn RecordStore>,
}

impl LogReader {
    /// Create a reader over the given stores.
    pub fn new(dag: Arc<dyn DagStore>, records: Arc<dyn RecordStore>) -> Self {
        Self { dag, records }
    }

    /// Decode a manifest: committed length and ordered root entries.
    pub async fn manifest(&self, manifest_cid: Cid) -> Result<(u64, Vec<RootEntry>), EngineError> {
        let bytes = self
            .dag
            .get_node(manifest_cid)
            .await?
            .ok_or(StoreError::NotFound(manifest_cid))?;
        match DagNode::decode(&bytes)? {
            DagNode::Manifest { length, roots } => Ok((length, roots)),
            _ => Err(EngineError::UnexpectedShape(format!(
                "{manifest_cid} is not a manifest"
            ))),
        }
    }

    /// The committed record count recorded in a manifest.
    pub async fn length(&self, manifest_cid: Cid) -> Result<u64, EngineError> {
        Ok(self.manifest(manifest_cid).await?.0)
    }

    /// Map a byte offset in the logical concatenated data stream to the
    /// leaf index containing it.
    ///
    /// Locates the containing root from the manifest's root sizes, then
    /// descends: at each internal node the left child's size (fetched by
    /// path) decides the branch, subtracting it when going right. Works
    /// for subtrees of any height.
    pub async fn resolve_offset(&self, manifest_cid: Cid, offset: u64) -> Result<u64, EngineError> {
        Ok(self.locate(manifest_cid, offset).await?.leaf_index)
    }

    /// Fetch the record bytes stored at a leaf index.
    ///
    /// Resolves the leaf's path against the manifest's roots, fetches the
    /// encoded leaf node, then fetches the referenced record blob.
    pub async fn fetch_leaf(&self, manifest_cid: Cid, leaf_index: u64) -> Result<Bytes, EngineError> {
        let (_, roots) = self.manifest(manifest_cid).await?;
        let root_indices: Vec<u64> = roots.iter().map(|r| r.index).collect();
        let path = resolve_path(leaf_index, &root_indices)?;
        self.fetch_record_at(manifest_cid, &path).await
    }

    /// Fetch record number `n` (the record stored at leaf `2n`).
    pub async fn fetch_record(&self, manifest_cid: Cid, n: u64) -> Result<Bytes, EngineError> {
        self.fetch_leaf(manifest_cid, flat::leaf_index(n)).await
    }

    /// Read `len` bytes starting at `offset` in the logical data stream,
    /// crossing leaf boundaries as needed.
    pub async fn read_at(
        &self,
        manifest_cid: Cid,
        offset: u64,
        len: usize,
    ) -> Result<Bytes, EngineError> {
        let mut out = Vec::with_capacity(len);
        let mut position = offset;
        while out.len() < len {
            let located = self.locate(manifest_cid, position).await?;
            let mut record = self.fetch_record_at(manifest_cid, &located.path).await?;
            let mut within = (position - located.leaf_start) as usize;
            if within == record.len() {
                // An exact-start hit can land on an empty leaf; the byte at
                // `position` lives in the first non-empty leaf to the right.
                record = self
                    .next_nonempty_record(manifest_cid, located.leaf_index)
                    .await?;
                within = 0;
            }
            let take = (len - out.len()).min(record.len() - within);
            out.extend_from_slice(&record[within..within + take]);
            position += take as u64;
        }
        Ok(Bytes::from(out))
    }

    /// Locate the leaf containing `offset`, returning its index, logical
    /// start offset, and root-relative path.
    async fn locate(&self, manifest_cid: Cid, offset: u64) -> Result<Located, EngineError> {
        let (_, roots) = self.manifest(manifest_cid).await?;
        let total: u64 = roots.iter().map(|r| r.size).sum();
        if offset >= total {
            return Err(EngineError::OffsetOutOfRange { offset, total });
        }

        // Find the root whose [start, start + size) interval contains the
        // offset. Guaranteed to exist after the range check above.
        let mut root_start = 0u64;
        let mut chosen = 0usize;
        for (ordinal, root) in roots.iter().enumerate() {
            if offset < root_start + root.size {
                chosen = ordinal;
                break;
            }
            root_start += root.size;
        }
        let root = &roots[chosen];

        if offset == root_start {
            // Exactly at the root's first byte: the leftmost leaf, no
            // fetches needed.
            let depth = flat::depth(root.index);
            let path = TreePath {
                root_ordinal: chosen,
                directions: vec![Direction::Left; depth as usize],
            };
            return Ok(Located {
                leaf_index: flat::left_span(root.index),
                leaf_start: root_start,
                path,
            });
        }

        // Binary descent: compare the remaining offset against the left
        // child's cumulative size at each level.
        let mut remaining = offset - root_start;
        let mut current = root.index;
        let mut path = TreePath::root(chosen);
        while let Some((left, right)) = flat::children(current) {
            let left_path = path.child(Direction::Left);
            let encoded = self.dag.get_by_path(manifest_cid, &left_path).await?;
            let left_size = DagNode::decode(&encoded)?.size();
            trace!(node = current, remaining, left_size, "descending");
            if remaining < left_size {
                current = left;
                path = left_path;
            } else {
                remaining -= left_size;
                current = right;
                path = path.child(Direction::Right);
            }
        }

        Ok(Located {
            leaf_index: current,
            leaf_start: offset - remaining,
            path,
        })
    }

    /// First non-empty record in a leaf strictly to the right of
    /// `leaf_index`. The caller guarantees one exists (the located offset
    /// is below the total size).
    async fn next_nonempty_record(
        &self,
        manifest_cid: Cid,
        leaf_index: u64,
    ) -> Result<Bytes, EngineError> {
        let (_, roots) = self.manifest(manifest_cid).await?;
        let root_indices: Vec<u64> = roots.iter().map(|r| r.index).collect();
        let mut leaf = leaf_index;
        loop {
            leaf += 2;
            let path = resolve_path(leaf, &root_indices)?;
            let record = self.fetch_record_at(manifest_cid, &path).await?;
            if !record.is_empty() {
                return Ok(record);
            }
        }
    }

    /// Fetch the record blob referenced by the leaf at `path`.
    async fn fetch_record_at(
        &self,
        manifest_cid: Cid,
        path: &TreePath,
    ) -> Result<Bytes, EngineError> {
        let encoded = self.dag.get_by_path(manifest_cid, path).await?;
        let record_cid = match DagNode::decode(&encoded)? {
            DagNode::Leaf { record, .. } => record,
            _ => {
                return Err(EngineError::UnexpectedShape(format!(
                    "{path} does not name a leaf"
                )))
            }
        };
        self.records
            .get_record(record_cid)
            .await?
            .ok_or_else(|| StoreError::NotFound(record_cid).into())
    }
}
