//! DAG export: finalized tree nodes become immutable content-addressed
//! nodes, in dependency order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use driftlog_flattree as flat;
use driftlog_store::DagStore;
use driftlog_types::{Cid, DagNode, RootEntry, TreeNode};
use tracing::{debug, trace};

use crate::error::EngineError;

/// Converts accounting finalizations into DAG nodes in an external store.
///
/// Leaves are emitted immediately. An internal node's encoding references
/// both children's content identifiers, which may not exist yet when the
/// finalization arrives (store puts complete in any order); such nodes wait
/// in the pending set until [`reconcile_pending`](Self::reconcile_pending)
/// resolves them. The pending set is empty at rest.
pub struct DagExporter {
    dag: Arc<dyn DagStore>,
    /// Assigned identifiers and sizes per exported node index.
    cids: RwLock<HashMap<u64, (Cid, u64)>>,
    /// Internal nodes finalized in accounting but awaiting child CIDs.
    pending: Mutex<HashMap<u64, TreeNode>>,
}

impl DagExporter {
    /// Create an exporter writing to `dag`.
    pub fn new(dag: Arc<dyn DagStore>) -> Self {
        Self {
            dag,
            cids: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Export a finalized leaf.
    ///
    /// `record_cid` is the identifier of the raw record blob, assigned by
    /// the record store collaborator — the exporter never hashes record
    /// payloads itself.
    pub async fn on_leaf_finalized(
        &self,
        leaf_index: u64,
        leaf: TreeNode,
        record_cid: Cid,
    ) -> Result<Cid, EngineError> {
        let encoded = DagNode::Leaf {
            size: leaf.size,
            record: record_cid,
        }
        .encode()?;
        let cid = self.dag.put_node(Bytes::from(encoded)).await?;
        self.cids
            .write()
            .expect("lock poisoned")
            .insert(leaf_index, (cid, leaf.size));
        trace!(leaf_index, %cid, "exported leaf node");
        Ok(cid)
    }

    /// Export a finalized internal node, deferring it if either child's
    /// identifier is not yet known.
    ///
    /// Returns the assigned identifier when resolved immediately.
    pub async fn on_internal_finalized(
        &self,
        index: u64,
        node: TreeNode,
    ) -> Result<Option<Cid>, EngineError> {
        if let Some((left_cid, right_cid)) = self.child_cids(index) {
            let cid = self.put_branch(index, node, left_cid, right_cid).await?;
            return Ok(Some(cid));
        }
        self.pending
            .lock()
            .expect("lock poisoned")
            .insert(index, node);
        debug!(index, "deferred internal node awaiting child identifiers");
        Ok(None)
    }

    /// Drain the pending set to a fixed point.
    ///
    /// Resolving one node can unblock its own parent, so a single pass is
    /// not enough; passes repeat until none makes progress. Safe to call
    /// repeatedly: with no new identifiers available this is a no-op.
    /// Terminates because every resolution strictly shrinks the set.
    pub async fn reconcile_pending(&self) -> Result<usize, EngineError> {
        let mut resolved = 0;
        loop {
            let ready: Vec<(u64, TreeNode, Cid, Cid)> = {
                let pending = self.pending.lock().expect("lock poisoned");
                pending
                    .iter()
                    .filter_map(|(&index, &node)| {
                        self.child_cids(index)
                            .map(|(left, right)| (index, node, left, right))
                    })
                    .collect()
            };
            if ready.is_empty() {
                break;
            }
            for (index, node, left_cid, right_cid) in ready {
                self.put_branch(index, node, left_cid, right_cid).await?;
                self.pending.lock().expect("lock poisoned").remove(&index);
                resolved += 1;
            }
        }
        if resolved > 0 {
            debug!(resolved, "reconciled pending internal nodes");
        }
        Ok(resolved)
    }

    /// Build and store the manifest for `length` committed records.
    ///
    /// Every root of `full_roots(length)` must already have an identifier;
    /// a missing one is a caller ordering error
    /// ([`EngineError::DependencyUnresolved`]), never silently retried.
    pub async fn emit_manifest(&self, length: u64) -> Result<Cid, EngineError> {
        let roots = {
            let cids = self.cids.read().expect("lock poisoned");
            flat::full_roots(length)?
                .into_iter()
                .map(|index| {
                    cids.get(&index)
                        .map(|&(cid, size)| RootEntry { index, cid, size })
                        .ok_or(EngineError::DependencyUnresolved(index))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let encoded = DagNode::Manifest { length, roots }.encode()?;
        let cid = self.dag.put_node(Bytes::from(encoded)).await?;
        debug!(%cid, length, "emitted manifest");
        Ok(cid)
    }

    /// The identifier assigned to a node index, if exported.
    pub fn cid_of(&self, index: u64) -> Option<Cid> {
        self.cids
            .read()
            .expect("lock poisoned")
            .get(&index)
            .map(|&(cid, _)| cid)
    }

    /// Number of internal nodes still awaiting child identifiers.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("lock poisoned").len()
    }

    /// Both children's identifiers, if both are known.
    fn child_cids(&self, index: u64) -> Option<(Cid, Cid)> {
        let (left, right) = flat::children(index)?;
        let cids = self.cids.read().expect("lock poisoned");
        let &(left_cid, _) = cids.get(&left)?;
        let &(right_cid, _) = cids.get(&right)?;
        Some((left_cid, right_cid))
    }

    /// Encode and store one branch node, recording its identifier.
    async fn put_branch(
        &self,
        index: u64,
        node: TreeNode,
        left: Cid,
        right: Cid,
    ) -> Result<Cid, EngineError> {
        let encoded = DagNode::Branch {
            size: node.size,
            hash: node.hash,
            left,
            right,
        }
        .encode()?;
        let cid = self.dag.put_node(Bytes::from(encoded)).await?;
        self.cids
            .write()
            .expect("lock poisoned")
            .insert(index, (cid, node.size));
        trace!(index, %cid, "exported internal node");
        Ok(cid)
    }
}
