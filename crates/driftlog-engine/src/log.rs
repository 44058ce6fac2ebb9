//! The write-side facade: append-only log plus DAG export.

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use driftlog_store::{DagStore, RecordStore};
use driftlog_types::{Cid, NodeHasher, TreeNode};
use tracing::debug;

use crate::accounting::MerkleLog;
use crate::error::EngineError;
use crate::export::DagExporter;

/// Owns the accounting structure, exporter, and record store, and exposes
/// the log driver contracts: [`append`](Self::append) and
/// [`export_up_to`](Self::export_up_to).
///
/// Single logical writer: `length` advances monotonically and appends are
/// serialized through the internal lock. The store boundary is the only
/// asynchronous part; accounting finalization is synchronous.
pub struct Log {
    merkle: Mutex<MerkleLog>,
    exporter: DagExporter,
    records: Arc<dyn RecordStore>,
}

impl Log {
    /// Create an empty log writing DAG nodes to `dag` and record blobs to
    /// `records`, hashing tree nodes with `hasher`.
    pub fn new(
        hasher: Arc<dyn NodeHasher>,
        dag: Arc<dyn DagStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            merkle: Mutex::new(MerkleLog::new(hasher)),
            exporter: DagExporter::new(dag),
            records,
        }
    }

    /// Append one record. Returns the leaf index assigned to it.
    ///
    /// Content-addresses the record blob, updates accounting, exports the
    /// leaf and any internal nodes this append finalized, then reconciles
    /// the pending set to a fixed point.
    pub async fn append(&self, record: Bytes) -> Result<u64, EngineError> {
        let record_cid = self.records.put_record(record.clone()).await?;

        let appended = {
            let mut merkle = self.merkle.lock().expect("lock poisoned");
            merkle.append(&record)
        };

        self.exporter
            .on_leaf_finalized(appended.leaf_index, appended.leaf, record_cid)
            .await?;
        for finalized in &appended.internals {
            self.exporter
                .on_internal_finalized(finalized.index, finalized.node)
                .await?;
        }
        self.exporter.reconcile_pending().await?;

        debug!(
            leaf_index = appended.leaf_index,
            size = record.len(),
            "appended and exported record"
        );
        Ok(appended.leaf_index)
    }

    /// Emit a manifest snapshotting the log as of `length` records.
    ///
    /// Reconciles pending exports first; fails with
    /// [`EngineError::DependencyUnresolved`] if a required root still has
    /// no identifier after the fixed point.
    pub async fn export_up_to(&self, length: u64) -> Result<Cid, EngineError> {
        self.exporter.reconcile_pending().await?;
        self.exporter.emit_manifest(length).await
    }

    /// Number of records appended so far.
    pub fn length(&self) -> u64 {
        self.merkle.lock().expect("lock poisoned").length()
    }

    /// Accounting entries for the full roots at `length`.
    pub fn roots_at(&self, length: u64) -> Result<Vec<(u64, TreeNode)>, EngineError> {
        self.merkle.lock().expect("lock poisoned").roots_at(length)
    }

    /// Accounting entry for one node index.
    pub fn node(&self, index: u64) -> Result<TreeNode, EngineError> {
        self.merkle.lock().expect("lock poisoned").get(index)
    }

    /// Drop accounting entries that no future append can need. Optional
    /// resource bounding; reads go through the DAG, not accounting.
    pub fn prune_accounting(&self) -> usize {
        self.merkle
            .lock()
            .expect("lock poisoned")
            .prune_finalized_interiors()
    }

    /// The exporter, for drivers that manage export timing themselves.
    pub fn exporter(&self) -> &DagExporter {
        &self.exporter
    }
}
