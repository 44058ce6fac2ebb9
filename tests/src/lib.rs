//! Shared test harness for driftlog integration tests.
//!
//! Provides [`TestLog`] — a writer and reader over shared in-memory
//! stores that exercises the full pipeline: append → Merkle accounting
//! → DAG export → manifest → path walking → offset resolution → read.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use driftlog_engine::{Log, LogReader};
use driftlog_store::{DagStore, MemoryDagStore, MemoryRecordStore, StoreError};
use driftlog_types::{Blake3Hasher, Cid, HashAlgorithm, NodeHasher};

// =========================================================================
// Flaky store
// =========================================================================

/// DAG store wrapper that fails the next `fail_puts` write operations.
///
/// Reads always succeed. Used to verify that export stays re-entrant:
/// a failed put leaves the node pending and a later reconciliation
/// completes it.
pub struct FlakyDagStore {
    inner: MemoryDagStore,
    fail_puts: AtomicU32,
}

impl FlakyDagStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryDagStore::default(),
            fail_puts: AtomicU32::new(0),
        }
    }

    /// Make the next `n` `put_node` calls fail.
    pub fn fail_next_puts(&self, n: u32) {
        self.fail_puts.store(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.fail_puts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Default for FlakyDagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DagStore for FlakyDagStore {
    async fn put_node(&self, encoded: Bytes) -> Result<Cid, StoreError> {
        if self.take_failure() {
            return Err(StoreError::Backend("injected put failure".into()));
        }
        self.inner.put_node(encoded).await
    }

    async fn get_node(&self, cid: Cid) -> Result<Option<Bytes>, StoreError> {
        self.inner.get_node(cid).await
    }

    async fn contains(&self, cid: Cid) -> Result<bool, StoreError> {
        self.inner.contains(cid).await
    }
}

// =========================================================================
// TestLog
// =========================================================================

/// A writer, a reader, and the stores they share.
pub struct TestLog {
    pub log: Log,
    pub reader: LogReader,
    pub dag: Arc<MemoryDagStore>,
    pub records: Arc<MemoryRecordStore>,
}

impl TestLog {
    /// Default setup: BLAKE3 tree hashing and BLAKE3 content addressing.
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(Blake3Hasher), HashAlgorithm::Blake3)
    }

    pub fn with_hasher(hasher: Arc<dyn NodeHasher>, alg: HashAlgorithm) -> Self {
        let dag = Arc::new(MemoryDagStore::new(alg));
        let records = Arc::new(MemoryRecordStore::new(alg));
        let log = Log::new(hasher, dag.clone(), records.clone());
        let reader = LogReader::new(dag.clone(), records.clone());
        Self {
            log,
            reader,
            dag,
            records,
        }
    }

    /// Append every record in order, returning assigned leaf indices.
    pub async fn append_all(&self, records: &[Vec<u8>]) -> Vec<u64> {
        let mut leaves = Vec::with_capacity(records.len());
        for record in records {
            let leaf = self
                .log
                .append(Bytes::copy_from_slice(record))
                .await
                .unwrap();
            leaves.push(leaf);
        }
        leaves
    }

    /// A second, independent reader over the same stores — models a
    /// consumer that holds only a manifest identifier.
    pub fn restore_reader(&self) -> LogReader {
        LogReader::new(self.dag.clone(), self.records.clone())
    }
}

impl Default for TestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    test_data_seeded(size, 0xDEAD_BEEF)
}

/// Generate test data with a specific seed (for unique records).
pub fn test_data_seeded(size: usize, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = seed;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}
