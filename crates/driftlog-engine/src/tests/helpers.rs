//! Shared fixtures for engine tests.

use std::sync::Arc;

use bytes::Bytes;
use driftlog_store::{MemoryDagStore, MemoryRecordStore};
use driftlog_types::{Blake3Hasher, HashAlgorithm, NodeHasher};

use crate::{Log, LogReader};

/// A log, a reader over the same stores, and handles to the stores.
pub struct Fixture {
    pub log: Log,
    pub reader: LogReader,
    pub dag: Arc<MemoryDagStore>,
    pub records: Arc<MemoryRecordStore>,
}

/// Default fixture: BLAKE3 tree hashing and BLAKE3 content addressing.
pub fn fixture() -> Fixture {
    fixture_with(Arc::new(Blake3Hasher), HashAlgorithm::Blake3)
}

/// Fixture with an explicit hasher and CID algorithm.
pub fn fixture_with(hasher: Arc<dyn NodeHasher>, alg: HashAlgorithm) -> Fixture {
    let dag = Arc::new(MemoryDagStore::new(alg));
    let records = Arc::new(MemoryRecordStore::new(alg));
    let log = Log::new(hasher, dag.clone(), records.clone());
    let reader = LogReader::new(dag.clone(), records.clone());
    Fixture {
        log,
        reader,
        dag,
        records,
    }
}

/// Append each record in order, asserting assigned leaf indices 0, 2, 4...
pub async fn append_all(log: &Log, records: &[&[u8]]) {
    for (n, record) in records.iter().enumerate() {
        let leaf = log.append(Bytes::copy_from_slice(record)).await.unwrap();
        assert_eq!(leaf, 2 * n as u64);
    }
}

/// Deterministic, non-repeating test data.
pub fn test_data(size: usize, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}
