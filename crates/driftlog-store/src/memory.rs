//! In-memory store backends.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use driftlog_types::{Cid, Codec, HashAlgorithm};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::{DagStore, RecordStore};

/// In-memory record blob store backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for single-process replication runs. The CID
/// digest algorithm is a constructor parameter, not a constant.
pub struct MemoryRecordStore {
    records: RwLock<HashMap<Cid, Bytes>>,
    alg: HashAlgorithm,
}

impl MemoryRecordStore {
    /// Create a record store deriving identifiers with `alg`.
    pub fn new(alg: HashAlgorithm) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            alg,
        }
    }

    /// Number of distinct records stored.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new(HashAlgorithm::Blake3)
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put_record(&self, data: Bytes) -> Result<Cid, StoreError> {
        let cid = Cid::from_data(self.alg, Codec::Raw, &data);
        let mut map = self.records.write().expect("lock poisoned");
        debug!(%cid, size = data.len(), "storing record blob in memory");
        map.insert(cid, data);
        Ok(cid)
    }

    async fn get_record(&self, cid: Cid) -> Result<Option<Bytes>, StoreError> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.get(&cid).cloned())
    }
}

/// In-memory DAG node store backed by a `RwLock<HashMap>`.
pub struct MemoryDagStore {
    nodes: RwLock<HashMap<Cid, Bytes>>,
    alg: HashAlgorithm,
}

impl MemoryDagStore {
    /// Create a DAG store deriving identifiers with `alg`.
    pub fn new(alg: HashAlgorithm) -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            alg,
        }
    }

    /// Number of distinct nodes stored.
    pub fn len(&self) -> usize {
        self.nodes.read().expect("lock poisoned").len()
    }

    /// `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryDagStore {
    fn default() -> Self {
        Self::new(HashAlgorithm::Blake3)
    }
}

#[async_trait::async_trait]
impl DagStore for MemoryDagStore {
    async fn put_node(&self, encoded: Bytes) -> Result<Cid, StoreError> {
        let cid = Cid::from_data(self.alg, Codec::Node, &encoded);
        let mut map = self.nodes.write().expect("lock poisoned");
        debug!(%cid, size = encoded.len(), "storing dag node in memory");
        map.insert(cid, encoded);
        Ok(cid)
    }

    async fn get_node(&self, cid: Cid) -> Result<Option<Bytes>, StoreError> {
        let map = self.nodes.read().expect("lock poisoned");
        Ok(map.get(&cid).cloned())
    }

    async fn contains(&self, cid: Cid) -> Result<bool, StoreError> {
        let map = self.nodes.read().expect("lock poisoned");
        Ok(map.contains_key(&cid))
    }
}
