//! Content-addressed store contracts consumed by the driftlog core.
//!
//! Two collaborator traits:
//! - [`RecordStore`] — content-addresses raw record payloads.
//! - [`DagStore`] — stores encoded DAG nodes and serves path-based fetch.
//!
//! Plus in-memory backends ([`MemoryRecordStore`], [`MemoryDagStore`]) used
//! by tests and single-process runs. Store failures propagate unchanged to
//! the caller; retry policy belongs to store implementations, never here.

mod error;
mod memory;
mod traits;

pub use error::StoreError;
pub use memory::{MemoryDagStore, MemoryRecordStore};
pub use traits::{DagStore, RecordStore};
