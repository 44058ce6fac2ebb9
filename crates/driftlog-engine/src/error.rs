//! Error types for the engine.

/// Errors that can occur in the accounting, export, and read pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A node was queried before it was finalized — a caller ordering bug.
    #[error("node not finalized: index {0}")]
    NotFound(u64),

    /// A manifest was requested while a required root still has no content
    /// identifier. Caller ordering error; never retried internally.
    #[error("root {0} has no content identifier yet")]
    DependencyUnresolved(u64),

    /// Path resolution walked past any plausible depth without reaching a
    /// root — the index is outside the committed tree or the root set is
    /// stale.
    #[error("index {0} not reachable from the given root set")]
    IndexNotInTree(u64),

    /// A read was requested past the end of the logical data stream.
    #[error("offset {offset} out of range (log holds {total} bytes)")]
    OffsetOutOfRange {
        /// The requested byte offset.
        offset: u64,
        /// Total bytes committed across all roots.
        total: u64,
    },

    /// A fetched node had a different shape than the traversal expected.
    #[error("unexpected node shape: {0}")]
    UnexpectedShape(String),

    /// Flat-tree arithmetic error.
    #[error("flat-tree error: {0}")]
    FlatTree(#[from] driftlog_flattree::FlatTreeError),

    /// Store failure, propagated unchanged.
    #[error("store error: {0}")]
    Store(#[from] driftlog_store::StoreError),

    /// Node encoding/decoding error.
    #[error("codec error: {0}")]
    Codec(String),
}

impl From<postcard::Error> for EngineError {
    fn from(e: postcard::Error) -> Self {
        Self::Codec(e.to_string())
    }
}
