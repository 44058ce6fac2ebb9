//! Error types for store operations.

use driftlog_types::Cid;

/// Errors that can occur during record or DAG node storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested content was not found.
    #[error("content not found: {0}")]
    NotFound(Cid),

    /// Stored bytes could not be decoded as a DAG node.
    #[error("node decode error: {0}")]
    Codec(String),

    /// A path step asked for a link the current node shape does not have
    /// (e.g. descending into a leaf, or a root ordinal past the manifest's
    /// root sequence).
    #[error("no such link at path step: {0}")]
    UnresolvedLink(String),

    /// Backend failure (I/O, transport) from a non-memory implementation.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<postcard::Error> for StoreError {
    fn from(e: postcard::Error) -> Self {
        Self::Codec(e.to_string())
    }
}
