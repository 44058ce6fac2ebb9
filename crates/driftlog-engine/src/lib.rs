//! The driftlog core pipeline.
//!
//! Records are appended to the [`MerkleLog`] accounting structure, which
//! finalizes tree nodes bottom-up; the [`DagExporter`] turns finalizations
//! into immutable content-addressed DAG nodes (deferring parents whose
//! child identifiers have not arrived yet) and emits a manifest per
//! committed length. The [`LogReader`] reconstructs access from a manifest
//! identifier alone: path resolution, offset-to-leaf resolution, and leaf
//! fetch, one node at a time.
//!
//! The [`Log`] facade wires the write side together for single-writer use.

pub mod accounting;
pub mod error;
pub mod export;
pub mod log;
pub mod path;
pub mod reader;

pub use accounting::{Appended, Finalized, MerkleLog};
pub use error::EngineError;
pub use export::DagExporter;
pub use log::Log;
pub use path::resolve_path;
pub use reader::LogReader;
