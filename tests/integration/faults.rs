//! Integration test: store faults during export.
//!
//! Injects `put_node` failures and verifies the exporter's recovery
//! contract: a failed put leaves the node in the pending set, and a
//! later reconciliation completes it without losing or duplicating
//! anything.

use std::sync::Arc;

use driftlog_engine::{DagExporter, EngineError, MerkleLog};
use driftlog_integration_tests::FlakyDagStore;
use driftlog_store::{DagStore, StoreError};
use driftlog_types::{Blake3Hasher, Cid, Codec, HashAlgorithm};

fn record_cid(payload: &[u8]) -> Cid {
    Cid::from_data(HashAlgorithm::Blake3, Codec::Raw, payload)
}

/// Accounting for `payloads` records, delivered to the exporter with all
/// internal finalizations deferred (leaves withheld until after).
async fn feed_internals_first(
    exporter: &DagExporter,
    payloads: &[&[u8]],
) -> Result<(), EngineError> {
    let mut merkle = MerkleLog::new(Arc::new(Blake3Hasher));
    let mut leaves = Vec::new();
    let mut internals = Vec::new();
    for payload in payloads {
        let appended = merkle.append(payload);
        leaves.push((appended.leaf_index, appended.leaf, record_cid(payload)));
        internals.extend(appended.internals);
    }
    for finalized in &internals {
        exporter
            .on_internal_finalized(finalized.index, finalized.node)
            .await?;
    }
    for (leaf_index, node, cid) in leaves {
        exporter.on_leaf_finalized(leaf_index, node, cid).await?;
    }
    Ok(())
}

/// A put failure during reconciliation surfaces as an error, keeps the
/// node pending, and a retry completes it.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_failed_reconcile_retries_cleanly() {
    let dag = Arc::new(FlakyDagStore::new());
    let exporter = DagExporter::new(dag.clone());

    feed_internals_first(&exporter, &[b"record a", b"record b"])
        .await
        .unwrap();
    assert_eq!(exporter.pending_len(), 1);

    dag.fail_next_puts(1);
    let err = exporter.reconcile_pending().await.unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Backend(_))));
    assert_eq!(exporter.pending_len(), 1, "failed node must stay pending");
    assert!(exporter.cid_of(1).is_none());

    assert_eq!(exporter.reconcile_pending().await.unwrap(), 1);
    assert_eq!(exporter.pending_len(), 0);
    assert!(exporter.cid_of(1).is_some());
}

/// A failure partway up a three-level cascade loses nothing: the retry
/// resolves the remaining nodes and the manifest comes out complete.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_partial_cascade_failure_then_manifest() {
    let dag = Arc::new(FlakyDagStore::new());
    let exporter = DagExporter::new(dag.clone());

    feed_internals_first(
        &exporter,
        &[b"record a", b"record b", b"record c", b"record d"],
    )
    .await
    .unwrap();
    assert_eq!(exporter.pending_len(), 3);

    // First put of the reconciliation fails; some progress may already
    // be impossible this round, but nothing is dropped.
    dag.fail_next_puts(1);
    exporter.reconcile_pending().await.unwrap_err();
    assert!(exporter.pending_len() >= 1);

    exporter.reconcile_pending().await.unwrap();
    assert_eq!(exporter.pending_len(), 0);

    let manifest = exporter.emit_manifest(4).await.unwrap();
    assert!(dag.contains(manifest).await.unwrap());
}

/// Manifest emission failures are retryable and converge on the same
/// identifier a fault-free writer produces.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_manifest_emission_retry_is_deterministic() {
    let dag = Arc::new(FlakyDagStore::new());
    let exporter = DagExporter::new(dag.clone());
    feed_internals_first(&exporter, &[b"record a", b"record b", b"record c"])
        .await
        .unwrap();
    exporter.reconcile_pending().await.unwrap();

    dag.fail_next_puts(1);
    let err = exporter.emit_manifest(3).await.unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Backend(_))));

    let manifest = exporter.emit_manifest(3).await.unwrap();

    let clean_dag = Arc::new(FlakyDagStore::new());
    let clean = DagExporter::new(clean_dag);
    feed_internals_first(&clean, &[b"record a", b"record b", b"record c"])
        .await
        .unwrap();
    clean.reconcile_pending().await.unwrap();
    assert_eq!(clean.emit_manifest(3).await.unwrap(), manifest);
}

/// Duplicate finalization deliveries are harmless: the content-addressed
/// store deduplicates and the assigned identifier never changes.
#[tokio::test]
#[ntest::timeout(10000)]
async fn test_duplicate_finalization_is_idempotent() {
    let dag = Arc::new(FlakyDagStore::new());
    let exporter = DagExporter::new(dag);

    let mut merkle = MerkleLog::new(Arc::new(Blake3Hasher));
    let first = merkle.append(b"record a");
    let second = merkle.append(b"record b");
    let finalized = second.internals[0];

    exporter
        .on_leaf_finalized(first.leaf_index, first.leaf, record_cid(b"record a"))
        .await
        .unwrap();
    exporter
        .on_leaf_finalized(second.leaf_index, second.leaf, record_cid(b"record b"))
        .await
        .unwrap();

    let once = exporter
        .on_internal_finalized(finalized.index, finalized.node)
        .await
        .unwrap();
    let twice = exporter
        .on_internal_finalized(finalized.index, finalized.node)
        .await
        .unwrap();
    assert_eq!(once, twice);
    assert_eq!(exporter.pending_len(), 0);
}
