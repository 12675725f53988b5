//! Golden tests for the version lifecycle engine.
//!
//! These tests verify the three-version rotation: promotion, rollback,
//! atomicity under guard failure, and dependency-ordered erasure.

mod common;

use common::{fixture, fixture_with_examples, PROJECT};
use dialogue_kernel::erase::erase_version_graph;
use dialogue_kernel::export::{build_domain, build_rules, build_stories};
use dialogue_kernel::replicate::clone_version_graph;
use dialogue_kernel::store::{ConfigStore, StoreError};
use dialogue_kernel::types::{VersionRow, VersionStatus};
use dialogue_kernel::{canonical_hash_hex, KernelError};

// ─────────────────────────────────────────────────────────────────────────────
// Promotion
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_promote_rotates_statuses_and_labels() {
    let fx = fixture().await;

    let outcome = fx.orchestrator.promote(PROJECT).await.unwrap();
    assert_eq!(outcome.production_label, "v1");
    assert_eq!(outcome.new_draft_label, "v2");

    let production = fx
        .registry
        .version(PROJECT, VersionStatus::Locked)
        .await
        .unwrap();
    let draft = fx
        .registry
        .version(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();
    let archived = fx
        .registry
        .version(PROJECT, VersionStatus::Archived)
        .await
        .unwrap();

    assert_eq!(production.label, "v1");
    assert_eq!(draft.label, "v2");
    assert_eq!(archived.label, "v0");
    assert_eq!(draft.parent_version_id, Some(production.id));

    // Exactly one version per status, three versions total.
    let versions = fx.registry.list_versions(PROJECT).await.unwrap();
    assert_eq!(versions.len(), 3);
}

#[tokio::test]
async fn test_promote_publishes_draft_graph() {
    let fx = fixture().await;

    let before = fx
        .exporter
        .domain(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    fx.orchestrator.promote(PROJECT).await.unwrap();

    let after = fx
        .exporter
        .domain(PROJECT, VersionStatus::Locked)
        .await
        .unwrap();
    assert_eq!(canonical_hash_hex(&before), canonical_hash_hex(&after));

    // The new draft is a clone of the published production.
    let draft = fx
        .exporter
        .domain(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();
    assert_eq!(canonical_hash_hex(&before), canonical_hash_hex(&draft));
}

#[tokio::test]
async fn test_promote_guard_failure_leaves_state_intact() {
    let fx = fixture_with_examples(9).await;

    let versions_before = fx.registry.list_versions(PROJECT).await.unwrap();
    let mut tx = fx.store.begin().await.unwrap();
    let counts_before = tx.graph_row_counts(&fx.draft.id).await.unwrap();
    drop(tx);

    let err = fx.orchestrator.promote(PROJECT).await.unwrap_err();
    assert!(matches!(err, KernelError::ValidationFailed(_)));
    assert!(err.to_string().contains("goodbye"));

    let versions_after = fx.registry.list_versions(PROJECT).await.unwrap();
    assert_eq!(versions_before, versions_after);

    let mut tx = fx.store.begin().await.unwrap();
    let counts_after = tx.graph_row_counts(&fx.draft.id).await.unwrap();
    assert_eq!(counts_before, counts_after);
}

#[tokio::test]
async fn test_promote_without_languages_fails_validation() {
    let fx = fixture().await;

    // A second project whose draft graph is empty.
    fx.registry.create_project("beta", "Beta Bot").await.unwrap();
    let err = fx.orchestrator.promote("beta").await.unwrap_err();
    assert!(matches!(err, KernelError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_promote_unknown_project_not_found() {
    let fx = fixture().await;
    let err = fx.orchestrator.promote("ghost").await.unwrap_err();
    assert!(matches!(err, KernelError::NotFound(_)));
}

#[tokio::test]
async fn test_second_promotion_discards_oldest_archive() {
    let fx = fixture().await;

    fx.orchestrator.promote(PROJECT).await.unwrap();
    let outcome = fx.orchestrator.promote(PROJECT).await.unwrap();
    assert_eq!(outcome.production_label, "v2");
    assert_eq!(outcome.new_draft_label, "v3");

    // Only one archived generation is retained: the previous production.
    let archived = fx
        .registry
        .version(PROJECT, VersionStatus::Archived)
        .await
        .unwrap();
    assert_eq!(archived.label, "v1");

    let versions = fx.registry.list_versions(PROJECT).await.unwrap();
    assert_eq!(versions.len(), 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Rollback
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rollback_restores_pre_promotion_production() {
    let fx = fixture().await;

    let production_before = fx
        .exporter
        .domain(PROJECT, VersionStatus::Locked)
        .await
        .unwrap();

    fx.orchestrator.promote(PROJECT).await.unwrap();
    let outcome = fx.orchestrator.rollback(PROJECT).await.unwrap();
    assert_eq!(outcome.production_label, "v0");

    let production_after = fx
        .exporter
        .domain(PROJECT, VersionStatus::Locked)
        .await
        .unwrap();
    assert_eq!(
        canonical_hash_hex(&production_before),
        canonical_hash_hex(&production_after)
    );

    // The archive was consumed; draft v2 remains.
    assert!(matches!(
        fx.registry
            .version(PROJECT, VersionStatus::Archived)
            .await
            .unwrap_err(),
        KernelError::NotFound(_)
    ));
    let draft = fx
        .registry
        .version(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();
    assert_eq!(draft.label, "v2");
}

#[tokio::test]
async fn test_second_rollback_conflicts() {
    let fx = fixture().await;

    fx.orchestrator.promote(PROJECT).await.unwrap();
    fx.orchestrator.rollback(PROJECT).await.unwrap();

    let err = fx.orchestrator.rollback(PROJECT).await.unwrap_err();
    assert!(matches!(err, KernelError::Conflict(_)));
}

#[tokio::test]
async fn test_rollback_without_promotion_conflicts() {
    let fx = fixture().await;
    let err = fx.orchestrator.rollback(PROJECT).await.unwrap_err();
    assert!(matches!(err, KernelError::Conflict(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Erasure
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_erase_removes_every_table() {
    let fx = fixture().await;

    let mut tx = fx.store.begin().await.unwrap();
    let before = tx.graph_row_counts(&fx.draft.id).await.unwrap();
    assert!(before.values().sum::<usize>() > 30);

    let removed = erase_version_graph(tx.as_mut(), &fx.draft.id).await.unwrap();
    assert_eq!(removed, before.values().sum::<usize>());

    let after = tx.graph_row_counts(&fx.draft.id).await.unwrap();
    for (table, count) in after {
        assert_eq!(count, 0, "table {table} still has rows");
    }
}

#[tokio::test]
async fn test_out_of_order_erase_is_rejected() {
    let fx = fixture().await;
    let mut tx = fx.store.begin().await.unwrap();

    // Entities are still referenced by regexes, lookups, synonyms, and
    // mappings; deleting them first must fail, not cascade.
    let err = tx.delete_entities(&fx.draft.id).await.unwrap_err();
    assert!(matches!(err, StoreError::ReferentialIntegrity(_)));

    // Same for responses while steps still reference them.
    let err = tx.delete_responses(&fx.draft.id).await.unwrap_err();
    assert!(matches!(err, StoreError::ReferentialIntegrity(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Replication round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_replicate_round_trip_exports_identically() {
    let fx = fixture().await;
    let mut tx = fx.store.begin().await.unwrap();

    let project = tx.project_by_code(PROJECT).await.unwrap().unwrap();
    let target = VersionRow::new(project.id, "copy", VersionStatus::Archived);
    tx.insert_version(&target).await.unwrap();

    clone_version_graph(tx.as_mut(), &fx.draft.id, &target.id)
        .await
        .unwrap();

    let source_graph = tx.load_graph(&fx.draft.id).await.unwrap();
    let target_graph = tx.load_graph(&target.id).await.unwrap();
    assert_eq!(source_graph.row_counts(), target_graph.row_counts());

    // Documents reference only names, so identifier changes are invisible.
    assert_eq!(
        canonical_hash_hex(&build_domain(&source_graph)),
        canonical_hash_hex(&build_domain(&target_graph))
    );
    assert_eq!(
        canonical_hash_hex(&build_stories(&source_graph)),
        canonical_hash_hex(&build_stories(&target_graph))
    );
    assert_eq!(
        canonical_hash_hex(&build_rules(&source_graph)),
        canonical_hash_hex(&build_rules(&target_graph))
    );
}
