//! Golden tests for the dialogue exporters.

mod common;

use common::{fixture, row_id, Fixture, PROJECT};
use dialogue_kernel::export::{EntityAnnotation, NluBlock, StepExport};
use dialogue_kernel::store::ConfigStore;
use dialogue_kernel::types::{IntentRow, StepKind, StoryRow, StoryStepRow, VersionStatus};
use dialogue_kernel::{to_yaml, KernelError};

// ─────────────────────────────────────────────────────────────────────────────
// Domain document
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_domain_document_shape() {
    let fx = fixture().await;
    let domain = fx
        .exporter
        .domain(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    assert_eq!(domain.version, "3.1");
    assert_eq!(domain.intents, vec!["goodbye", "greet"]);
    assert_eq!(domain.actions, vec!["action_check_balance"]);

    let slot = &domain.slots["city"];
    assert_eq!(slot.mappings.len(), 2);
    // Highest priority first: the from_entity mapping with structured
    // conditions wins position 0.
    assert_eq!(slot.mappings[0].mapping_type, "from_entity");
    assert_eq!(slot.mappings[0].entity.as_deref(), Some("city"));
    assert_eq!(slot.mappings[0].role.as_deref(), Some("destination"));

    let form = &domain.forms["request_form"];
    assert_eq!(form.ignored_intents, vec!["chitchat"]);
    let (slot_name, mappings) = form.required_slots.get_index(0).unwrap();
    assert_eq!(slot_name, "city");
    assert_eq!(mappings[0].mapping_type, "from_entity");

    let session = domain.session_config.as_ref().unwrap();
    assert_eq!(session.session_expiration_time, 60);
    assert!(session.carry_over_slots_to_new_session);
}

#[tokio::test]
async fn test_domain_entity_roles_and_groups() {
    let fx = fixture().await;
    let domain = fx
        .exporter
        .domain(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    let yaml = to_yaml(&domain).unwrap();
    assert!(yaml.contains("departure"));
    assert!(yaml.contains("destination"));
    assert!(yaml.contains("location"));
}

#[tokio::test]
async fn test_domain_structured_conditions_beat_legacy_field() {
    let fx = fixture().await;
    let domain = fx
        .exporter
        .domain(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    let mappings = &domain.slots["city"].mappings;

    // Mapping 0 carries both a structured condition and a legacy
    // active_loop value; the structured list must win.
    assert_eq!(
        mappings[0].conditions,
        vec![serde_json::json!({ "active_loop": "request_form" })]
    );

    // Mapping 1 has only the legacy field, reconstructed into a one-entry
    // condition list.
    assert_eq!(
        mappings[1].conditions,
        vec![serde_json::json!({ "active_loop": "request_form" })]
    );
}

#[tokio::test]
async fn test_domain_variant_priority_and_component_merge() {
    let fx = fixture().await;
    let domain = fx
        .exporter
        .domain(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    let variants = &domain.responses["utter_greet"];
    assert_eq!(variants.len(), 2);

    // Priority 1 variant first, with condition and merged components.
    assert_eq!(variants[0].text.as_deref(), Some("Hello from Acme!"));
    assert!(variants[0].buttons.is_some());
    assert_eq!(variants[0].condition.len(), 1);

    assert_eq!(variants[1].text.as_deref(), Some("Hi!"));
    assert!(variants[1].buttons.is_none());
}

#[tokio::test]
async fn test_domain_empty_sections_omitted() {
    let fx = fixture().await;

    // Production (v0) was seeded empty.
    let domain = fx
        .exporter
        .domain(PROJECT, VersionStatus::Locked)
        .await
        .unwrap();
    let yaml = to_yaml(&domain).unwrap();

    assert!(yaml.contains("version:"));
    assert!(!yaml.contains("intents:"));
    assert!(!yaml.contains("slots:"));
    assert!(!yaml.contains("responses:"));
}

#[tokio::test]
async fn test_export_archived_status_rejected() {
    let fx = fixture().await;
    fx.orchestrator.promote(PROJECT).await.unwrap();

    let err = fx
        .exporter
        .domain(PROJECT, VersionStatus::Archived)
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::ValidationFailed(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Stories and rules
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_story_steps_and_alternation_folding() {
    let fx = fixture().await;
    let stories = fx
        .exporter
        .stories(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    assert_eq!(stories.stories.len(), 1);
    let steps = &stories.stories[0].steps;

    // intent, action, one folded or-block, action, slot_was_set, checkpoint.
    assert_eq!(steps.len(), 6);
    match &steps[0] {
        StepExport::Intent { intent, entities } => {
            assert_eq!(intent, "greet");
            assert_eq!(entities.len(), 1);
            assert!(matches!(entities[0], EntityAnnotation::Valued(_)));
        }
        other => panic!("expected intent step, got {other:?}"),
    }
    match &steps[1] {
        StepExport::Action { action } => assert_eq!(action, "utter_greet"),
        other => panic!("expected action step, got {other:?}"),
    }
    match &steps[2] {
        StepExport::Or { or } => {
            assert_eq!(or.len(), 2);
            assert!(matches!(&or[0], StepExport::Intent { intent, .. } if intent == "greet"));
            assert!(matches!(&or[1], StepExport::Intent { intent, .. } if intent == "goodbye"));
        }
        other => panic!("expected folded or block, got {other:?}"),
    }
    match &steps[4] {
        StepExport::SlotWasSet { slot_was_set } => {
            assert_eq!(slot_was_set.len(), 1);
            assert_eq!(
                slot_was_set[0].get("city"),
                Some(&Some("Delhi".to_string()))
            );
        }
        other => panic!("expected slot_was_set step, got {other:?}"),
    }
    match &steps[5] {
        StepExport::Checkpoint { checkpoint } => assert_eq!(checkpoint, "end_of_greeting"),
        other => panic!("expected checkpoint step, got {other:?}"),
    }

    // One or-block only: the group is not re-emitted for its second member.
    let or_blocks = steps
        .iter()
        .filter(|s| matches!(s, StepExport::Or { .. }))
        .count();
    assert_eq!(or_blocks, 1);
}

#[tokio::test]
async fn test_interleaved_alternation_group_folds_at_first_occurrence() {
    let fx = fixture().await;

    // A second project with group members interleaved among plain steps:
    // member, action, member. Folding must produce or-block then action.
    seed_interleaved_story(&fx).await;

    let stories = fx
        .exporter
        .stories("beta", VersionStatus::Draft)
        .await
        .unwrap();
    let steps = &stories.stories[0].steps;
    assert_eq!(steps.len(), 2);
    assert!(matches!(&steps[0], StepExport::Or { or } if or.len() == 2));
    assert!(matches!(&steps[1], StepExport::Action { .. }));
}

#[tokio::test]
async fn test_rules_document_conditions_and_steps() {
    let fx = fixture().await;
    let rules = fx
        .exporter
        .rules(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    assert_eq!(rules.rules.len(), 1);
    let rule = &rules.rules[0];
    assert_eq!(rule.rule, "greet rule");
    assert_eq!(rule.condition.len(), 1);

    let yaml = to_yaml(&rules).unwrap();
    assert!(yaml.contains("active_loop: request_form"));

    // Final step deactivates the loop: active_loop null.
    assert!(matches!(
        rule.steps.last().unwrap(),
        StepExport::ActiveLoop { active_loop: None }
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// NLU
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_nlu_document_blocks_in_order() {
    let fx = fixture().await;
    let nlu = fx
        .exporter
        .nlu(PROJECT, VersionStatus::Draft, "en")
        .await
        .unwrap();

    assert_eq!(nlu.version, "3.1");
    // Intents (sorted) first, then regex, lookup, synonym.
    assert!(matches!(&nlu.nlu[0], NluBlock::Intent { intent, .. } if intent == "goodbye"));
    assert!(matches!(&nlu.nlu[1], NluBlock::Intent { intent, .. } if intent == "greet"));
    assert!(matches!(&nlu.nlu[2], NluBlock::Regex { regex, .. } if regex == "zip_code"));
    assert!(matches!(&nlu.nlu[3], NluBlock::Lookup { lookup, .. } if lookup == "cities"));
    assert!(matches!(&nlu.nlu[4], NluBlock::Synonym { synonym, .. } if synonym == "Delhi"));

    match &nlu.nlu[3] {
        NluBlock::Lookup { examples, .. } => {
            assert_eq!(examples, "- Delhi\n- Mumbai");
        }
        other => panic!("expected lookup block, got {other:?}"),
    }
}

#[tokio::test]
async fn test_nlu_minimum_examples_gate() {
    let fx = common::fixture_with_examples(9).await;

    let err = fx
        .exporter
        .nlu(PROJECT, VersionStatus::Draft, "en")
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::ValidationFailed(_)));
    assert!(err.to_string().contains("only 9 examples"));

    let fx = common::fixture_with_examples(10).await;
    fx.exporter
        .nlu(PROJECT, VersionStatus::Draft, "en")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_nlu_skips_unlocalized_intents() {
    let fx = fixture().await;

    // Add an intent with no localization at all; export must skip it
    // rather than fail (the promotion guard is stricter, by design).
    let mut tx = fx.store.begin().await.unwrap();
    let mut graph = tx.load_graph(&fx.draft.id).await.unwrap();
    graph.intents.push(IntentRow {
        id: row_id(5000),
        version_id: fx.draft.id,
        name: "chitchat".to_string(),
    });
    erase_and_reseed(&fx, graph).await;

    let nlu = fx
        .exporter
        .nlu(PROJECT, VersionStatus::Draft, "en")
        .await
        .unwrap();
    assert!(!nlu
        .nlu
        .iter()
        .any(|b| matches!(b, NluBlock::Intent { intent, .. } if intent == "chitchat")));
}

#[tokio::test]
async fn test_nlu_disabled_language_fails_validation() {
    let fx = fixture().await;
    fx.registry.register_language("de", "German").await.unwrap();

    let err = fx
        .exporter
        .nlu(PROJECT, VersionStatus::Draft, "de")
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::ValidationFailed(_)));

    let err = fx
        .exporter
        .nlu(PROJECT, VersionStatus::Draft, "fr")
        .await
        .unwrap_err();
    assert!(matches!(err, KernelError::NotFound(_)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined export and bundle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_combined_export_contains_all_documents() {
    let fx = fixture().await;
    let combined = fx
        .exporter
        .combined(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    assert_eq!(combined.project_code, PROJECT);
    assert_eq!(combined.version_label, "v1");
    assert_eq!(combined.languages, vec!["en"]);
    assert!(combined.nlu.contains_key("en"));
    assert_eq!(combined.stories.stories.len(), 1);
    assert_eq!(combined.rules.rules.len(), 1);
}

#[tokio::test]
async fn test_bundle_files_and_manifest_determinism() {
    let fx = fixture().await;

    let bundle = fx
        .exporter
        .bundle(PROJECT, VersionStatus::Draft, true)
        .await
        .unwrap();

    for path in [
        "domain.yml",
        "data/stories.yml",
        "data/rules.yml",
        "data/nlu_en.yml",
        "config.yml",
        "endpoints.yml",
        "credentials.yml",
        "README.md",
    ] {
        assert!(bundle.files.contains_key(path), "missing {path}");
    }
    assert_eq!(bundle.archive_name(), "acme_v1_draft_export.zip");

    let again = fx
        .exporter
        .bundle(PROJECT, VersionStatus::Draft, true)
        .await
        .unwrap();
    assert_eq!(bundle.manifest.file_hashes, again.manifest.file_hashes);
    assert_eq!(bundle.manifest.bundle_id, again.manifest.bundle_id);
}

#[tokio::test]
async fn test_bundle_without_config_files() {
    let fx = fixture().await;
    let bundle = fx
        .exporter
        .bundle(PROJECT, VersionStatus::Draft, false)
        .await
        .unwrap();

    assert!(!bundle.files.contains_key("config.yml"));
    assert!(!bundle.files.contains_key("endpoints.yml"));
    assert!(bundle.files.contains_key("domain.yml"));
}

#[tokio::test]
async fn test_round_trip_bundle_hashes_after_promotion() {
    let fx = fixture().await;

    let draft_bundle = fx
        .exporter
        .bundle(PROJECT, VersionStatus::Draft, true)
        .await
        .unwrap();

    fx.orchestrator.promote(PROJECT).await.unwrap();

    let production_bundle = fx
        .exporter
        .bundle(PROJECT, VersionStatus::Locked, true)
        .await
        .unwrap();

    // Identifiers changed wholesale during replication; documents did not.
    // Only the readme differs (it names the version label and status).
    for (path, hash) in &draft_bundle.manifest.file_hashes {
        if path == "README.md" {
            continue;
        }
        assert_eq!(
            production_bundle.manifest.file_hashes.get(path),
            Some(hash),
            "file {path} changed across promotion"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Replace the draft graph of the fixture project with `graph`.
async fn erase_and_reseed(fx: &Fixture, graph: dialogue_kernel::VersionGraph) {
    let mut tx = fx.store.begin().await.unwrap();
    dialogue_kernel::erase_version_graph(tx.as_mut(), &fx.draft.id)
        .await
        .unwrap();
    tx.insert_graph(&fx.draft.id, &graph).await.unwrap();
    tx.commit().await.unwrap();
}

/// Create project "beta" whose single story interleaves alternation-group
/// members with a plain action step.
async fn seed_interleaved_story(fx: &Fixture) {
    fx.registry.create_project("beta", "Beta Bot").await.unwrap();
    let draft = fx
        .registry
        .version("beta", VersionStatus::Draft)
        .await
        .unwrap();

    let intent = |id: u128, name: &str| IntentRow {
        id: row_id(id),
        version_id: draft.id,
        name: name.to_string(),
    };
    let step = |id: u128, order: i32, kind: StepKind| StoryStepRow {
        id: row_id(id),
        story_id: row_id(6000),
        timeline_index: 0,
        step_order: order,
        kind,
        intent_id: None,
        action_id: None,
        response_id: None,
        form_id: None,
        active_loop: None,
        checkpoint: None,
        alternation_group: None,
    };

    let group = row_id(6100);
    let mut affirm_step = step(6001, 1, StepKind::Intent);
    affirm_step.intent_id = Some(row_id(6201));
    affirm_step.alternation_group = Some(group);
    let mut ack_step = step(6002, 2, StepKind::Action);
    ack_step.response_id = Some(row_id(6300));
    let mut deny_step = step(6003, 3, StepKind::Intent);
    deny_step.intent_id = Some(row_id(6202));
    deny_step.alternation_group = Some(group);

    let graph = dialogue_kernel::VersionGraph {
        intents: vec![intent(6201, "affirm"), intent(6202, "deny")],
        responses: vec![dialogue_kernel::types::ResponseRow {
            id: row_id(6300),
            version_id: draft.id,
            name: "utter_ack".to_string(),
        }],
        stories: vec![StoryRow {
            id: row_id(6000),
            version_id: draft.id,
            name: "confirmation".to_string(),
        }],
        story_steps: vec![affirm_step, ack_step, deny_step],
        ..dialogue_kernel::VersionGraph::default()
    };

    let mut tx = fx.store.begin().await.unwrap();
    tx.insert_graph(&draft.id, &graph).await.unwrap();
    tx.commit().await.unwrap();
}
