//! Shared fixtures for the integration tests.
//!
//! Builds a project whose draft graph exercises every entity kind: two
//! intents with localized examples, an entity with roles and groups, a slot
//! with prioritized mappings, a form with a required slot, a response with
//! prioritized variants, a story containing an alternation group, a
//! conditioned rule, and regex/lookup/synonym features.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use dialogue_kernel::store::{ConfigStore, InMemoryStore};
use dialogue_kernel::types::*;
use dialogue_kernel::{DialogueExporter, PromotionOrchestrator, VersionRegistry};

pub const PROJECT: &str = "acme";

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub registry: VersionRegistry<InMemoryStore>,
    pub orchestrator: PromotionOrchestrator<InMemoryStore>,
    pub exporter: DialogueExporter<InMemoryStore>,
    pub english: LanguageRow,
    pub draft: VersionRow,
}

pub fn row_id(n: u128) -> RowId {
    RowId::new(Uuid::from_u128(n))
}

pub fn at(offset: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + offset, 0).unwrap()
}

fn examples(localization_id: RowId, base: u128, count: usize) -> Vec<IntentExampleRow> {
    (0..count)
        .map(|n| IntentExampleRow {
            id: row_id(base + n as u128),
            localization_id,
            text: format!("example utterance {n}"),
            created_at: at(n as i64),
        })
        .collect()
}

/// Full draft graph for one version. `goodbye_examples` controls how many
/// training examples the second intent carries (10 passes the guard).
pub fn draft_graph(
    version_id: VersionId,
    language_id: LanguageId,
    goodbye_examples: usize,
) -> VersionGraph {
    let mut graph = VersionGraph {
        languages: vec![VersionLanguageRow {
            id: row_id(1),
            version_id,
            language_id,
            is_default: true,
        }],
        session_config: Some(SessionConfigRow {
            id: row_id(2),
            version_id,
            session_expiration_time: 60,
            carry_over_slots_to_new_session: true,
        }),
        intents: vec![
            IntentRow {
                id: row_id(10),
                version_id,
                name: "greet".to_string(),
            },
            IntentRow {
                id: row_id(11),
                version_id,
                name: "goodbye".to_string(),
            },
        ],
        intent_localizations: vec![
            IntentLocalizationRow {
                id: row_id(20),
                intent_id: row_id(10),
                language_id,
                created_at: at(0),
            },
            IntentLocalizationRow {
                id: row_id(21),
                intent_id: row_id(11),
                language_id,
                created_at: at(0),
            },
        ],
        entities: vec![EntityRow {
            id: row_id(200),
            version_id,
            key: "city".to_string(),
            entity_type: "text".to_string(),
            use_regex: true,
            use_lookup: true,
            influence_conversation: false,
        }],
        entity_roles: vec![
            EntityRoleRow {
                id: row_id(201),
                entity_id: row_id(200),
                role: "departure".to_string(),
            },
            EntityRoleRow {
                id: row_id(202),
                entity_id: row_id(200),
                role: "destination".to_string(),
            },
        ],
        entity_groups: vec![EntityGroupRow {
            id: row_id(203),
            entity_id: row_id(200),
            group_name: "location".to_string(),
        }],
        slots: vec![SlotRow {
            id: row_id(300),
            version_id,
            name: "city".to_string(),
            slot_type: SlotType::Text,
            influence_conversation: true,
            initial_value: None,
            values: vec![],
            min_value: None,
            max_value: None,
        }],
        slot_mappings: vec![
            SlotMappingRow {
                id: row_id(301),
                slot_id: row_id(300),
                mapping_type: MappingType::FromEntity,
                entity_id: Some(row_id(200)),
                role: Some("destination".to_string()),
                group: None,
                intent: None,
                not_intent: None,
                value: None,
                conditions: vec![MappingCondition::ActiveLoop {
                    name: Some("request_form".to_string()),
                }],
                active_loop: Some("ignored_legacy_loop".to_string()),
                priority: 1,
            },
            SlotMappingRow {
                id: row_id(302),
                slot_id: row_id(300),
                mapping_type: MappingType::FromText,
                entity_id: None,
                role: None,
                group: None,
                intent: Some("greet".to_string()),
                not_intent: None,
                value: None,
                conditions: vec![],
                active_loop: Some("request_form".to_string()),
                priority: 0,
            },
        ],
        forms: vec![FormRow {
            id: row_id(400),
            version_id,
            name: "request_form".to_string(),
            ignored_intents: vec!["chitchat".to_string()],
        }],
        form_required_slots: vec![FormRequiredSlotRow {
            id: row_id(401),
            form_id: row_id(400),
            slot_id: row_id(300),
            order: 1,
            required: true,
        }],
        form_slot_mappings: vec![FormSlotMappingRow {
            id: row_id(402),
            required_slot_id: row_id(401),
            mapping_type: MappingType::FromEntity,
            entity_id: Some(row_id(200)),
            intent: None,
            not_intent: None,
            value: None,
        }],
        actions: vec![ActionRow {
            id: row_id(500),
            version_id,
            name: "action_check_balance".to_string(),
            description: Some("Queries the billing backend".to_string()),
        }],
        responses: vec![ResponseRow {
            id: row_id(600),
            version_id,
            name: "utter_greet".to_string(),
        }],
        response_variants: vec![
            ResponseVariantRow {
                id: row_id(601),
                response_id: row_id(600),
                language_id: Some(language_id),
                priority: 1,
            },
            ResponseVariantRow {
                id: row_id(602),
                response_id: row_id(600),
                language_id: None,
                priority: 0,
            },
        ],
        response_conditions: vec![ResponseConditionRow {
            id: row_id(610),
            variant_id: row_id(601),
            condition: StateCondition::Slot {
                name: "city".to_string(),
                value: Some("Delhi".to_string()),
            },
            order_index: 0,
        }],
        response_components: vec![
            ResponseComponentRow {
                id: row_id(620),
                variant_id: row_id(601),
                payload: ResponsePayload::Text("Hello from Acme!".to_string()),
                order_index: 0,
            },
            ResponseComponentRow {
                id: row_id(621),
                variant_id: row_id(601),
                payload: ResponsePayload::Buttons(vec![ResponseButton {
                    title: "Check balance".to_string(),
                    payload: "/check_balance".to_string(),
                }]),
                order_index: 1,
            },
            ResponseComponentRow {
                id: row_id(622),
                variant_id: row_id(602),
                payload: ResponsePayload::Text("Hi!".to_string()),
                order_index: 0,
            },
        ],
        stories: vec![StoryRow {
            id: row_id(700),
            version_id,
            name: "greet path".to_string(),
        }],
        story_steps: vec![
            StoryStepRow {
                id: row_id(701),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 1,
                kind: StepKind::Intent,
                intent_id: Some(row_id(10)),
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
                checkpoint: None,
                alternation_group: None,
            },
            StoryStepRow {
                id: row_id(702),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 2,
                kind: StepKind::Action,
                intent_id: None,
                action_id: None,
                response_id: Some(row_id(600)),
                form_id: None,
                active_loop: None,
                checkpoint: None,
                alternation_group: None,
            },
            StoryStepRow {
                id: row_id(703),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 3,
                kind: StepKind::Intent,
                intent_id: Some(row_id(10)),
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
                checkpoint: None,
                alternation_group: Some(row_id(750)),
            },
            StoryStepRow {
                id: row_id(704),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 4,
                kind: StepKind::Intent,
                intent_id: Some(row_id(11)),
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
                checkpoint: None,
                alternation_group: Some(row_id(750)),
            },
            StoryStepRow {
                id: row_id(705),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 5,
                kind: StepKind::Action,
                intent_id: None,
                action_id: Some(row_id(500)),
                response_id: None,
                form_id: None,
                active_loop: None,
                checkpoint: None,
                alternation_group: None,
            },
            StoryStepRow {
                id: row_id(706),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 6,
                kind: StepKind::Slot,
                intent_id: None,
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
                checkpoint: None,
                alternation_group: None,
            },
            StoryStepRow {
                id: row_id(707),
                story_id: row_id(700),
                timeline_index: 0,
                step_order: 7,
                kind: StepKind::Checkpoint,
                intent_id: None,
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
                checkpoint: Some("end_of_greeting".to_string()),
                alternation_group: None,
            },
        ],
        story_slot_events: vec![StorySlotEventRow {
            id: row_id(710),
            step_id: row_id(706),
            slot_id: row_id(300),
            value: Some("Delhi".to_string()),
        }],
        story_step_entities: vec![StoryStepEntityRow {
            id: row_id(711),
            step_id: row_id(701),
            entity_id: row_id(200),
            value: Some("Delhi".to_string()),
            role: None,
            group: None,
        }],
        rules: vec![RuleRow {
            id: row_id(800),
            version_id,
            name: "greet rule".to_string(),
        }],
        rule_conditions: vec![RuleConditionRow {
            id: row_id(801),
            rule_id: row_id(800),
            condition: StateCondition::ActiveLoop {
                name: Some("request_form".to_string()),
            },
            order_index: 0,
        }],
        rule_steps: vec![
            RuleStepRow {
                id: row_id(810),
                rule_id: row_id(800),
                step_order: 1,
                kind: StepKind::Intent,
                intent_id: Some(row_id(10)),
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
            },
            RuleStepRow {
                id: row_id(811),
                rule_id: row_id(800),
                step_order: 2,
                kind: StepKind::Action,
                intent_id: None,
                action_id: None,
                response_id: Some(row_id(600)),
                form_id: None,
                active_loop: None,
            },
            RuleStepRow {
                id: row_id(812),
                rule_id: row_id(800),
                step_order: 3,
                kind: StepKind::ActiveLoop,
                intent_id: None,
                action_id: None,
                response_id: None,
                form_id: None,
                active_loop: None,
            },
        ],
        rule_slot_events: vec![],
        rule_step_entities: vec![RuleStepEntityRow {
            id: row_id(820),
            step_id: row_id(810),
            entity_id: row_id(200),
            value: None,
            role: None,
            group: None,
        }],
        regexes: vec![RegexRow {
            id: row_id(900),
            version_id,
            name: "zip_code".to_string(),
            entity_id: row_id(200),
        }],
        regex_examples: vec![RegexExampleRow {
            id: row_id(901),
            regex_id: row_id(900),
            language_id,
            text: "[0-9]{5}".to_string(),
            created_at: at(0),
        }],
        lookups: vec![LookupRow {
            id: row_id(910),
            version_id,
            name: "cities".to_string(),
            entity_id: row_id(200),
        }],
        lookup_examples: vec![
            LookupExampleRow {
                id: row_id(911),
                lookup_id: row_id(910),
                language_id,
                text: "Delhi".to_string(),
                created_at: at(0),
            },
            LookupExampleRow {
                id: row_id(912),
                lookup_id: row_id(910),
                language_id,
                text: "Mumbai".to_string(),
                created_at: at(1),
            },
        ],
        synonyms: vec![SynonymRow {
            id: row_id(920),
            version_id,
            canonical_value: "Delhi".to_string(),
            entity_id: row_id(200),
        }],
        synonym_examples: vec![SynonymExampleRow {
            id: row_id(921),
            synonym_id: row_id(920),
            language_id,
            text: "New Delhi".to_string(),
            created_at: at(0),
        }],
        ..VersionGraph::default()
    };

    graph
        .intent_examples
        .extend(examples(row_id(20), 100, 10));
    graph
        .intent_examples
        .extend(examples(row_id(21), 150, goodbye_examples));
    graph
}

/// Project with a fully populated draft that passes the promotion guard.
pub async fn fixture() -> Fixture {
    fixture_with_examples(10).await
}

/// Project whose `goodbye` intent carries a custom example count.
pub async fn fixture_with_examples(goodbye_examples: usize) -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let registry = VersionRegistry::new(Arc::clone(&store));
    let orchestrator = PromotionOrchestrator::new(Arc::clone(&store));
    let exporter = DialogueExporter::new(Arc::clone(&store));

    registry.create_project(PROJECT, "Acme Bot").await.unwrap();
    let english = registry.register_language("en", "English").await.unwrap();
    let draft = registry
        .version(PROJECT, VersionStatus::Draft)
        .await
        .unwrap();

    let graph = draft_graph(draft.id, english.id, goodbye_examples);
    let mut tx = store.begin().await.unwrap();
    tx.insert_graph(&draft.id, &graph).await.unwrap();
    tx.commit().await.unwrap();

    Fixture {
        store,
        registry,
        orchestrator,
        exporter,
        english,
        draft,
    }
}
