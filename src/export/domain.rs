//! Domain document exporter.
//!
//! Flattens one version's graph into the runtime engine's domain document:
//! intents, entities with roles and groups, slots with mappings, forms with
//! required slots, responses with variants, actions, and session config.
//! Empty sections are omitted.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{
    FormSlotMappingRow, ResponseButton, ResponsePayload, SlotMappingRow, SlotType, StateCondition,
    VersionGraph,
};

/// The complete domain document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainDocument {
    /// Document schema version.
    pub version: String,
    /// Intent names, sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub intents: Vec<String>,
    /// Entity entries, sorted by key.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<EntityEntry>,
    /// Slots keyed by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub slots: BTreeMap<String, SlotExport>,
    /// Forms keyed by name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub forms: BTreeMap<String, FormExport>,
    /// Response variants keyed by response name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Vec<VariantExport>>,
    /// Custom action names, sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// Session configuration, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_config: Option<SessionConfigExport>,
}

/// An entity: a bare key, or a key with roles/groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityEntry {
    /// Entity with neither roles nor groups.
    Plain(String),
    /// Entity with roles and/or groups (single-entry map).
    Detailed(BTreeMap<String, EntityAttributes>),
}

/// Roles and groups of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityAttributes {
    /// Role names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    /// Group names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

/// One slot definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotExport {
    /// Slot value type.
    #[serde(rename = "type")]
    pub slot_type: SlotType,
    /// Whether the slot influences dialogue prediction.
    pub influence_conversation: bool,
    /// Optional initial value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<String>,
    /// Allowed values for categorical slots.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    /// Lower bound, float slots only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    /// Upper bound, float slots only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    /// Mappings, highest priority first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingExport>,
}

/// One slot or form mapping in loose document form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingExport {
    /// Mapping kind token.
    #[serde(rename = "type")]
    pub mapping_type: String,
    /// Source entity key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Entity role filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Entity group filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Intent filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Negative intent filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_intent: Option<String>,
    /// Fixed value for intent-driven mappings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Mapping conditions in loose form.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<serde_json::Value>,
}

/// One form definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormExport {
    /// Intents ignored while the form is active.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_intents: Vec<String>,
    /// Required slots in form order, each with its mappings.
    pub required_slots: IndexMap<String, Vec<MappingExport>>,
}

/// One response variant with conditions and merged components.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VariantExport {
    /// Eligibility conditions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub condition: Vec<VariantConditionExport>,
    /// Message text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Quick-reply buttons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<ResponseButton>>,
    /// Image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Attachment object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<serde_json::Value>,
    /// Custom payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<serde_json::Value>,
}

impl VariantExport {
    fn is_vacant(&self) -> bool {
        self.condition.is_empty()
            && self.text.is_none()
            && self.buttons.is_none()
            && self.image.is_none()
            && self.attachment.is_none()
            && self.custom.is_none()
    }
}

/// One variant condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VariantConditionExport {
    /// A slot-equals condition. `value` is emitted even when null.
    Slot {
        /// Condition kind token (`slot`).
        #[serde(rename = "type")]
        kind: String,
        /// Slot name.
        name: String,
        /// Expected value.
        value: Option<String>,
    },
    /// An active-loop condition.
    ActiveLoop {
        /// Condition kind token (`active_loop`).
        #[serde(rename = "type")]
        kind: String,
        /// Form name or null.
        name: Option<String>,
    },
}

/// Session configuration section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionConfigExport {
    /// Session expiration time in minutes.
    pub session_expiration_time: i64,
    /// Whether slot values survive into a new session.
    pub carry_over_slots_to_new_session: bool,
}

/// Build the domain document for one graph.
pub fn build_domain(graph: &VersionGraph) -> DomainDocument {
    let mut intents: Vec<String> = graph.intents.iter().map(|i| i.name.clone()).collect();
    intents.sort();

    let mut entities = Vec::new();
    let mut entity_rows: Vec<_> = graph.entities.iter().collect();
    entity_rows.sort_by(|a, b| a.key.cmp(&b.key));
    for entity in entity_rows {
        let mut roles: Vec<String> = graph
            .entity_roles
            .iter()
            .filter(|r| r.entity_id == entity.id)
            .map(|r| r.role.clone())
            .collect();
        roles.sort();
        let mut groups: Vec<String> = graph
            .entity_groups
            .iter()
            .filter(|g| g.entity_id == entity.id)
            .map(|g| g.group_name.clone())
            .collect();
        groups.sort();

        if roles.is_empty() && groups.is_empty() {
            entities.push(EntityEntry::Plain(entity.key.clone()));
        } else {
            let mut entry = BTreeMap::new();
            entry.insert(entity.key.clone(), EntityAttributes { roles, groups });
            entities.push(EntityEntry::Detailed(entry));
        }
    }

    let mut slots = BTreeMap::new();
    for slot in &graph.slots {
        let mut mappings: Vec<_> = graph
            .slot_mappings
            .iter()
            .filter(|m| m.slot_id == slot.id)
            .collect();
        mappings.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));

        let is_float = slot.slot_type == SlotType::Float;
        slots.insert(
            slot.name.clone(),
            SlotExport {
                slot_type: slot.slot_type,
                influence_conversation: slot.influence_conversation,
                initial_value: slot.initial_value.clone(),
                values: slot.values.clone(),
                min_value: if is_float { slot.min_value } else { None },
                max_value: if is_float { slot.max_value } else { None },
                mappings: mappings
                    .into_iter()
                    .map(|m| slot_mapping_export(graph, m))
                    .collect(),
            },
        );
    }

    let mut forms = BTreeMap::new();
    for form in &graph.forms {
        let mut required: Vec<_> = graph
            .form_required_slots
            .iter()
            .filter(|r| r.form_id == form.id)
            .collect();
        required.sort_by_key(|r| (r.order, r.id));

        let mut required_slots = IndexMap::new();
        for row in required {
            let Some(slot_name) = graph.slot_name(&row.slot_id) else {
                continue;
            };
            let mut mappings: Vec<_> = graph
                .form_slot_mappings
                .iter()
                .filter(|m| m.required_slot_id == row.id)
                .collect();
            mappings.sort_by_key(|m| m.id);
            required_slots.insert(
                slot_name.to_string(),
                mappings
                    .into_iter()
                    .map(|m| form_mapping_export(graph, m))
                    .collect(),
            );
        }

        forms.insert(
            form.name.clone(),
            FormExport {
                ignored_intents: form.ignored_intents.clone(),
                required_slots,
            },
        );
    }

    let mut responses = BTreeMap::new();
    for response in &graph.responses {
        let mut variants: Vec<_> = graph
            .response_variants
            .iter()
            .filter(|v| v.response_id == response.id)
            .collect();
        variants.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));

        let mut exported = Vec::new();
        for variant in variants {
            let mut conditions: Vec<_> = graph
                .response_conditions
                .iter()
                .filter(|c| c.variant_id == variant.id)
                .collect();
            conditions.sort_by_key(|c| (c.order_index, c.id));

            let mut out = VariantExport {
                condition: conditions
                    .iter()
                    .map(|c| match &c.condition {
                        StateCondition::Slot { name, value } => VariantConditionExport::Slot {
                            kind: "slot".to_string(),
                            name: name.clone(),
                            value: value.clone(),
                        },
                        StateCondition::ActiveLoop { name } => {
                            VariantConditionExport::ActiveLoop {
                                kind: "active_loop".to_string(),
                                name: name.clone(),
                            }
                        }
                    })
                    .collect(),
                ..VariantExport::default()
            };

            let mut components: Vec<_> = graph
                .response_components
                .iter()
                .filter(|c| c.variant_id == variant.id)
                .collect();
            components.sort_by_key(|c| (c.order_index, c.id));
            for component in components {
                match &component.payload {
                    ResponsePayload::Text(text) => out.text = Some(text.clone()),
                    ResponsePayload::Buttons(buttons) => out.buttons = Some(buttons.clone()),
                    ResponsePayload::Image(url) => out.image = Some(url.clone()),
                    ResponsePayload::Attachment(payload) => {
                        out.attachment = Some(payload.clone())
                    }
                    ResponsePayload::Custom(payload) => out.custom = Some(payload.clone()),
                }
            }

            if !out.is_vacant() {
                exported.push(out);
            }
        }
        responses.insert(response.name.clone(), exported);
    }

    let mut actions: Vec<String> = graph.actions.iter().map(|a| a.name.clone()).collect();
    actions.sort();

    DomainDocument {
        version: crate::DOCUMENT_SCHEMA_VERSION.to_string(),
        intents,
        entities,
        slots,
        forms,
        responses,
        actions,
        session_config: graph.session_config.as_ref().map(|cfg| SessionConfigExport {
            session_expiration_time: cfg.session_expiration_time,
            carry_over_slots_to_new_session: cfg.carry_over_slots_to_new_session,
        }),
    }
}

fn slot_mapping_export(graph: &VersionGraph, mapping: &SlotMappingRow) -> MappingExport {
    // Structured conditions win over the legacy single active_loop field.
    let conditions = if !mapping.conditions.is_empty() {
        mapping.conditions.iter().map(|c| c.to_value()).collect()
    } else if let Some(active_loop) = &mapping.active_loop {
        vec![serde_json::json!({ "active_loop": active_loop })]
    } else {
        vec![]
    };

    MappingExport {
        mapping_type: mapping.mapping_type.as_str().to_string(),
        entity: mapping
            .entity_id
            .and_then(|id| graph.entity_key(&id))
            .map(str::to_string),
        role: mapping.role.clone(),
        group: mapping.group.clone(),
        intent: mapping.intent.clone(),
        not_intent: mapping.not_intent.clone(),
        value: mapping.value.clone(),
        conditions,
    }
}

fn form_mapping_export(graph: &VersionGraph, mapping: &FormSlotMappingRow) -> MappingExport {
    MappingExport {
        mapping_type: mapping.mapping_type.as_str().to_string(),
        entity: mapping
            .entity_id
            .and_then(|id| graph.entity_key(&id))
            .map(str::to_string),
        role: None,
        group: None,
        intent: mapping.intent.clone(),
        not_intent: mapping.not_intent.clone(),
        value: mapping.value.clone(),
        conditions: vec![],
    }
}
