//! Step serialization shared by the story and rule exporters.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{
    RowId, RuleStepRow, StepKind, StoryStepRow, VersionGraph,
};

/// One exported step in a story or rule block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepExport {
    /// A user intent, optionally with entity annotations.
    Intent {
        /// Intent name.
        intent: String,
        /// Annotated entities.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        entities: Vec<EntityAnnotation>,
    },
    /// A bot action (custom action, response utterance, or form name).
    Action {
        /// Action name.
        action: String,
    },
    /// Slot-was-set events.
    SlotWasSet {
        /// Single-entry maps of slot name to value.
        slot_was_set: Vec<BTreeMap<String, Option<String>>>,
    },
    /// Form loop activation (`null` deactivates).
    ActiveLoop {
        /// Form name or `null`.
        active_loop: Option<String>,
    },
    /// A named checkpoint.
    Checkpoint {
        /// Checkpoint name.
        checkpoint: String,
    },
    /// An either/or block of alternative intent steps.
    Or {
        /// The alternatives.
        or: Vec<StepExport>,
    },
}

/// An entity annotation on an intent step: a bare key, or key-with-value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityAnnotation {
    /// Entity key only.
    Plain(String),
    /// Entity key with an expected value (single-entry map).
    Valued(BTreeMap<String, String>),
}

fn annotation(key: &str, value: &Option<String>) -> EntityAnnotation {
    match value {
        Some(v) => {
            let mut entry = BTreeMap::new();
            entry.insert(key.to_string(), v.clone());
            EntityAnnotation::Valued(entry)
        }
        None => EntityAnnotation::Plain(key.to_string()),
    }
}

fn slot_entry(name: &str, value: &Option<String>) -> BTreeMap<String, Option<String>> {
    let mut entry = BTreeMap::new();
    entry.insert(name.to_string(), value.clone());
    entry
}

fn intent_annotations(graph: &VersionGraph, step_id: &RowId) -> Vec<EntityAnnotation> {
    let mut rows: Vec<_> = graph
        .story_step_entities
        .iter()
        .filter(|a| a.step_id == *step_id)
        .collect();
    rows.sort_by_key(|a| a.id);
    rows.iter()
        .filter_map(|a| {
            graph
                .entity_key(&a.entity_id)
                .map(|key| annotation(key, &a.value))
        })
        .collect()
}

fn intent_step(graph: &VersionGraph, intent_id: &RowId, step_id: &RowId) -> Option<StepExport> {
    graph.intent_name(intent_id).map(|name| StepExport::Intent {
        intent: name.to_string(),
        entities: intent_annotations(graph, step_id),
    })
}

/// Resolve an action step name: action, then response, then form.
fn action_name(
    graph: &VersionGraph,
    action_id: &Option<RowId>,
    response_id: &Option<RowId>,
    form_id: &Option<RowId>,
) -> Option<String> {
    action_id
        .and_then(|id| graph.action_name(&id))
        .or_else(|| response_id.and_then(|id| graph.response_name(&id)))
        .or_else(|| form_id.and_then(|id| graph.form_name(&id)))
        .map(str::to_string)
}

/// Serialize a story's steps, folding alternation groups.
///
/// `steps` must already be sorted by `(timeline_index, step_order)`. Steps
/// sharing an alternation group fold into exactly one `or:` block at the
/// position of the group's first member, even when member rows are
/// interleaved with other steps in storage order.
pub fn export_story_steps(graph: &VersionGraph, steps: &[&StoryStepRow]) -> Vec<StepExport> {
    let mut groups: BTreeMap<RowId, Vec<&StoryStepRow>> = BTreeMap::new();
    for &step in steps {
        if let Some(group) = step.alternation_group {
            groups.entry(group).or_default().push(step);
        }
    }

    let mut out = Vec::new();
    let mut emitted_groups: Vec<RowId> = Vec::new();

    for step in steps {
        if let Some(group) = step.alternation_group {
            if emitted_groups.contains(&group) {
                continue;
            }
            emitted_groups.push(group);

            let alternatives: Vec<StepExport> = groups
                .get(&group)
                .into_iter()
                .flatten()
                .filter_map(|member| {
                    member
                        .intent_id
                        .as_ref()
                        .and_then(|id| intent_step(graph, id, &member.id))
                })
                .collect();
            if !alternatives.is_empty() {
                out.push(StepExport::Or { or: alternatives });
            }
            continue;
        }

        match step.kind {
            StepKind::Intent => {
                if let Some(exported) = step
                    .intent_id
                    .as_ref()
                    .and_then(|id| intent_step(graph, id, &step.id))
                {
                    out.push(exported);
                }
            }
            StepKind::Action => {
                if let Some(action) =
                    action_name(graph, &step.action_id, &step.response_id, &step.form_id)
                {
                    out.push(StepExport::Action { action });
                }
            }
            StepKind::ActiveLoop => {
                out.push(StepExport::ActiveLoop {
                    active_loop: step.active_loop.clone(),
                });
            }
            StepKind::Slot => {
                let mut events: Vec<_> = graph
                    .story_slot_events
                    .iter()
                    .filter(|e| e.step_id == step.id)
                    .collect();
                events.sort_by_key(|e| e.id);
                let slot_was_set: Vec<_> = events
                    .iter()
                    .filter_map(|e| {
                        graph
                            .slot_name(&e.slot_id)
                            .map(|name| slot_entry(name, &e.value))
                    })
                    .collect();
                if !slot_was_set.is_empty() {
                    out.push(StepExport::SlotWasSet { slot_was_set });
                }
            }
            StepKind::Checkpoint => {
                if let Some(checkpoint) = &step.checkpoint {
                    out.push(StepExport::Checkpoint {
                        checkpoint: checkpoint.clone(),
                    });
                }
            }
        }
    }

    out
}

/// Serialize a rule's steps. `steps` must already be sorted by
/// `step_order`. Rules carry no checkpoints and no alternation groups.
pub fn export_rule_steps(graph: &VersionGraph, steps: &[&RuleStepRow]) -> Vec<StepExport> {
    let mut out = Vec::new();

    for step in steps {
        match step.kind {
            StepKind::Intent => {
                if let Some(intent_id) = &step.intent_id {
                    if let Some(name) = graph.intent_name(intent_id) {
                        let mut rows: Vec<_> = graph
                            .rule_step_entities
                            .iter()
                            .filter(|a| a.step_id == step.id)
                            .collect();
                        rows.sort_by_key(|a| a.id);
                        let entities = rows
                            .iter()
                            .filter_map(|a| {
                                graph
                                    .entity_key(&a.entity_id)
                                    .map(|key| annotation(key, &a.value))
                            })
                            .collect();
                        out.push(StepExport::Intent {
                            intent: name.to_string(),
                            entities,
                        });
                    }
                }
            }
            StepKind::Action => {
                if let Some(action) =
                    action_name(graph, &step.action_id, &step.response_id, &step.form_id)
                {
                    out.push(StepExport::Action { action });
                }
            }
            StepKind::ActiveLoop => {
                out.push(StepExport::ActiveLoop {
                    active_loop: step.active_loop.clone(),
                });
            }
            StepKind::Slot => {
                let mut events: Vec<_> = graph
                    .rule_slot_events
                    .iter()
                    .filter(|e| e.step_id == step.id)
                    .collect();
                events.sort_by_key(|e| e.id);
                let slot_was_set: Vec<_> = events
                    .iter()
                    .filter_map(|e| {
                        graph
                            .slot_name(&e.slot_id)
                            .map(|name| slot_entry(name, &e.value))
                    })
                    .collect();
                if !slot_was_set.is_empty() {
                    out.push(StepExport::SlotWasSet { slot_was_set });
                }
            }
            StepKind::Checkpoint => {}
        }
    }

    out
}
