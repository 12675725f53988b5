//! Rules document exporter.

use serde::Serialize;
use std::collections::BTreeMap;

use super::steps::{export_rule_steps, StepExport};
use crate::types::{StateCondition, VersionGraph};

/// The rules document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RulesDocument {
    /// Document schema version.
    pub version: String,
    /// Rule blocks, sorted by name.
    pub rules: Vec<RuleExport>,
}

/// One rule block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleExport {
    /// Rule name.
    pub rule: String,
    /// Pre-conditions, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub condition: Vec<RuleConditionExport>,
    /// Ordered steps.
    pub steps: Vec<StepExport>,
}

/// One rule pre-condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleConditionExport {
    /// The named form loop must be active.
    ActiveLoop {
        /// Form name or null.
        active_loop: Option<String>,
    },
    /// A slot must hold a value (single-entry list form).
    SlotWasSet {
        /// Single-entry map of slot name to value.
        slot_was_set: Vec<BTreeMap<String, Option<String>>>,
    },
}

/// Build the rules document for one graph.
///
/// Rules with no emittable steps are dropped; the runtime rejects empty
/// blocks.
pub fn build_rules(graph: &VersionGraph) -> RulesDocument {
    let mut rules: Vec<_> = graph.rules.iter().collect();
    rules.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = Vec::new();
    for rule in rules {
        let mut conditions: Vec<_> = graph
            .rule_conditions
            .iter()
            .filter(|c| c.rule_id == rule.id)
            .collect();
        conditions.sort_by_key(|c| (c.order_index, c.id));

        let condition = conditions
            .iter()
            .map(|c| match &c.condition {
                StateCondition::ActiveLoop { name } => RuleConditionExport::ActiveLoop {
                    active_loop: name.clone(),
                },
                StateCondition::Slot { name, value } => {
                    let mut entry = BTreeMap::new();
                    entry.insert(name.clone(), value.clone());
                    RuleConditionExport::SlotWasSet {
                        slot_was_set: vec![entry],
                    }
                }
            })
            .collect();

        let mut steps: Vec<_> = graph
            .rule_steps
            .iter()
            .filter(|s| s.rule_id == rule.id)
            .collect();
        steps.sort_by_key(|s| (s.step_order, s.id));

        let exported = export_rule_steps(graph, &steps);
        if !exported.is_empty() {
            out.push(RuleExport {
                rule: rule.name.clone(),
                condition,
                steps: exported,
            });
        }
    }

    RulesDocument {
        version: crate::DOCUMENT_SCHEMA_VERSION.to_string(),
        rules: out,
    }
}
