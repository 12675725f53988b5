//! The full configuration graph of one version, as flat per-table row sets.
//!
//! A `VersionGraph` is a consistent load of every version-scoped table. The
//! replicator remaps one into a fresh graph, the guard validates one, and
//! the exporters serialize one. Row vectors keep store order (ascending row
//! id); exporters apply their own deterministic ordering rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::action::ActionRow;
use super::entity::{EntityGroupRow, EntityRoleRow, EntityRow};
use super::form::{FormRequiredSlotRow, FormRow, FormSlotMappingRow};
use super::ids::{RowId, VersionId};
use super::intent::{IntentExampleRow, IntentLocalizationRow, IntentRow};
use super::nlu::{
    LookupExampleRow, LookupRow, RegexExampleRow, RegexRow, SynonymExampleRow, SynonymRow,
};
use super::response::{ResponseComponentRow, ResponseConditionRow, ResponseRow, ResponseVariantRow};
use super::rule::{RuleConditionRow, RuleRow, RuleSlotEventRow, RuleStepEntityRow, RuleStepRow};
use super::slot::{SlotMappingRow, SlotRow};
use super::story::{StorySlotEventRow, StoryStepEntityRow, StoryStepRow, StoryRow};
use super::version::{SessionConfigRow, VersionLanguageRow};

/// Every version-scoped row of one configuration graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionGraph {
    /// Enabled languages.
    pub languages: Vec<VersionLanguageRow>,
    /// Session configuration, at most one.
    pub session_config: Option<SessionConfigRow>,

    /// Intents.
    pub intents: Vec<IntentRow>,
    /// Intent localizations.
    pub intent_localizations: Vec<IntentLocalizationRow>,
    /// Intent training examples.
    pub intent_examples: Vec<IntentExampleRow>,

    /// Entities.
    pub entities: Vec<EntityRow>,
    /// Entity roles.
    pub entity_roles: Vec<EntityRoleRow>,
    /// Entity groups.
    pub entity_groups: Vec<EntityGroupRow>,

    /// Slots.
    pub slots: Vec<SlotRow>,
    /// Slot mappings.
    pub slot_mappings: Vec<SlotMappingRow>,

    /// Forms.
    pub forms: Vec<FormRow>,
    /// Form required slots.
    pub form_required_slots: Vec<FormRequiredSlotRow>,
    /// Form slot mappings.
    pub form_slot_mappings: Vec<FormSlotMappingRow>,

    /// Actions.
    pub actions: Vec<ActionRow>,

    /// Responses.
    pub responses: Vec<ResponseRow>,
    /// Response variants.
    pub response_variants: Vec<ResponseVariantRow>,
    /// Response variant conditions.
    pub response_conditions: Vec<ResponseConditionRow>,
    /// Response variant components.
    pub response_components: Vec<ResponseComponentRow>,

    /// Stories.
    pub stories: Vec<StoryRow>,
    /// Story steps.
    pub story_steps: Vec<StoryStepRow>,
    /// Story slot events.
    pub story_slot_events: Vec<StorySlotEventRow>,
    /// Story step entity annotations.
    pub story_step_entities: Vec<StoryStepEntityRow>,

    /// Rules.
    pub rules: Vec<RuleRow>,
    /// Rule conditions.
    pub rule_conditions: Vec<RuleConditionRow>,
    /// Rule steps.
    pub rule_steps: Vec<RuleStepRow>,
    /// Rule slot events.
    pub rule_slot_events: Vec<RuleSlotEventRow>,
    /// Rule step entity annotations.
    pub rule_step_entities: Vec<RuleStepEntityRow>,

    /// Regex features.
    pub regexes: Vec<RegexRow>,
    /// Regex patterns.
    pub regex_examples: Vec<RegexExampleRow>,
    /// Lookup tables.
    pub lookups: Vec<LookupRow>,
    /// Lookup values.
    pub lookup_examples: Vec<LookupExampleRow>,
    /// Synonym mappings.
    pub synonyms: Vec<SynonymRow>,
    /// Synonym surface forms.
    pub synonym_examples: Vec<SynonymExampleRow>,
}

impl VersionGraph {
    /// Total number of rows across every table.
    pub fn row_count(&self) -> usize {
        self.row_counts().values().sum()
    }

    /// Whether the graph holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Row count per table, keyed by table name.
    pub fn row_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        counts.insert("version_languages", self.languages.len());
        counts.insert(
            "session_configs",
            usize::from(self.session_config.is_some()),
        );
        counts.insert("intents", self.intents.len());
        counts.insert("intent_localizations", self.intent_localizations.len());
        counts.insert("intent_examples", self.intent_examples.len());
        counts.insert("entities", self.entities.len());
        counts.insert("entity_roles", self.entity_roles.len());
        counts.insert("entity_groups", self.entity_groups.len());
        counts.insert("slots", self.slots.len());
        counts.insert("slot_mappings", self.slot_mappings.len());
        counts.insert("forms", self.forms.len());
        counts.insert("form_required_slots", self.form_required_slots.len());
        counts.insert("form_slot_mappings", self.form_slot_mappings.len());
        counts.insert("actions", self.actions.len());
        counts.insert("responses", self.responses.len());
        counts.insert("response_variants", self.response_variants.len());
        counts.insert("response_conditions", self.response_conditions.len());
        counts.insert("response_components", self.response_components.len());
        counts.insert("stories", self.stories.len());
        counts.insert("story_steps", self.story_steps.len());
        counts.insert("story_slot_events", self.story_slot_events.len());
        counts.insert("story_step_entities", self.story_step_entities.len());
        counts.insert("rules", self.rules.len());
        counts.insert("rule_conditions", self.rule_conditions.len());
        counts.insert("rule_steps", self.rule_steps.len());
        counts.insert("rule_slot_events", self.rule_slot_events.len());
        counts.insert("rule_step_entities", self.rule_step_entities.len());
        counts.insert("regexes", self.regexes.len());
        counts.insert("regex_examples", self.regex_examples.len());
        counts.insert("lookups", self.lookups.len());
        counts.insert("lookup_examples", self.lookup_examples.len());
        counts.insert("synonyms", self.synonyms.len());
        counts.insert("synonym_examples", self.synonym_examples.len());
        counts
    }

    /// Look up an intent name by row id.
    pub fn intent_name(&self, id: &RowId) -> Option<&str> {
        self.intents
            .iter()
            .find(|i| i.id == *id)
            .map(|i| i.name.as_str())
    }

    /// Look up an entity key by row id.
    pub fn entity_key(&self, id: &RowId) -> Option<&str> {
        self.entities
            .iter()
            .find(|e| e.id == *id)
            .map(|e| e.key.as_str())
    }

    /// Look up a slot name by row id.
    pub fn slot_name(&self, id: &RowId) -> Option<&str> {
        self.slots
            .iter()
            .find(|s| s.id == *id)
            .map(|s| s.name.as_str())
    }

    /// Look up a form name by row id.
    pub fn form_name(&self, id: &RowId) -> Option<&str> {
        self.forms
            .iter()
            .find(|f| f.id == *id)
            .map(|f| f.name.as_str())
    }

    /// Look up an action name by row id.
    pub fn action_name(&self, id: &RowId) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.id == *id)
            .map(|a| a.name.as_str())
    }

    /// Look up a response name by row id.
    pub fn response_name(&self, id: &RowId) -> Option<&str> {
        self.responses
            .iter()
            .find(|r| r.id == *id)
            .map(|r| r.name.as_str())
    }

    /// Rewrite every row's owning version id. Used when a loaded graph is
    /// re-targeted without identifier remapping (tests and fixtures).
    pub fn with_version(mut self, version_id: VersionId) -> Self {
        for row in &mut self.languages {
            row.version_id = version_id;
        }
        if let Some(cfg) = &mut self.session_config {
            cfg.version_id = version_id;
        }
        for row in &mut self.intents {
            row.version_id = version_id;
        }
        for row in &mut self.entities {
            row.version_id = version_id;
        }
        for row in &mut self.slots {
            row.version_id = version_id;
        }
        for row in &mut self.forms {
            row.version_id = version_id;
        }
        for row in &mut self.actions {
            row.version_id = version_id;
        }
        for row in &mut self.responses {
            row.version_id = version_id;
        }
        for row in &mut self.stories {
            row.version_id = version_id;
        }
        for row in &mut self.rules {
            row.version_id = version_id;
        }
        for row in &mut self.regexes {
            row.version_id = version_id;
        }
        for row in &mut self.lookups {
            row.version_id = version_id;
        }
        for row in &mut self.synonyms {
            row.version_id = version_id;
        }
        self
    }
}
