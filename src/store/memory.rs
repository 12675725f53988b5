//! In-memory configuration store.
//!
//! Uses `BTreeMap` tables keyed by row id for deterministic iteration.
//! Transactions are snapshot-based: a session clones the store state, works
//! on the clone, and swaps it back on commit. Dropping a session discards
//! its writes, which gives the promotion orchestrator its all-or-nothing
//! guarantee without any backend support.
//!
//! The store validates what a relational schema would: unique project and
//! language codes, one version per (project, status), natural-key
//! uniqueness inside a graph, and referential integrity on every delete.
//! Deletes never cascade; erasing a graph out of dependency order fails.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

use super::{ConfigStore, StoreError, StoreResult, StoreTx};
use crate::types::{
    ActionRow, EntityGroupRow, EntityRoleRow, EntityRow, FormRequiredSlotRow, FormRow,
    FormSlotMappingRow, IntentExampleRow, IntentLocalizationRow, IntentRow, LanguageId,
    LanguageRow, LookupExampleRow, LookupRow, ProjectId, ProjectRow, RegexExampleRow, RegexRow,
    ResponseComponentRow, ResponseConditionRow, ResponseRow, ResponseVariantRow, RowId,
    RuleConditionRow, RuleRow, RuleSlotEventRow, RuleStepEntityRow, RuleStepRow,
    SessionConfigRow, SlotMappingRow, SlotRow, StoryRow, StorySlotEventRow, StoryStepEntityRow,
    StoryStepRow, SynonymExampleRow, SynonymRow, VersionGraph, VersionId, VersionLanguageRow,
    VersionRow, VersionStatus,
};

/// Full table state of the in-memory store.
#[derive(Debug, Clone, Default)]
struct StoreState {
    projects: BTreeMap<ProjectId, ProjectRow>,
    languages: BTreeMap<LanguageId, LanguageRow>,
    versions: BTreeMap<VersionId, VersionRow>,

    version_languages: BTreeMap<RowId, VersionLanguageRow>,
    session_configs: BTreeMap<RowId, SessionConfigRow>,

    intents: BTreeMap<RowId, IntentRow>,
    intent_localizations: BTreeMap<RowId, IntentLocalizationRow>,
    intent_examples: BTreeMap<RowId, IntentExampleRow>,

    entities: BTreeMap<RowId, EntityRow>,
    entity_roles: BTreeMap<RowId, EntityRoleRow>,
    entity_groups: BTreeMap<RowId, EntityGroupRow>,

    slots: BTreeMap<RowId, SlotRow>,
    slot_mappings: BTreeMap<RowId, SlotMappingRow>,

    forms: BTreeMap<RowId, FormRow>,
    form_required_slots: BTreeMap<RowId, FormRequiredSlotRow>,
    form_slot_mappings: BTreeMap<RowId, FormSlotMappingRow>,

    actions: BTreeMap<RowId, ActionRow>,

    responses: BTreeMap<RowId, ResponseRow>,
    response_variants: BTreeMap<RowId, ResponseVariantRow>,
    response_conditions: BTreeMap<RowId, ResponseConditionRow>,
    response_components: BTreeMap<RowId, ResponseComponentRow>,

    stories: BTreeMap<RowId, StoryRow>,
    story_steps: BTreeMap<RowId, StoryStepRow>,
    story_slot_events: BTreeMap<RowId, StorySlotEventRow>,
    story_step_entities: BTreeMap<RowId, StoryStepEntityRow>,

    rules: BTreeMap<RowId, RuleRow>,
    rule_conditions: BTreeMap<RowId, RuleConditionRow>,
    rule_steps: BTreeMap<RowId, RuleStepRow>,
    rule_slot_events: BTreeMap<RowId, RuleSlotEventRow>,
    rule_step_entities: BTreeMap<RowId, RuleStepEntityRow>,

    regexes: BTreeMap<RowId, RegexRow>,
    regex_examples: BTreeMap<RowId, RegexExampleRow>,
    lookups: BTreeMap<RowId, LookupRow>,
    lookup_examples: BTreeMap<RowId, LookupExampleRow>,
    synonyms: BTreeMap<RowId, SynonymRow>,
    synonym_examples: BTreeMap<RowId, SynonymExampleRow>,
}

impl StoreState {
    fn intent_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.intents
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn localization_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        let intents = self.intent_ids(vid);
        self.intent_localizations
            .values()
            .filter(|r| intents.contains(&r.intent_id))
            .map(|r| r.id)
            .collect()
    }

    fn entity_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.entities
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn slot_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.slots
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn form_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.forms
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn required_slot_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        let forms = self.form_ids(vid);
        self.form_required_slots
            .values()
            .filter(|r| forms.contains(&r.form_id))
            .map(|r| r.id)
            .collect()
    }

    fn action_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.actions
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn response_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.responses
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn variant_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        let responses = self.response_ids(vid);
        self.response_variants
            .values()
            .filter(|r| responses.contains(&r.response_id))
            .map(|r| r.id)
            .collect()
    }

    fn story_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.stories
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn story_step_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        let stories = self.story_ids(vid);
        self.story_steps
            .values()
            .filter(|r| stories.contains(&r.story_id))
            .map(|r| r.id)
            .collect()
    }

    fn rule_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.rules
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn rule_step_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        let rules = self.rule_ids(vid);
        self.rule_steps
            .values()
            .filter(|r| rules.contains(&r.rule_id))
            .map(|r| r.id)
            .collect()
    }

    fn regex_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.regexes
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn lookup_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.lookups
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn synonym_ids(&self, vid: &VersionId) -> BTreeSet<RowId> {
        self.synonyms
            .values()
            .filter(|r| r.version_id == *vid)
            .map(|r| r.id)
            .collect()
    }

    fn load_graph(&self, vid: &VersionId) -> VersionGraph {
        let intent_ids = self.intent_ids(vid);
        let localization_ids = self.localization_ids(vid);
        let entity_ids = self.entity_ids(vid);
        let slot_ids = self.slot_ids(vid);
        let form_ids = self.form_ids(vid);
        let required_slot_ids = self.required_slot_ids(vid);
        let response_ids = self.response_ids(vid);
        let variant_ids = self.variant_ids(vid);
        let story_ids = self.story_ids(vid);
        let story_step_ids = self.story_step_ids(vid);
        let rule_ids = self.rule_ids(vid);
        let rule_step_ids = self.rule_step_ids(vid);
        let regex_ids = self.regex_ids(vid);
        let lookup_ids = self.lookup_ids(vid);
        let synonym_ids = self.synonym_ids(vid);

        VersionGraph {
            languages: collect(&self.version_languages, |r| r.version_id == *vid),
            session_config: self
                .session_configs
                .values()
                .find(|r| r.version_id == *vid)
                .cloned(),
            intents: collect(&self.intents, |r| r.version_id == *vid),
            intent_localizations: collect(&self.intent_localizations, |r| {
                intent_ids.contains(&r.intent_id)
            }),
            intent_examples: collect(&self.intent_examples, |r| {
                localization_ids.contains(&r.localization_id)
            }),
            entities: collect(&self.entities, |r| r.version_id == *vid),
            entity_roles: collect(&self.entity_roles, |r| entity_ids.contains(&r.entity_id)),
            entity_groups: collect(&self.entity_groups, |r| entity_ids.contains(&r.entity_id)),
            slots: collect(&self.slots, |r| r.version_id == *vid),
            slot_mappings: collect(&self.slot_mappings, |r| slot_ids.contains(&r.slot_id)),
            forms: collect(&self.forms, |r| r.version_id == *vid),
            form_required_slots: collect(&self.form_required_slots, |r| {
                form_ids.contains(&r.form_id)
            }),
            form_slot_mappings: collect(&self.form_slot_mappings, |r| {
                required_slot_ids.contains(&r.required_slot_id)
            }),
            actions: collect(&self.actions, |r| r.version_id == *vid),
            responses: collect(&self.responses, |r| r.version_id == *vid),
            response_variants: collect(&self.response_variants, |r| {
                response_ids.contains(&r.response_id)
            }),
            response_conditions: collect(&self.response_conditions, |r| {
                variant_ids.contains(&r.variant_id)
            }),
            response_components: collect(&self.response_components, |r| {
                variant_ids.contains(&r.variant_id)
            }),
            stories: collect(&self.stories, |r| r.version_id == *vid),
            story_steps: collect(&self.story_steps, |r| story_ids.contains(&r.story_id)),
            story_slot_events: collect(&self.story_slot_events, |r| {
                story_step_ids.contains(&r.step_id)
            }),
            story_step_entities: collect(&self.story_step_entities, |r| {
                story_step_ids.contains(&r.step_id)
            }),
            rules: collect(&self.rules, |r| r.version_id == *vid),
            rule_conditions: collect(&self.rule_conditions, |r| rule_ids.contains(&r.rule_id)),
            rule_steps: collect(&self.rule_steps, |r| rule_ids.contains(&r.rule_id)),
            rule_slot_events: collect(&self.rule_slot_events, |r| {
                rule_step_ids.contains(&r.step_id)
            }),
            rule_step_entities: collect(&self.rule_step_entities, |r| {
                rule_step_ids.contains(&r.step_id)
            }),
            regexes: collect(&self.regexes, |r| r.version_id == *vid),
            regex_examples: collect(&self.regex_examples, |r| regex_ids.contains(&r.regex_id)),
            lookups: collect(&self.lookups, |r| r.version_id == *vid),
            lookup_examples: collect(&self.lookup_examples, |r| {
                lookup_ids.contains(&r.lookup_id)
            }),
            synonyms: collect(&self.synonyms, |r| r.version_id == *vid),
            synonym_examples: collect(&self.synonym_examples, |r| {
                synonym_ids.contains(&r.synonym_id)
            }),
        }
    }
}

fn collect<R: Clone>(map: &BTreeMap<RowId, R>, pred: impl Fn(&R) -> bool) -> Vec<R> {
    map.values().filter(|r| pred(r)).cloned().collect()
}

fn unique<T: Ord + std::fmt::Debug>(
    items: impl Iterator<Item = T>,
    what: &str,
) -> StoreResult<()> {
    let mut seen = BTreeSet::new();
    for item in items {
        if seen.contains(&item) {
            return Err(StoreError::UniqueViolation(format!(
                "duplicate {what}: {item:?}"
            )));
        }
        seen.insert(item);
    }
    Ok(())
}

fn referenced(table: &str, by: &str) -> StoreError {
    StoreError::ReferentialIntegrity(format!("{table} rows are still referenced by {by}"))
}

/// In-memory configuration store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx + '_>> {
        let state = self.state.read().clone();
        Ok(Box::new(MemoryTx { store: self, state }))
    }
}

/// A snapshot transaction over an [`InMemoryStore`].
pub struct MemoryTx<'a> {
    store: &'a InMemoryStore,
    state: StoreState,
}

impl MemoryTx<'_> {
    fn version(&self, id: &VersionId) -> StoreResult<&VersionRow> {
        self.state
            .versions
            .get(id)
            .ok_or_else(|| StoreError::RowNotFound(format!("version {id}")))
    }
}

#[async_trait]
impl<'a> StoreTx for MemoryTx<'a> {
    async fn insert_project(&mut self, project: &ProjectRow) -> StoreResult<()> {
        if self.state.projects.values().any(|p| p.code == project.code) {
            return Err(StoreError::UniqueViolation(format!(
                "project code '{}'",
                project.code
            )));
        }
        self.state.projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn project_by_code(&mut self, code: &str) -> StoreResult<Option<ProjectRow>> {
        Ok(self
            .state
            .projects
            .values()
            .find(|p| p.code == code)
            .cloned())
    }

    async fn insert_language(&mut self, language: &LanguageRow) -> StoreResult<()> {
        if self.state.languages.values().any(|l| l.code == language.code) {
            return Err(StoreError::UniqueViolation(format!(
                "language code '{}'",
                language.code
            )));
        }
        self.state.languages.insert(language.id, language.clone());
        Ok(())
    }

    async fn language(&mut self, id: &LanguageId) -> StoreResult<Option<LanguageRow>> {
        Ok(self.state.languages.get(id).cloned())
    }

    async fn language_by_code(&mut self, code: &str) -> StoreResult<Option<LanguageRow>> {
        Ok(self
            .state
            .languages
            .values()
            .find(|l| l.code == code)
            .cloned())
    }

    async fn list_languages(&mut self) -> StoreResult<Vec<LanguageRow>> {
        let mut languages: Vec<_> = self.state.languages.values().cloned().collect();
        languages.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(languages)
    }

    async fn insert_version(&mut self, version: &VersionRow) -> StoreResult<()> {
        if !self.state.projects.contains_key(&version.project_id) {
            return Err(StoreError::ReferentialIntegrity(format!(
                "version references missing project {}",
                version.project_id
            )));
        }
        if let Some(parent) = &version.parent_version_id {
            if !self.state.versions.contains_key(parent) {
                return Err(StoreError::ReferentialIntegrity(format!(
                    "version references missing parent {parent}"
                )));
            }
        }
        let taken = self
            .state
            .versions
            .values()
            .any(|v| v.project_id == version.project_id && v.status == version.status);
        if taken {
            return Err(StoreError::UniqueViolation(format!(
                "version status '{}' already taken for project {}",
                version.status, version.project_id
            )));
        }
        self.state.versions.insert(version.id, version.clone());
        Ok(())
    }

    async fn update_version(&mut self, version: &VersionRow) -> StoreResult<()> {
        if !self.state.versions.contains_key(&version.id) {
            return Err(StoreError::RowNotFound(format!("version {}", version.id)));
        }
        let taken = self.state.versions.values().any(|v| {
            v.id != version.id && v.project_id == version.project_id && v.status == version.status
        });
        if taken {
            return Err(StoreError::UniqueViolation(format!(
                "version status '{}' already taken for project {}",
                version.status, version.project_id
            )));
        }
        self.state.versions.insert(version.id, version.clone());
        Ok(())
    }

    async fn delete_version(&mut self, id: &VersionId) -> StoreResult<()> {
        self.version(id)?;
        let graph = self.state.load_graph(id);
        if !graph.is_empty() {
            return Err(StoreError::ReferentialIntegrity(format!(
                "version {id} still owns {} graph rows",
                graph.row_count()
            )));
        }
        if self
            .state
            .versions
            .values()
            .any(|v| v.parent_version_id == Some(*id))
        {
            return Err(StoreError::ReferentialIntegrity(format!(
                "version {id} is still the parent of another version"
            )));
        }
        self.state.versions.remove(id);
        Ok(())
    }

    async fn version_by_status(
        &mut self,
        project_id: &ProjectId,
        status: VersionStatus,
    ) -> StoreResult<Option<VersionRow>> {
        Ok(self
            .state
            .versions
            .values()
            .find(|v| v.project_id == *project_id && v.status == status)
            .cloned())
    }

    async fn list_versions(&mut self, project_id: &ProjectId) -> StoreResult<Vec<VersionRow>> {
        let mut versions: Vec<_> = self
            .state
            .versions
            .values()
            .filter(|v| v.project_id == *project_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(versions)
    }

    async fn load_graph(&mut self, version_id: &VersionId) -> StoreResult<VersionGraph> {
        self.version(version_id)?;
        Ok(self.state.load_graph(version_id))
    }

    async fn insert_graph(
        &mut self,
        version_id: &VersionId,
        graph: &VersionGraph,
    ) -> StoreResult<()> {
        self.version(version_id)?;
        if !self.state.load_graph(version_id).is_empty() {
            return Err(StoreError::UniqueViolation(format!(
                "graph for version {version_id} is not empty"
            )));
        }
        validate_graph(&self.state, version_id, graph)?;

        // Row-id reuse would silently capture another version's rows; the
        // session is discarded on error, so detect-after-insert is safe.
        let s = &mut self.state;
        macro_rules! put {
            ($table:ident, $rows:expr) => {
                for r in $rows {
                    if s.$table.insert(r.id, r.clone()).is_some() {
                        return Err(StoreError::UniqueViolation(format!(
                            "row id {} reused in {}",
                            r.id,
                            stringify!($table)
                        )));
                    }
                }
            };
        }

        put!(version_languages, &graph.languages);
        if let Some(cfg) = &graph.session_config {
            if s.session_configs.insert(cfg.id, cfg.clone()).is_some() {
                return Err(StoreError::UniqueViolation(format!(
                    "row id {} reused in session_configs",
                    cfg.id
                )));
            }
        }
        put!(intents, &graph.intents);
        put!(intent_localizations, &graph.intent_localizations);
        put!(intent_examples, &graph.intent_examples);
        put!(entities, &graph.entities);
        put!(entity_roles, &graph.entity_roles);
        put!(entity_groups, &graph.entity_groups);
        put!(slots, &graph.slots);
        put!(slot_mappings, &graph.slot_mappings);
        put!(forms, &graph.forms);
        put!(form_required_slots, &graph.form_required_slots);
        put!(form_slot_mappings, &graph.form_slot_mappings);
        put!(actions, &graph.actions);
        put!(responses, &graph.responses);
        put!(response_variants, &graph.response_variants);
        put!(response_conditions, &graph.response_conditions);
        put!(response_components, &graph.response_components);
        put!(stories, &graph.stories);
        put!(story_steps, &graph.story_steps);
        put!(story_slot_events, &graph.story_slot_events);
        put!(story_step_entities, &graph.story_step_entities);
        put!(rules, &graph.rules);
        put!(rule_conditions, &graph.rule_conditions);
        put!(rule_steps, &graph.rule_steps);
        put!(rule_slot_events, &graph.rule_slot_events);
        put!(rule_step_entities, &graph.rule_step_entities);
        put!(regexes, &graph.regexes);
        put!(regex_examples, &graph.regex_examples);
        put!(lookups, &graph.lookups);
        put!(lookup_examples, &graph.lookup_examples);
        put!(synonyms, &graph.synonyms);
        put!(synonym_examples, &graph.synonym_examples);
        Ok(())
    }

    async fn graph_row_counts(
        &mut self,
        version_id: &VersionId,
    ) -> StoreResult<BTreeMap<&'static str, usize>> {
        Ok(self.state.load_graph(version_id).row_counts())
    }

    async fn delete_rule_step_entities(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let steps = self.state.rule_step_ids(version_id);
        Ok(drain(&mut self.state.rule_step_entities, |r| {
            steps.contains(&r.step_id)
        }))
    }

    async fn delete_rule_slot_events(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let steps = self.state.rule_step_ids(version_id);
        Ok(drain(&mut self.state.rule_slot_events, |r| {
            steps.contains(&r.step_id)
        }))
    }

    async fn delete_story_step_entities(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let steps = self.state.story_step_ids(version_id);
        Ok(drain(&mut self.state.story_step_entities, |r| {
            steps.contains(&r.step_id)
        }))
    }

    async fn delete_story_slot_events(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let steps = self.state.story_step_ids(version_id);
        Ok(drain(&mut self.state.story_slot_events, |r| {
            steps.contains(&r.step_id)
        }))
    }

    async fn delete_rule_steps(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let steps = self.state.rule_step_ids(version_id);
        if self
            .state
            .rule_slot_events
            .values()
            .any(|r| steps.contains(&r.step_id))
        {
            return Err(referenced("rule_steps", "rule_slot_events"));
        }
        if self
            .state
            .rule_step_entities
            .values()
            .any(|r| steps.contains(&r.step_id))
        {
            return Err(referenced("rule_steps", "rule_step_entities"));
        }
        Ok(drain(&mut self.state.rule_steps, |r| steps.contains(&r.id)))
    }

    async fn delete_story_steps(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let steps = self.state.story_step_ids(version_id);
        if self
            .state
            .story_slot_events
            .values()
            .any(|r| steps.contains(&r.step_id))
        {
            return Err(referenced("story_steps", "story_slot_events"));
        }
        if self
            .state
            .story_step_entities
            .values()
            .any(|r| steps.contains(&r.step_id))
        {
            return Err(referenced("story_steps", "story_step_entities"));
        }
        Ok(drain(&mut self.state.story_steps, |r| steps.contains(&r.id)))
    }

    async fn delete_rule_conditions(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let rules = self.state.rule_ids(version_id);
        Ok(drain(&mut self.state.rule_conditions, |r| {
            rules.contains(&r.rule_id)
        }))
    }

    async fn delete_rules(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let rules = self.state.rule_ids(version_id);
        if self
            .state
            .rule_steps
            .values()
            .any(|r| rules.contains(&r.rule_id))
        {
            return Err(referenced("rules", "rule_steps"));
        }
        if self
            .state
            .rule_conditions
            .values()
            .any(|r| rules.contains(&r.rule_id))
        {
            return Err(referenced("rules", "rule_conditions"));
        }
        Ok(drain(&mut self.state.rules, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_stories(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let stories = self.state.story_ids(version_id);
        if self
            .state
            .story_steps
            .values()
            .any(|r| stories.contains(&r.story_id))
        {
            return Err(referenced("stories", "story_steps"));
        }
        Ok(drain(&mut self.state.stories, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_form_slot_mappings(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let required = self.state.required_slot_ids(version_id);
        Ok(drain(&mut self.state.form_slot_mappings, |r| {
            required.contains(&r.required_slot_id)
        }))
    }

    async fn delete_form_required_slots(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let required = self.state.required_slot_ids(version_id);
        if self
            .state
            .form_slot_mappings
            .values()
            .any(|r| required.contains(&r.required_slot_id))
        {
            return Err(referenced("form_required_slots", "form_slot_mappings"));
        }
        Ok(drain(&mut self.state.form_required_slots, |r| {
            required.contains(&r.id)
        }))
    }

    async fn delete_forms(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let forms = self.state.form_ids(version_id);
        if self
            .state
            .form_required_slots
            .values()
            .any(|r| forms.contains(&r.form_id))
        {
            return Err(referenced("forms", "form_required_slots"));
        }
        if self
            .state
            .story_steps
            .values()
            .any(|r| r.form_id.map_or(false, |id| forms.contains(&id)))
        {
            return Err(referenced("forms", "story_steps"));
        }
        if self
            .state
            .rule_steps
            .values()
            .any(|r| r.form_id.map_or(false, |id| forms.contains(&id)))
        {
            return Err(referenced("forms", "rule_steps"));
        }
        Ok(drain(&mut self.state.forms, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_response_components(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let variants = self.state.variant_ids(version_id);
        Ok(drain(&mut self.state.response_components, |r| {
            variants.contains(&r.variant_id)
        }))
    }

    async fn delete_response_conditions(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let variants = self.state.variant_ids(version_id);
        Ok(drain(&mut self.state.response_conditions, |r| {
            variants.contains(&r.variant_id)
        }))
    }

    async fn delete_response_variants(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let variants = self.state.variant_ids(version_id);
        if self
            .state
            .response_conditions
            .values()
            .any(|r| variants.contains(&r.variant_id))
        {
            return Err(referenced("response_variants", "response_conditions"));
        }
        if self
            .state
            .response_components
            .values()
            .any(|r| variants.contains(&r.variant_id))
        {
            return Err(referenced("response_variants", "response_components"));
        }
        Ok(drain(&mut self.state.response_variants, |r| {
            variants.contains(&r.id)
        }))
    }

    async fn delete_responses(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let responses = self.state.response_ids(version_id);
        if self
            .state
            .response_variants
            .values()
            .any(|r| responses.contains(&r.response_id))
        {
            return Err(referenced("responses", "response_variants"));
        }
        if self
            .state
            .story_steps
            .values()
            .any(|r| r.response_id.map_or(false, |id| responses.contains(&id)))
        {
            return Err(referenced("responses", "story_steps"));
        }
        if self
            .state
            .rule_steps
            .values()
            .any(|r| r.response_id.map_or(false, |id| responses.contains(&id)))
        {
            return Err(referenced("responses", "rule_steps"));
        }
        Ok(drain(&mut self.state.responses, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_actions(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let actions = self.state.action_ids(version_id);
        if self
            .state
            .story_steps
            .values()
            .any(|r| r.action_id.map_or(false, |id| actions.contains(&id)))
        {
            return Err(referenced("actions", "story_steps"));
        }
        if self
            .state
            .rule_steps
            .values()
            .any(|r| r.action_id.map_or(false, |id| actions.contains(&id)))
        {
            return Err(referenced("actions", "rule_steps"));
        }
        Ok(drain(&mut self.state.actions, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_slot_mappings(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let slots = self.state.slot_ids(version_id);
        Ok(drain(&mut self.state.slot_mappings, |r| {
            slots.contains(&r.slot_id)
        }))
    }

    async fn delete_slots(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let slots = self.state.slot_ids(version_id);
        if self
            .state
            .slot_mappings
            .values()
            .any(|r| slots.contains(&r.slot_id))
        {
            return Err(referenced("slots", "slot_mappings"));
        }
        if self
            .state
            .form_required_slots
            .values()
            .any(|r| slots.contains(&r.slot_id))
        {
            return Err(referenced("slots", "form_required_slots"));
        }
        if self
            .state
            .story_slot_events
            .values()
            .any(|r| slots.contains(&r.slot_id))
        {
            return Err(referenced("slots", "story_slot_events"));
        }
        if self
            .state
            .rule_slot_events
            .values()
            .any(|r| slots.contains(&r.slot_id))
        {
            return Err(referenced("slots", "rule_slot_events"));
        }
        Ok(drain(&mut self.state.slots, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_regex_examples(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let regexes = self.state.regex_ids(version_id);
        Ok(drain(&mut self.state.regex_examples, |r| {
            regexes.contains(&r.regex_id)
        }))
    }

    async fn delete_regexes(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let regexes = self.state.regex_ids(version_id);
        if self
            .state
            .regex_examples
            .values()
            .any(|r| regexes.contains(&r.regex_id))
        {
            return Err(referenced("regexes", "regex_examples"));
        }
        Ok(drain(&mut self.state.regexes, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_lookup_examples(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let lookups = self.state.lookup_ids(version_id);
        Ok(drain(&mut self.state.lookup_examples, |r| {
            lookups.contains(&r.lookup_id)
        }))
    }

    async fn delete_lookups(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let lookups = self.state.lookup_ids(version_id);
        if self
            .state
            .lookup_examples
            .values()
            .any(|r| lookups.contains(&r.lookup_id))
        {
            return Err(referenced("lookups", "lookup_examples"));
        }
        Ok(drain(&mut self.state.lookups, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_synonym_examples(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let synonyms = self.state.synonym_ids(version_id);
        Ok(drain(&mut self.state.synonym_examples, |r| {
            synonyms.contains(&r.synonym_id)
        }))
    }

    async fn delete_synonyms(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let synonyms = self.state.synonym_ids(version_id);
        if self
            .state
            .synonym_examples
            .values()
            .any(|r| synonyms.contains(&r.synonym_id))
        {
            return Err(referenced("synonyms", "synonym_examples"));
        }
        Ok(drain(&mut self.state.synonyms, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_entity_roles(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let entities = self.state.entity_ids(version_id);
        Ok(drain(&mut self.state.entity_roles, |r| {
            entities.contains(&r.entity_id)
        }))
    }

    async fn delete_entity_groups(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let entities = self.state.entity_ids(version_id);
        Ok(drain(&mut self.state.entity_groups, |r| {
            entities.contains(&r.entity_id)
        }))
    }

    async fn delete_entities(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let entities = self.state.entity_ids(version_id);
        if self
            .state
            .entity_roles
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "entity_roles"));
        }
        if self
            .state
            .entity_groups
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "entity_groups"));
        }
        if self
            .state
            .slot_mappings
            .values()
            .any(|r| r.entity_id.map_or(false, |id| entities.contains(&id)))
        {
            return Err(referenced("entities", "slot_mappings"));
        }
        if self
            .state
            .form_slot_mappings
            .values()
            .any(|r| r.entity_id.map_or(false, |id| entities.contains(&id)))
        {
            return Err(referenced("entities", "form_slot_mappings"));
        }
        if self
            .state
            .story_step_entities
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "story_step_entities"));
        }
        if self
            .state
            .rule_step_entities
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "rule_step_entities"));
        }
        if self
            .state
            .regexes
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "regexes"));
        }
        if self
            .state
            .lookups
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "lookups"));
        }
        if self
            .state
            .synonyms
            .values()
            .any(|r| entities.contains(&r.entity_id))
        {
            return Err(referenced("entities", "synonyms"));
        }
        Ok(drain(&mut self.state.entities, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_intent_examples(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let localizations = self.state.localization_ids(version_id);
        Ok(drain(&mut self.state.intent_examples, |r| {
            localizations.contains(&r.localization_id)
        }))
    }

    async fn delete_intent_localizations(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let localizations = self.state.localization_ids(version_id);
        if self
            .state
            .intent_examples
            .values()
            .any(|r| localizations.contains(&r.localization_id))
        {
            return Err(referenced("intent_localizations", "intent_examples"));
        }
        Ok(drain(&mut self.state.intent_localizations, |r| {
            localizations.contains(&r.id)
        }))
    }

    async fn delete_intents(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        let intents = self.state.intent_ids(version_id);
        if self
            .state
            .intent_localizations
            .values()
            .any(|r| intents.contains(&r.intent_id))
        {
            return Err(referenced("intents", "intent_localizations"));
        }
        if self
            .state
            .story_steps
            .values()
            .any(|r| r.intent_id.map_or(false, |id| intents.contains(&id)))
        {
            return Err(referenced("intents", "story_steps"));
        }
        if self
            .state
            .rule_steps
            .values()
            .any(|r| r.intent_id.map_or(false, |id| intents.contains(&id)))
        {
            return Err(referenced("intents", "rule_steps"));
        }
        Ok(drain(&mut self.state.intents, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_version_languages(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        Ok(drain(&mut self.state.version_languages, |r| {
            r.version_id == *version_id
        }))
    }

    async fn delete_session_config(&mut self, version_id: &VersionId) -> StoreResult<usize> {
        Ok(drain(&mut self.state.session_configs, |r| {
            r.version_id == *version_id
        }))
    }

    async fn form_by_name(
        &mut self,
        version_id: &VersionId,
        name: &str,
    ) -> StoreResult<Option<FormRow>> {
        Ok(self
            .state
            .forms
            .values()
            .find(|f| f.version_id == *version_id && f.name == name)
            .cloned())
    }

    async fn slot_by_name(
        &mut self,
        version_id: &VersionId,
        name: &str,
    ) -> StoreResult<Option<SlotRow>> {
        Ok(self
            .state
            .slots
            .values()
            .find(|s| s.version_id == *version_id && s.name == name)
            .cloned())
    }

    async fn required_slots_for_form(
        &mut self,
        form_id: &RowId,
    ) -> StoreResult<Vec<FormRequiredSlotRow>> {
        let mut rows: Vec<_> = self
            .state
            .form_required_slots
            .values()
            .filter(|r| r.form_id == *form_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| (r.order, r.id));
        Ok(rows)
    }

    async fn insert_required_slot(&mut self, row: &FormRequiredSlotRow) -> StoreResult<()> {
        if !self.state.forms.contains_key(&row.form_id) {
            return Err(StoreError::ReferentialIntegrity(format!(
                "required slot references missing form {}",
                row.form_id
            )));
        }
        if !self.state.slots.contains_key(&row.slot_id) {
            return Err(StoreError::ReferentialIntegrity(format!(
                "required slot references missing slot {}",
                row.slot_id
            )));
        }
        let taken = self
            .state
            .form_required_slots
            .values()
            .any(|r| r.form_id == row.form_id && r.slot_id == row.slot_id);
        if taken {
            return Err(StoreError::UniqueViolation(format!(
                "slot {} already required by form {}",
                row.slot_id, row.form_id
            )));
        }
        self.state.form_required_slots.insert(row.id, row.clone());
        Ok(())
    }

    async fn update_required_slot(&mut self, row: &FormRequiredSlotRow) -> StoreResult<()> {
        if !self.state.form_required_slots.contains_key(&row.id) {
            return Err(StoreError::RowNotFound(format!(
                "required slot {}",
                row.id
            )));
        }
        self.state.form_required_slots.insert(row.id, row.clone());
        Ok(())
    }

    async fn delete_required_slot(&mut self, id: &RowId) -> StoreResult<()> {
        if self
            .state
            .form_slot_mappings
            .values()
            .any(|r| r.required_slot_id == *id)
        {
            return Err(referenced("form_required_slots", "form_slot_mappings"));
        }
        self.state
            .form_required_slots
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::RowNotFound(format!("required slot {id}")))
    }

    async fn delete_mappings_for_required_slot(&mut self, id: &RowId) -> StoreResult<usize> {
        Ok(drain(&mut self.state.form_slot_mappings, |r| {
            r.required_slot_id == *id
        }))
    }

    async fn story_step(&mut self, id: &RowId) -> StoreResult<Option<StoryStepRow>> {
        Ok(self.state.story_steps.get(id).cloned())
    }

    async fn alternation_group_steps(
        &mut self,
        group_id: &RowId,
    ) -> StoreResult<Vec<StoryStepRow>> {
        let mut rows: Vec<_> = self
            .state
            .story_steps
            .values()
            .filter(|s| s.alternation_group == Some(*group_id))
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.timeline_index, s.step_order, s.id));
        Ok(rows)
    }

    async fn delete_story_step(&mut self, id: &RowId) -> StoreResult<()> {
        if self
            .state
            .story_slot_events
            .values()
            .any(|r| r.step_id == *id)
        {
            return Err(referenced("story_steps", "story_slot_events"));
        }
        if self
            .state
            .story_step_entities
            .values()
            .any(|r| r.step_id == *id)
        {
            return Err(referenced("story_steps", "story_step_entities"));
        }
        self.state
            .story_steps
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::RowNotFound(format!("story step {id}")))
    }

    async fn delete_story_step_children(&mut self, step_id: &RowId) -> StoreResult<usize> {
        let events = drain(&mut self.state.story_slot_events, |r| {
            r.step_id == *step_id
        });
        let entities = drain(&mut self.state.story_step_entities, |r| {
            r.step_id == *step_id
        });
        Ok(events + entities)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let this = *self;
        *this.store.state.write() = this.state;
        Ok(())
    }
}

fn drain<R>(map: &mut BTreeMap<RowId, R>, pred: impl Fn(&R) -> bool) -> usize {
    let before = map.len();
    map.retain(|_, r| !pred(r));
    before - map.len()
}

/// Validate a graph before bulk insert: ownership, natural keys, and
/// foreign keys must all resolve inside the graph (or the language
/// registry for language references).
fn validate_graph(
    state: &StoreState,
    version_id: &VersionId,
    graph: &VersionGraph,
) -> StoreResult<()> {
    let owned = |vid: &VersionId, table: &str| -> StoreResult<()> {
        if vid != version_id {
            return Err(StoreError::ReferentialIntegrity(format!(
                "{table} row owned by foreign version {vid}"
            )));
        }
        Ok(())
    };

    for r in &graph.intents {
        owned(&r.version_id, "intents")?;
    }
    for r in &graph.entities {
        owned(&r.version_id, "entities")?;
    }
    for r in &graph.slots {
        owned(&r.version_id, "slots")?;
    }
    for r in &graph.forms {
        owned(&r.version_id, "forms")?;
    }
    for r in &graph.actions {
        owned(&r.version_id, "actions")?;
    }
    for r in &graph.responses {
        owned(&r.version_id, "responses")?;
    }
    for r in &graph.stories {
        owned(&r.version_id, "stories")?;
    }
    for r in &graph.rules {
        owned(&r.version_id, "rules")?;
    }
    for r in &graph.regexes {
        owned(&r.version_id, "regexes")?;
    }
    for r in &graph.lookups {
        owned(&r.version_id, "lookups")?;
    }
    for r in &graph.synonyms {
        owned(&r.version_id, "synonyms")?;
    }
    for r in &graph.languages {
        owned(&r.version_id, "version_languages")?;
        if !state.languages.contains_key(&r.language_id) {
            return Err(StoreError::ReferentialIntegrity(format!(
                "enabled language references unregistered language {}",
                r.language_id
            )));
        }
    }
    if let Some(cfg) = &graph.session_config {
        owned(&cfg.version_id, "session_configs")?;
    }

    unique(graph.intents.iter().map(|r| &r.name), "intent name")?;
    unique(graph.entities.iter().map(|r| &r.key), "entity key")?;
    unique(graph.slots.iter().map(|r| &r.name), "slot name")?;
    unique(graph.forms.iter().map(|r| &r.name), "form name")?;
    unique(graph.actions.iter().map(|r| &r.name), "action name")?;
    unique(graph.responses.iter().map(|r| &r.name), "response name")?;
    unique(graph.stories.iter().map(|r| &r.name), "story name")?;
    unique(graph.rules.iter().map(|r| &r.name), "rule name")?;
    unique(graph.regexes.iter().map(|r| &r.name), "regex name")?;
    unique(graph.lookups.iter().map(|r| &r.name), "lookup name")?;
    unique(
        graph
            .synonyms
            .iter()
            .map(|r| (&r.canonical_value, r.entity_id)),
        "synonym (canonical value, entity)",
    )?;
    unique(
        graph.languages.iter().map(|r| r.language_id),
        "enabled language",
    )?;
    unique(
        graph
            .intent_localizations
            .iter()
            .map(|r| (r.intent_id, r.language_id)),
        "intent localization (intent, language)",
    )?;
    unique(
        graph
            .form_required_slots
            .iter()
            .map(|r| (r.form_id, r.slot_id)),
        "required slot (form, slot)",
    )?;

    let intent_ids: BTreeSet<_> = graph.intents.iter().map(|r| r.id).collect();
    let localization_ids: BTreeSet<_> = graph.intent_localizations.iter().map(|r| r.id).collect();
    let entity_ids: BTreeSet<_> = graph.entities.iter().map(|r| r.id).collect();
    let slot_ids: BTreeSet<_> = graph.slots.iter().map(|r| r.id).collect();
    let form_ids: BTreeSet<_> = graph.forms.iter().map(|r| r.id).collect();
    let required_ids: BTreeSet<_> = graph.form_required_slots.iter().map(|r| r.id).collect();
    let action_ids: BTreeSet<_> = graph.actions.iter().map(|r| r.id).collect();
    let response_ids: BTreeSet<_> = graph.responses.iter().map(|r| r.id).collect();
    let variant_ids: BTreeSet<_> = graph.response_variants.iter().map(|r| r.id).collect();
    let story_ids: BTreeSet<_> = graph.stories.iter().map(|r| r.id).collect();
    let story_step_ids: BTreeSet<_> = graph.story_steps.iter().map(|r| r.id).collect();
    let rule_ids: BTreeSet<_> = graph.rules.iter().map(|r| r.id).collect();
    let rule_step_ids: BTreeSet<_> = graph.rule_steps.iter().map(|r| r.id).collect();
    let regex_ids: BTreeSet<_> = graph.regexes.iter().map(|r| r.id).collect();
    let lookup_ids: BTreeSet<_> = graph.lookups.iter().map(|r| r.id).collect();
    let synonym_ids: BTreeSet<_> = graph.synonyms.iter().map(|r| r.id).collect();

    let resolves = |ok: bool, what: &str| -> StoreResult<()> {
        if !ok {
            return Err(StoreError::ReferentialIntegrity(format!(
                "{what} does not resolve inside the graph"
            )));
        }
        Ok(())
    };

    for r in &graph.intent_localizations {
        resolves(intent_ids.contains(&r.intent_id), "localization intent")?;
        resolves(
            state.languages.contains_key(&r.language_id),
            "localization language",
        )?;
    }
    for r in &graph.intent_examples {
        resolves(
            localization_ids.contains(&r.localization_id),
            "example localization",
        )?;
    }
    for r in &graph.entity_roles {
        resolves(entity_ids.contains(&r.entity_id), "role entity")?;
    }
    for r in &graph.entity_groups {
        resolves(entity_ids.contains(&r.entity_id), "group entity")?;
    }
    for r in &graph.slot_mappings {
        resolves(slot_ids.contains(&r.slot_id), "mapping slot")?;
        if let Some(entity_id) = &r.entity_id {
            resolves(entity_ids.contains(entity_id), "mapping entity")?;
        }
    }
    for r in &graph.form_required_slots {
        resolves(form_ids.contains(&r.form_id), "required-slot form")?;
        resolves(slot_ids.contains(&r.slot_id), "required-slot slot")?;
    }
    for r in &graph.form_slot_mappings {
        resolves(
            required_ids.contains(&r.required_slot_id),
            "form mapping required slot",
        )?;
        if let Some(entity_id) = &r.entity_id {
            resolves(entity_ids.contains(entity_id), "form mapping entity")?;
        }
    }
    for r in &graph.response_variants {
        resolves(response_ids.contains(&r.response_id), "variant response")?;
        if let Some(language_id) = &r.language_id {
            resolves(state.languages.contains_key(language_id), "variant language")?;
        }
    }
    for r in &graph.response_conditions {
        resolves(variant_ids.contains(&r.variant_id), "condition variant")?;
    }
    for r in &graph.response_components {
        resolves(variant_ids.contains(&r.variant_id), "component variant")?;
    }
    for r in &graph.story_steps {
        resolves(story_ids.contains(&r.story_id), "step story")?;
        if let Some(id) = &r.intent_id {
            resolves(intent_ids.contains(id), "step intent")?;
        }
        if let Some(id) = &r.action_id {
            resolves(action_ids.contains(id), "step action")?;
        }
        if let Some(id) = &r.response_id {
            resolves(response_ids.contains(id), "step response")?;
        }
        if let Some(id) = &r.form_id {
            resolves(form_ids.contains(id), "step form")?;
        }
    }
    for r in &graph.story_slot_events {
        resolves(story_step_ids.contains(&r.step_id), "slot event step")?;
        resolves(slot_ids.contains(&r.slot_id), "slot event slot")?;
    }
    for r in &graph.story_step_entities {
        resolves(story_step_ids.contains(&r.step_id), "annotation step")?;
        resolves(entity_ids.contains(&r.entity_id), "annotation entity")?;
    }
    for r in &graph.rule_conditions {
        resolves(rule_ids.contains(&r.rule_id), "condition rule")?;
    }
    for r in &graph.rule_steps {
        resolves(rule_ids.contains(&r.rule_id), "step rule")?;
        if let Some(id) = &r.intent_id {
            resolves(intent_ids.contains(id), "step intent")?;
        }
        if let Some(id) = &r.action_id {
            resolves(action_ids.contains(id), "step action")?;
        }
        if let Some(id) = &r.response_id {
            resolves(response_ids.contains(id), "step response")?;
        }
        if let Some(id) = &r.form_id {
            resolves(form_ids.contains(id), "step form")?;
        }
    }
    for r in &graph.rule_slot_events {
        resolves(rule_step_ids.contains(&r.step_id), "slot event step")?;
        resolves(slot_ids.contains(&r.slot_id), "slot event slot")?;
    }
    for r in &graph.rule_step_entities {
        resolves(rule_step_ids.contains(&r.step_id), "annotation step")?;
        resolves(entity_ids.contains(&r.entity_id), "annotation entity")?;
    }
    for r in &graph.regexes {
        resolves(entity_ids.contains(&r.entity_id), "regex entity")?;
    }
    for r in &graph.regex_examples {
        resolves(regex_ids.contains(&r.regex_id), "pattern regex")?;
        resolves(state.languages.contains_key(&r.language_id), "pattern language")?;
    }
    for r in &graph.lookups {
        resolves(entity_ids.contains(&r.entity_id), "lookup entity")?;
    }
    for r in &graph.lookup_examples {
        resolves(lookup_ids.contains(&r.lookup_id), "value lookup")?;
        resolves(state.languages.contains_key(&r.language_id), "value language")?;
    }
    for r in &graph.synonyms {
        resolves(entity_ids.contains(&r.entity_id), "synonym entity")?;
    }
    for r in &graph.synonym_examples {
        resolves(synonym_ids.contains(&r.synonym_id), "surface form synonym")?;
        resolves(
            state.languages.contains_key(&r.language_id),
            "surface form language",
        )?;
    }

    Ok(())
}
