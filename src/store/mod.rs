//! Storage backends for configuration graphs.
//!
//! The kernel never talks to a backend directly: every operation runs inside
//! a [`StoreTx`] session obtained from [`ConfigStore::begin`]. A session sees
//! a consistent snapshot; its writes become visible atomically on
//! [`StoreTx::commit`] and are discarded when the session is dropped. This is
//! the unit of work the promotion orchestrator threads through its rotation
//! steps, and the reason exporters can never observe a half-erased or
//! half-cloned graph.
//!
//! Implementations must guarantee deterministic ordering of results and must
//! behave like a store that enforces referential integrity without cascading
//! deletes: a delete that would strand referencing rows fails with
//! [`StoreError::ReferentialIntegrity`].

pub mod memory;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::types::{
    FormRequiredSlotRow, FormRow, LanguageId, LanguageRow, ProjectId, ProjectRow, RowId, SlotRow,
    StoryStepRow, VersionGraph, VersionId, VersionRow, VersionStatus,
};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type shared by all store backends.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// A targeted row does not exist.
    #[error("Row not found: {0}")]
    RowNotFound(String),

    /// A unique constraint was violated.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A write would violate referential integrity.
    #[error("Referential integrity violated: {0}")]
    ReferentialIntegrity(String),

    /// Backend-specific failure.
    #[error("Backend failure: {0}")]
    Backend(String),
}

/// A configuration graph store.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Open a transactional session against the current store state.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx + '_>>;
}

/// A transactional session over the store.
///
/// All reads observe the session's snapshot plus its own writes. Dropping
/// the session without committing discards every write.
#[async_trait]
pub trait StoreTx: Send {
    // -- projects and languages --------------------------------------------

    /// Insert a project. Fails on duplicate project code.
    async fn insert_project(&mut self, project: &ProjectRow) -> StoreResult<()>;

    /// Fetch a project by its external code.
    async fn project_by_code(&mut self, code: &str) -> StoreResult<Option<ProjectRow>>;

    /// Insert a language registry entry. Fails on duplicate code.
    async fn insert_language(&mut self, language: &LanguageRow) -> StoreResult<()>;

    /// Fetch a language by id.
    async fn language(&mut self, id: &LanguageId) -> StoreResult<Option<LanguageRow>>;

    /// Fetch a language by code.
    async fn language_by_code(&mut self, code: &str) -> StoreResult<Option<LanguageRow>>;

    /// All registered languages, ordered by code.
    async fn list_languages(&mut self) -> StoreResult<Vec<LanguageRow>>;

    // -- versions ----------------------------------------------------------

    /// Insert a version row. Fails if the (project, status) pair is taken.
    async fn insert_version(&mut self, version: &VersionRow) -> StoreResult<()>;

    /// Update a version row (label, status, parent pointer, timestamps).
    async fn update_version(&mut self, version: &VersionRow) -> StoreResult<()>;

    /// Delete a version row. The version's graph must already be empty.
    async fn delete_version(&mut self, id: &VersionId) -> StoreResult<()>;

    /// Fetch the single version of a project in the given status.
    async fn version_by_status(
        &mut self,
        project_id: &ProjectId,
        status: VersionStatus,
    ) -> StoreResult<Option<VersionRow>>;

    /// All versions of a project, ordered by creation time descending.
    async fn list_versions(&mut self, project_id: &ProjectId) -> StoreResult<Vec<VersionRow>>;

    // -- whole-graph access ------------------------------------------------

    /// Load every version-scoped row of one version.
    async fn load_graph(&mut self, version_id: &VersionId) -> StoreResult<VersionGraph>;

    /// Insert a full graph under the given version.
    ///
    /// Rejects rows owned by a different version, natural-key collisions
    /// within the version, and references to ids absent from the graph or
    /// the language registry.
    async fn insert_graph(
        &mut self,
        version_id: &VersionId,
        graph: &VersionGraph,
    ) -> StoreResult<()>;

    /// Row count per version-scoped table for one version.
    async fn graph_row_counts(
        &mut self,
        version_id: &VersionId,
    ) -> StoreResult<BTreeMap<&'static str, usize>>;

    // -- per-table version-scoped deletes ----------------------------------
    //
    // Each delete removes every row of one table belonging to the version
    // and returns the number of rows removed. The eraser calls these in its
    // fixed phase order; an out-of-order call fails with
    // `ReferentialIntegrity` instead of stranding rows.

    /// Delete rule step entity annotations.
    async fn delete_rule_step_entities(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete rule slot events.
    async fn delete_rule_slot_events(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete story step entity annotations.
    async fn delete_story_step_entities(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete story slot events.
    async fn delete_story_slot_events(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete rule steps.
    async fn delete_rule_steps(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete story steps.
    async fn delete_story_steps(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete rule conditions.
    async fn delete_rule_conditions(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete rules.
    async fn delete_rules(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete stories.
    async fn delete_stories(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete form slot mappings.
    async fn delete_form_slot_mappings(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete form required slots.
    async fn delete_form_required_slots(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete forms.
    async fn delete_forms(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete response components.
    async fn delete_response_components(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete response conditions.
    async fn delete_response_conditions(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete response variants.
    async fn delete_response_variants(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete responses.
    async fn delete_responses(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete actions.
    async fn delete_actions(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete slot mappings.
    async fn delete_slot_mappings(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete slots.
    async fn delete_slots(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete regex patterns.
    async fn delete_regex_examples(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete regex features.
    async fn delete_regexes(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete lookup values.
    async fn delete_lookup_examples(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete lookup tables.
    async fn delete_lookups(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete synonym surface forms.
    async fn delete_synonym_examples(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete synonym mappings.
    async fn delete_synonyms(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete entity roles.
    async fn delete_entity_roles(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete entity groups.
    async fn delete_entity_groups(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete entities.
    async fn delete_entities(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete intent examples.
    async fn delete_intent_examples(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete intent localizations.
    async fn delete_intent_localizations(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete intents.
    async fn delete_intents(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete enabled-language rows.
    async fn delete_version_languages(&mut self, version_id: &VersionId) -> StoreResult<usize>;
    /// Delete the session config.
    async fn delete_session_config(&mut self, version_id: &VersionId) -> StoreResult<usize>;

    // -- targeted rows for ordering maintenance ----------------------------

    /// Fetch a form by name within a version.
    async fn form_by_name(
        &mut self,
        version_id: &VersionId,
        name: &str,
    ) -> StoreResult<Option<FormRow>>;

    /// Fetch a slot by name within a version.
    async fn slot_by_name(
        &mut self,
        version_id: &VersionId,
        name: &str,
    ) -> StoreResult<Option<SlotRow>>;

    /// Required slots of one form, ordered ascending by position.
    async fn required_slots_for_form(
        &mut self,
        form_id: &RowId,
    ) -> StoreResult<Vec<FormRequiredSlotRow>>;

    /// Insert a required-slot row. Fails on a duplicate (form, slot) pair.
    async fn insert_required_slot(&mut self, row: &FormRequiredSlotRow) -> StoreResult<()>;

    /// Update a required-slot row (order, required flag).
    async fn update_required_slot(&mut self, row: &FormRequiredSlotRow) -> StoreResult<()>;

    /// Delete a required-slot row. Its mappings must already be gone.
    async fn delete_required_slot(&mut self, id: &RowId) -> StoreResult<()>;

    /// Delete the mappings of one required-slot row.
    async fn delete_mappings_for_required_slot(&mut self, id: &RowId) -> StoreResult<usize>;

    /// Fetch a story step by id.
    async fn story_step(&mut self, id: &RowId) -> StoreResult<Option<StoryStepRow>>;

    /// Every step sharing the given alternation group.
    async fn alternation_group_steps(
        &mut self,
        group_id: &RowId,
    ) -> StoreResult<Vec<StoryStepRow>>;

    /// Delete one story step row. Its attached children must already be gone.
    async fn delete_story_step(&mut self, id: &RowId) -> StoreResult<()>;

    /// Delete the slot events and entity annotations attached to one step.
    async fn delete_story_step_children(&mut self, step_id: &RowId) -> StoreResult<usize>;

    // -- transaction control -----------------------------------------------

    /// Make every write of this session visible atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

pub use memory::InMemoryStore;
