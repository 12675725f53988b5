//! Graph eraser: remove a version's entire graph without cascades.
//!
//! The backing store does not cascade deletes, so erasure walks the table
//! dependencies in reverse: leaves first, parents last. The phase order
//! below is a correctness contract; reversing or merging phases strands
//! referencing rows and fails on any store that enforces integrity.
//!
//! 1.  Step-attached leaves (entity annotations, slot events) for rules and
//!     stories.
//! 2.  Rule and story step rows (they hold the FKs into actions, responses,
//!     forms, and intents).
//! 3.  Rule conditions, then rule and story parent rows.
//! 4.  Form slot mappings, required slots, forms.
//! 5.  Response components and conditions, variants, responses.
//! 6.  Actions.
//! 7.  Slot mappings, slots.
//! 8.  Regex/lookup/synonym examples, then their parent rows. These
//!     reference entities and must die before phase 9.
//! 9.  Entity roles and groups, entities.
//! 10. Intent examples, localizations, intents.
//! 11. Version-scoped config: enabled languages, session config.

use crate::error::KernelResult;
use crate::store::StoreTx;
use crate::types::VersionId;

/// Erase every graph row belonging to `version_id`.
///
/// The version row itself survives; callers delete it separately when the
/// whole version goes away. Returns the total number of rows removed.
pub async fn erase_version_graph(
    tx: &mut dyn StoreTx,
    version_id: &VersionId,
) -> KernelResult<usize> {
    let mut removed = 0;

    // Phase 1: step-attached leaves.
    removed += tx.delete_rule_step_entities(version_id).await?;
    removed += tx.delete_rule_slot_events(version_id).await?;
    removed += tx.delete_story_step_entities(version_id).await?;
    removed += tx.delete_story_slot_events(version_id).await?;

    // Phase 2: step rows.
    removed += tx.delete_rule_steps(version_id).await?;
    removed += tx.delete_story_steps(version_id).await?;

    // Phase 3: conditions, then rule and story parents.
    removed += tx.delete_rule_conditions(version_id).await?;
    removed += tx.delete_rules(version_id).await?;
    removed += tx.delete_stories(version_id).await?;

    // Phase 4: forms and their children.
    removed += tx.delete_form_slot_mappings(version_id).await?;
    removed += tx.delete_form_required_slots(version_id).await?;
    removed += tx.delete_forms(version_id).await?;

    // Phase 5: responses and their children.
    removed += tx.delete_response_components(version_id).await?;
    removed += tx.delete_response_conditions(version_id).await?;
    removed += tx.delete_response_variants(version_id).await?;
    removed += tx.delete_responses(version_id).await?;

    // Phase 6: actions.
    removed += tx.delete_actions(version_id).await?;

    // Phase 7: slots and their mappings.
    removed += tx.delete_slot_mappings(version_id).await?;
    removed += tx.delete_slots(version_id).await?;

    // Phase 8: regex/lookup/synonym, before entities.
    removed += tx.delete_regex_examples(version_id).await?;
    removed += tx.delete_regexes(version_id).await?;
    removed += tx.delete_lookup_examples(version_id).await?;
    removed += tx.delete_lookups(version_id).await?;
    removed += tx.delete_synonym_examples(version_id).await?;
    removed += tx.delete_synonyms(version_id).await?;

    // Phase 9: entities and their children.
    removed += tx.delete_entity_roles(version_id).await?;
    removed += tx.delete_entity_groups(version_id).await?;
    removed += tx.delete_entities(version_id).await?;

    // Phase 10: intents and their children.
    removed += tx.delete_intent_examples(version_id).await?;
    removed += tx.delete_intent_localizations(version_id).await?;
    removed += tx.delete_intents(version_id).await?;

    // Phase 11: version-scoped config.
    removed += tx.delete_version_languages(version_id).await?;
    removed += tx.delete_session_config(version_id).await?;

    tracing::info!(%version_id, removed, "Erased version graph");
    Ok(removed)
}
