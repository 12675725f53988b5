//! Graph replicator: deep-clone one version's graph into another.
//!
//! Replication produces an isomorphic copy with fresh identifiers. Every
//! cross-reference is resolved through one [`IdTranslationTable`] keyed by
//! (reference kind, old id); the table is filled incrementally as each kind
//! is cloned, which is why the walk must follow [`DEPENDENCY_ORDER`]:
//! independent kinds first, kinds that reference them after.
//!
//! Alternation-group identifiers are not row ids; they form a separate
//! namespace in the same table, remapped once per group and reused by every
//! step sharing the group, so the cloned steps still form one either/or
//! unit.
//!
//! A foreign key whose target is absent from the translation table means
//! the source graph is already corrupt. That is a fatal
//! [`InvariantViolation`](crate::KernelError::InvariantViolation), never a
//! recoverable condition.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{KernelError, KernelResult};
use crate::store::StoreTx;
use crate::types::{RowId, VersionGraph, VersionId};

/// Kinds of identifiers remapped during replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefKind {
    /// Entities.
    Entity,
    /// Intents.
    Intent,
    /// Intent localizations.
    IntentLocalization,
    /// Slots.
    Slot,
    /// Forms.
    Form,
    /// Form required slots.
    FormRequiredSlot,
    /// Actions.
    Action,
    /// Responses.
    Response,
    /// Response variants.
    ResponseVariant,
    /// Stories.
    Story,
    /// Story steps.
    StoryStep,
    /// Rules.
    Rule,
    /// Rule steps.
    RuleStep,
    /// Regex features.
    Regex,
    /// Lookup tables.
    Lookup,
    /// Synonym mappings.
    Synonym,
    /// Alternation groups (a namespace of their own, not row ids).
    AlternationGroup,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entity => "entity",
            Self::Intent => "intent",
            Self::IntentLocalization => "intent_localization",
            Self::Slot => "slot",
            Self::Form => "form",
            Self::FormRequiredSlot => "form_required_slot",
            Self::Action => "action",
            Self::Response => "response",
            Self::ResponseVariant => "response_variant",
            Self::Story => "story",
            Self::StoryStep => "story_step",
            Self::Rule => "rule",
            Self::RuleStep => "rule_step",
            Self::Regex => "regex",
            Self::Lookup => "lookup",
            Self::Synonym => "synonym",
            Self::AlternationGroup => "alternation_group",
        };
        write!(f, "{name}")
    }
}

/// Fixed clone order over top-level kinds.
///
/// Entities and intents are independent; slots may reference entities;
/// forms reference slots; actions and responses are independent; stories
/// and rules reference intents, actions, responses, forms, slots, and
/// entities; regex/lookup/synonym reference entities. Erasure walks the
/// same dependencies in reverse.
pub const DEPENDENCY_ORDER: &[RefKind] = &[
    RefKind::Entity,
    RefKind::Intent,
    RefKind::Slot,
    RefKind::Form,
    RefKind::Action,
    RefKind::Response,
    RefKind::Story,
    RefKind::Rule,
    RefKind::Regex,
    RefKind::Lookup,
    RefKind::Synonym,
];

/// Identifier translation table built during one replication.
///
/// Keyed by (kind, old id) so one table serves every kind, including the
/// alternation-group namespace.
#[derive(Debug, Default)]
pub struct IdTranslationTable {
    map: BTreeMap<(RefKind, RowId), RowId>,
}

impl IdTranslationTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id for (kind, old) and record the translation.
    pub fn allocate(&mut self, kind: RefKind, old: RowId) -> RowId {
        let fresh = RowId::fresh();
        self.map.insert((kind, old), fresh);
        fresh
    }

    /// Get-or-allocate: used for alternation groups, where the first member
    /// step allocates the new group id and later members reuse it.
    pub fn allocate_shared(&mut self, kind: RefKind, old: RowId) -> RowId {
        if let Some(existing) = self.map.get(&(kind, old)) {
            return *existing;
        }
        self.allocate(kind, old)
    }

    /// Resolve a required reference. A miss is a corrupt source graph.
    pub fn resolve(&self, kind: RefKind, old: RowId) -> KernelResult<RowId> {
        self.map.get(&(kind, old)).copied().ok_or_else(|| {
            KernelError::invariant(format!(
                "{kind} reference {old} has no counterpart in the translation table"
            ))
        })
    }

    /// Resolve an optional reference; `None` passes through unchanged.
    pub fn resolve_opt(&self, kind: RefKind, old: Option<RowId>) -> KernelResult<Option<RowId>> {
        match old {
            Some(id) => Ok(Some(self.resolve(kind, id)?)),
            None => Ok(None),
        }
    }

    /// Number of recorded translations.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Produce an isomorphic copy of `source` owned by `target`, with fresh
/// identifiers and all internal references remapped.
pub fn replicate_graph(source: &VersionGraph, target: VersionId) -> KernelResult<VersionGraph> {
    let mut table = IdTranslationTable::new();
    let mut out = VersionGraph::default();

    // Version-scoped config carries no remappable references.
    for row in &source.languages {
        let mut cloned = row.clone();
        cloned.id = RowId::fresh();
        cloned.version_id = target;
        out.languages.push(cloned);
    }
    if let Some(cfg) = &source.session_config {
        let mut cloned = cfg.clone();
        cloned.id = RowId::fresh();
        cloned.version_id = target;
        out.session_config = Some(cloned);
    }

    for kind in DEPENDENCY_ORDER {
        match kind {
            RefKind::Entity => clone_entities(source, target, &mut table, &mut out)?,
            RefKind::Intent => clone_intents(source, target, &mut table, &mut out)?,
            RefKind::Slot => clone_slots(source, target, &mut table, &mut out)?,
            RefKind::Form => clone_forms(source, target, &mut table, &mut out)?,
            RefKind::Action => clone_actions(source, target, &mut table, &mut out)?,
            RefKind::Response => clone_responses(source, target, &mut table, &mut out)?,
            RefKind::Story => clone_stories(source, target, &mut table, &mut out)?,
            RefKind::Rule => clone_rules(source, target, &mut table, &mut out)?,
            RefKind::Regex => clone_regexes(source, target, &mut table, &mut out)?,
            RefKind::Lookup => clone_lookups(source, target, &mut table, &mut out)?,
            RefKind::Synonym => clone_synonyms(source, target, &mut table, &mut out)?,
            _ => unreachable!("nested kinds are cloned with their parent"),
        }
    }

    tracing::debug!(
        translations = table.len(),
        rows = out.row_count(),
        "Replicated configuration graph"
    );
    Ok(out)
}

/// Load `source_id`'s graph, replicate it, and insert the copy under
/// `target_id`. Returns the number of rows written.
pub async fn clone_version_graph(
    tx: &mut dyn StoreTx,
    source_id: &VersionId,
    target_id: &VersionId,
) -> KernelResult<usize> {
    let source = tx.load_graph(source_id).await?;
    let cloned = replicate_graph(&source, *target_id)?;
    let rows = cloned.row_count();
    tx.insert_graph(target_id, &cloned).await?;
    tracing::info!(%source_id, %target_id, rows, "Cloned version graph");
    Ok(rows)
}

fn clone_entities(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for entity in &source.entities {
        let new_id = table.allocate(RefKind::Entity, entity.id);
        let mut cloned = entity.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.entities.push(cloned);
    }
    for role in &source.entity_roles {
        let mut cloned = role.clone();
        cloned.id = RowId::fresh();
        cloned.entity_id = table.resolve(RefKind::Entity, role.entity_id)?;
        out.entity_roles.push(cloned);
    }
    for group in &source.entity_groups {
        let mut cloned = group.clone();
        cloned.id = RowId::fresh();
        cloned.entity_id = table.resolve(RefKind::Entity, group.entity_id)?;
        out.entity_groups.push(cloned);
    }
    Ok(())
}

fn clone_intents(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for intent in &source.intents {
        let new_id = table.allocate(RefKind::Intent, intent.id);
        let mut cloned = intent.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.intents.push(cloned);
    }
    for localization in &source.intent_localizations {
        let new_id = table.allocate(RefKind::IntentLocalization, localization.id);
        let mut cloned = localization.clone();
        cloned.id = new_id;
        cloned.intent_id = table.resolve(RefKind::Intent, localization.intent_id)?;
        out.intent_localizations.push(cloned);
    }
    for example in &source.intent_examples {
        let mut cloned = example.clone();
        cloned.id = RowId::fresh();
        cloned.localization_id =
            table.resolve(RefKind::IntentLocalization, example.localization_id)?;
        out.intent_examples.push(cloned);
    }
    Ok(())
}

fn clone_slots(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for slot in &source.slots {
        let new_id = table.allocate(RefKind::Slot, slot.id);
        let mut cloned = slot.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.slots.push(cloned);
    }
    for mapping in &source.slot_mappings {
        let mut cloned = mapping.clone();
        cloned.id = RowId::fresh();
        cloned.slot_id = table.resolve(RefKind::Slot, mapping.slot_id)?;
        cloned.entity_id = table.resolve_opt(RefKind::Entity, mapping.entity_id)?;
        out.slot_mappings.push(cloned);
    }
    Ok(())
}

fn clone_forms(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for form in &source.forms {
        let new_id = table.allocate(RefKind::Form, form.id);
        let mut cloned = form.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.forms.push(cloned);
    }
    for required in &source.form_required_slots {
        let new_id = table.allocate(RefKind::FormRequiredSlot, required.id);
        let mut cloned = required.clone();
        cloned.id = new_id;
        cloned.form_id = table.resolve(RefKind::Form, required.form_id)?;
        cloned.slot_id = table.resolve(RefKind::Slot, required.slot_id)?;
        out.form_required_slots.push(cloned);
    }
    for mapping in &source.form_slot_mappings {
        let mut cloned = mapping.clone();
        cloned.id = RowId::fresh();
        cloned.required_slot_id =
            table.resolve(RefKind::FormRequiredSlot, mapping.required_slot_id)?;
        cloned.entity_id = table.resolve_opt(RefKind::Entity, mapping.entity_id)?;
        out.form_slot_mappings.push(cloned);
    }
    Ok(())
}

fn clone_actions(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for action in &source.actions {
        let new_id = table.allocate(RefKind::Action, action.id);
        let mut cloned = action.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.actions.push(cloned);
    }
    Ok(())
}

fn clone_responses(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for response in &source.responses {
        let new_id = table.allocate(RefKind::Response, response.id);
        let mut cloned = response.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.responses.push(cloned);
    }
    for variant in &source.response_variants {
        let new_id = table.allocate(RefKind::ResponseVariant, variant.id);
        let mut cloned = variant.clone();
        cloned.id = new_id;
        cloned.response_id = table.resolve(RefKind::Response, variant.response_id)?;
        out.response_variants.push(cloned);
    }
    for condition in &source.response_conditions {
        let mut cloned = condition.clone();
        cloned.id = RowId::fresh();
        cloned.variant_id = table.resolve(RefKind::ResponseVariant, condition.variant_id)?;
        out.response_conditions.push(cloned);
    }
    for component in &source.response_components {
        let mut cloned = component.clone();
        cloned.id = RowId::fresh();
        cloned.variant_id = table.resolve(RefKind::ResponseVariant, component.variant_id)?;
        out.response_components.push(cloned);
    }
    Ok(())
}

fn clone_stories(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for story in &source.stories {
        let new_id = table.allocate(RefKind::Story, story.id);
        let mut cloned = story.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.stories.push(cloned);
    }
    for step in &source.story_steps {
        let new_id = table.allocate(RefKind::StoryStep, step.id);
        let mut cloned = step.clone();
        cloned.id = new_id;
        cloned.story_id = table.resolve(RefKind::Story, step.story_id)?;
        cloned.intent_id = table.resolve_opt(RefKind::Intent, step.intent_id)?;
        cloned.action_id = table.resolve_opt(RefKind::Action, step.action_id)?;
        cloned.response_id = table.resolve_opt(RefKind::Response, step.response_id)?;
        cloned.form_id = table.resolve_opt(RefKind::Form, step.form_id)?;
        cloned.alternation_group = step
            .alternation_group
            .map(|group| table.allocate_shared(RefKind::AlternationGroup, group));
        out.story_steps.push(cloned);
    }
    for event in &source.story_slot_events {
        let mut cloned = event.clone();
        cloned.id = RowId::fresh();
        cloned.step_id = table.resolve(RefKind::StoryStep, event.step_id)?;
        cloned.slot_id = table.resolve(RefKind::Slot, event.slot_id)?;
        out.story_slot_events.push(cloned);
    }
    for annotation in &source.story_step_entities {
        let mut cloned = annotation.clone();
        cloned.id = RowId::fresh();
        cloned.step_id = table.resolve(RefKind::StoryStep, annotation.step_id)?;
        cloned.entity_id = table.resolve(RefKind::Entity, annotation.entity_id)?;
        out.story_step_entities.push(cloned);
    }
    Ok(())
}

fn clone_rules(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for rule in &source.rules {
        let new_id = table.allocate(RefKind::Rule, rule.id);
        let mut cloned = rule.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        out.rules.push(cloned);
    }
    for condition in &source.rule_conditions {
        let mut cloned = condition.clone();
        cloned.id = RowId::fresh();
        cloned.rule_id = table.resolve(RefKind::Rule, condition.rule_id)?;
        out.rule_conditions.push(cloned);
    }
    for step in &source.rule_steps {
        let new_id = table.allocate(RefKind::RuleStep, step.id);
        let mut cloned = step.clone();
        cloned.id = new_id;
        cloned.rule_id = table.resolve(RefKind::Rule, step.rule_id)?;
        cloned.intent_id = table.resolve_opt(RefKind::Intent, step.intent_id)?;
        cloned.action_id = table.resolve_opt(RefKind::Action, step.action_id)?;
        cloned.response_id = table.resolve_opt(RefKind::Response, step.response_id)?;
        cloned.form_id = table.resolve_opt(RefKind::Form, step.form_id)?;
        out.rule_steps.push(cloned);
    }
    for event in &source.rule_slot_events {
        let mut cloned = event.clone();
        cloned.id = RowId::fresh();
        cloned.step_id = table.resolve(RefKind::RuleStep, event.step_id)?;
        cloned.slot_id = table.resolve(RefKind::Slot, event.slot_id)?;
        out.rule_slot_events.push(cloned);
    }
    for annotation in &source.rule_step_entities {
        let mut cloned = annotation.clone();
        cloned.id = RowId::fresh();
        cloned.step_id = table.resolve(RefKind::RuleStep, annotation.step_id)?;
        cloned.entity_id = table.resolve(RefKind::Entity, annotation.entity_id)?;
        out.rule_step_entities.push(cloned);
    }
    Ok(())
}

fn clone_regexes(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for regex in &source.regexes {
        let new_id = table.allocate(RefKind::Regex, regex.id);
        let mut cloned = regex.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        cloned.entity_id = table.resolve(RefKind::Entity, regex.entity_id)?;
        out.regexes.push(cloned);
    }
    for example in &source.regex_examples {
        let mut cloned = example.clone();
        cloned.id = RowId::fresh();
        cloned.regex_id = table.resolve(RefKind::Regex, example.regex_id)?;
        out.regex_examples.push(cloned);
    }
    Ok(())
}

fn clone_lookups(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for lookup in &source.lookups {
        let new_id = table.allocate(RefKind::Lookup, lookup.id);
        let mut cloned = lookup.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        cloned.entity_id = table.resolve(RefKind::Entity, lookup.entity_id)?;
        out.lookups.push(cloned);
    }
    for example in &source.lookup_examples {
        let mut cloned = example.clone();
        cloned.id = RowId::fresh();
        cloned.lookup_id = table.resolve(RefKind::Lookup, example.lookup_id)?;
        out.lookup_examples.push(cloned);
    }
    Ok(())
}

fn clone_synonyms(
    source: &VersionGraph,
    target: VersionId,
    table: &mut IdTranslationTable,
    out: &mut VersionGraph,
) -> KernelResult<()> {
    for synonym in &source.synonyms {
        let new_id = table.allocate(RefKind::Synonym, synonym.id);
        let mut cloned = synonym.clone();
        cloned.id = new_id;
        cloned.version_id = target;
        cloned.entity_id = table.resolve(RefKind::Entity, synonym.entity_id)?;
        out.synonyms.push(cloned);
    }
    for example in &source.synonym_examples {
        let mut cloned = example.clone();
        cloned.id = RowId::fresh();
        cloned.synonym_id = table.resolve(RefKind::Synonym, example.synonym_id)?;
        out.synonym_examples.push(cloned);
    }
    Ok(())
}
