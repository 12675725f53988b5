//! Rules: conditioned, ordered step sequences.
//!
//! Rule steps share the story step kinds except checkpoints, and never
//! belong to alternation groups.

use serde::{Deserialize, Serialize};

use super::condition::StateCondition;
use super::ids::{RowId, VersionId};
use super::story::StepKind;

/// A rule, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Rule name, unique per version.
    pub name: String,
}

/// A pre-condition that must hold before the rule applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConditionRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning rule.
    pub rule_id: RowId,
    /// The condition itself.
    pub condition: StateCondition,
    /// Emission order within the rule.
    pub order_index: i32,
}

/// One step of a rule, ordered by `step_order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStepRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning rule.
    pub rule_id: RowId,
    /// Position within the rule.
    pub step_order: i32,
    /// Step kind (checkpoints are not valid in rules).
    pub kind: StepKind,
    /// Referenced intent for intent steps.
    pub intent_id: Option<RowId>,
    /// Referenced custom action for action steps.
    pub action_id: Option<RowId>,
    /// Referenced response for action steps.
    pub response_id: Option<RowId>,
    /// Referenced form for action steps.
    pub form_id: Option<RowId>,
    /// Form name for active-loop steps (`None` deactivates).
    pub active_loop: Option<String>,
}

/// A slot-was-set event attached to a rule slot step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSlotEventRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning step.
    pub step_id: RowId,
    /// Referenced slot.
    pub slot_id: RowId,
    /// Value the slot was set to.
    pub value: Option<String>,
}

/// An entity annotation attached to a rule intent step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleStepEntityRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning step.
    pub step_id: RowId,
    /// Annotated entity.
    pub entity_id: RowId,
    /// Expected entity value.
    pub value: Option<String>,
    /// Optional role.
    pub role: Option<String>,
    /// Optional group.
    pub group: Option<String>,
}
