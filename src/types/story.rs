//! Stories and their ordered steps.
//!
//! A step is one of five kinds. Action steps reference exactly one of an
//! action, a response, or a form. Intent steps may carry entity annotations
//! and may belong to an alternation group: the set of steps sharing one
//! `alternation_group` id forms a single either/or unit that is created and
//! deleted together and folded into one `or:` block on export.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{RowId, VersionId};

/// Kind of a story or rule step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A user intent, optionally with entity annotations.
    Intent,
    /// A bot action (custom action, response utterance, or form activation).
    Action,
    /// Slot-was-set events.
    Slot,
    /// Form loop activation or deactivation.
    ActiveLoop,
    /// A named checkpoint (stories only).
    Checkpoint,
}

impl StepKind {
    /// Parse a step kind token.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "intent" => Some(Self::Intent),
            "action" => Some(Self::Action),
            "slot" => Some(Self::Slot),
            "active_loop" => Some(Self::ActiveLoop),
            "checkpoint" => Some(Self::Checkpoint),
            _ => None,
        }
    }

    /// Token form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intent => "intent",
            Self::Action => "action",
            Self::Slot => "slot",
            Self::ActiveLoop => "active_loop",
            Self::Checkpoint => "checkpoint",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A story, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Story name, unique per version.
    pub name: String,
}

/// One step of a story.
///
/// Steps order by `(timeline_index, step_order)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStepRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning story.
    pub story_id: RowId,
    /// Timeline lane for branching stories.
    pub timeline_index: i32,
    /// Position within the timeline.
    pub step_order: i32,
    /// Step kind.
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
    /// Checkpoint name for checkpoint steps.
    pub checkpoint: Option<String>,
    /// Alternation group membership for intent steps.
    pub alternation_group: Option<RowId>,
}

/// A slot-was-set event attached to a slot step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySlotEventRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning step.
    pub step_id: RowId,
    /// Referenced slot.
    pub slot_id: RowId,
    /// Value the slot was set to.
    pub value: Option<String>,
}

/// An entity annotation attached to an intent step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStepEntityRow {
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
