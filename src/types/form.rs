//! Forms with ordered required slots and their mappings.

use serde::{Deserialize, Serialize};

use super::ids::{RowId, VersionId};
use super::slot::MappingType;

/// A form, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Form name, unique per version.
    pub name: String,
    /// Intent names ignored while the form is active.
    pub ignored_intents: Vec<String>,
}

/// A slot required by a form, unique per (form, slot).
///
/// `order` values form a contiguous 1-based sequence per form; removal of a
/// row re-packs the remaining sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormRequiredSlotRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning form.
    pub form_id: RowId,
    /// Referenced slot.
    pub slot_id: RowId,
    /// 1-based position within the form.
    pub order: u32,
    /// Whether the slot must be filled before submission.
    pub required: bool,
}

/// A mapping attached to a form required slot.
///
/// Form mappings have no `custom` kind and no per-mapping conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSlotMappingRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning required-slot row.
    pub required_slot_id: RowId,
    /// Value source kind.
    pub mapping_type: MappingType,
    /// Source entity for `from_entity` mappings.
    pub entity_id: Option<RowId>,
    /// Intent filter.
    pub intent: Option<String>,
    /// Negative intent filter.
    pub not_intent: Option<String>,
    /// Fixed value for intent-driven mappings.
    pub value: Option<String>,
}
