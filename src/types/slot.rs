//! Slots and slot mappings.
//!
//! A mapping describes how a slot obtains its runtime value. Mapping
//! conditions are modeled as tagged variants and converted to the loose
//! external document form only at export time.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use super::ids::{RowId, VersionId};

/// Value type of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    /// Free text.
    Text,
    /// Boolean.
    Bool,
    /// Floating point, optionally range-bounded.
    Float,
    /// List of values.
    List,
    /// One of a fixed value set.
    Categorical,
    /// Any JSON-compatible value.
    Any,
}

impl SlotType {
    /// Parse a slot type token.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "bool" => Some(Self::Bool),
            "float" => Some(Self::Float),
            "list" => Some(Self::List),
            "categorical" => Some(Self::Categorical),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Token as emitted in export documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::List => "list",
            Self::Categorical => "categorical",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a mapping sources its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    /// Fill from an extracted entity.
    FromEntity,
    /// Fill from the raw user message text.
    FromText,
    /// Fill with a fixed value when an intent matches.
    FromIntent,
    /// Fill with a fixed value when a trigger intent matches.
    FromTriggerIntent,
    /// Filled by a custom action.
    Custom,
}

impl MappingType {
    /// Parse a mapping type token.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "from_entity" => Some(Self::FromEntity),
            "from_text" => Some(Self::FromText),
            "from_intent" => Some(Self::FromIntent),
            "from_trigger_intent" => Some(Self::FromTriggerIntent),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Token as emitted in export documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FromEntity => "from_entity",
            Self::FromText => "from_text",
            Self::FromIntent => "from_intent",
            Self::FromTriggerIntent => "from_trigger_intent",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for MappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A condition restricting when a mapping applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingCondition {
    /// The named form loop must be active (`None` matches no active loop).
    ActiveLoop {
        /// Form name, or `None` for "no loop active".
        name: Option<String>,
    },
    /// The named slot must currently hold the given value.
    SlotEquals {
        /// Slot name.
        name: String,
        /// Expected value; `None` matches an unset slot.
        value: Option<String>,
    },
}

impl MappingCondition {
    /// Loose external document form of this condition.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Self::ActiveLoop { name } => json!({ "active_loop": name }),
            Self::SlotEquals { name, value } => json!({ "slot": name, "value": value }),
        }
    }
}

/// A slot, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Slot name, unique per version.
    pub name: String,
    /// Value type.
    pub slot_type: SlotType,
    /// Whether the slot influences dialogue prediction.
    pub influence_conversation: bool,
    /// Optional initial value.
    pub initial_value: Option<String>,
    /// Allowed values for categorical slots.
    pub values: Vec<String>,
    /// Lower bound for float slots.
    pub min_value: Option<f64>,
    /// Upper bound for float slots.
    pub max_value: Option<f64>,
}

/// A mapping attached directly to a slot.
///
/// The structured `conditions` list supersedes the legacy single
/// `active_loop` field; export prefers `conditions` when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotMappingRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning slot.
    pub slot_id: RowId,
    /// Value source kind.
    pub mapping_type: MappingType,
    /// Source entity for `from_entity` mappings.
    pub entity_id: Option<RowId>,
    /// Entity role filter.
    pub role: Option<String>,
    /// Entity group filter.
    pub group: Option<String>,
    /// Intent filter.
    pub intent: Option<String>,
    /// Negative intent filter.
    pub not_intent: Option<String>,
    /// Fixed value for intent-driven mappings.
    pub value: Option<String>,
    /// Structured mapping conditions.
    pub conditions: Vec<MappingCondition>,
    /// Legacy single active-loop condition.
    pub active_loop: Option<String>,
    /// Higher priority mappings are emitted first.
    pub priority: i32,
}
