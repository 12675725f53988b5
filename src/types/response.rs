//! Responses, variants, and variant components.

use serde::{Deserialize, Serialize};

use super::condition::StateCondition;
use super::ids::{LanguageId, RowId, VersionId};

/// A bot response, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Response name, unique per version.
    pub name: String,
}

/// One renderable variant of a response.
///
/// Variants are emitted in descending priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseVariantRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning response.
    pub response_id: RowId,
    /// Optional target language for this variant.
    pub language_id: Option<LanguageId>,
    /// Higher priority variants are emitted first.
    pub priority: i32,
}

/// A condition restricting when a variant is eligible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseConditionRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning variant.
    pub variant_id: RowId,
    /// The condition itself.
    pub condition: StateCondition,
    /// Emission order within the variant.
    pub order_index: i32,
}

/// Typed payload of a response component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePayload {
    /// Plain message text.
    Text(String),
    /// Quick-reply buttons.
    Buttons(Vec<ResponseButton>),
    /// Image URL.
    Image(String),
    /// Arbitrary attachment object.
    Attachment(serde_json::Value),
    /// Arbitrary custom payload forwarded to the channel.
    Custom(serde_json::Value),
}

/// A quick-reply button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseButton {
    /// Button caption.
    pub title: String,
    /// Payload sent when pressed.
    pub payload: String,
}

/// One component of a variant's rendered output.
///
/// Components are merged positionally (by `order_index`) into one output
/// object per variant; a later component of the same kind wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseComponentRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning variant.
    pub variant_id: RowId,
    /// Typed payload.
    pub payload: ResponsePayload,
    /// Merge order within the variant.
    pub order_index: i32,
}
