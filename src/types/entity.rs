//! Entities with their roles and groups.

use serde::{Deserialize, Serialize};

use super::ids::{RowId, VersionId};

/// An extracted entity kind, unique by key within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Entity key, unique per version.
    pub key: String,
    /// Extractor type label (e.g. `text`).
    pub entity_type: String,
    /// Whether regex features feed this entity.
    pub use_regex: bool,
    /// Whether lookup tables feed this entity.
    pub use_lookup: bool,
    /// Whether the entity influences dialogue prediction.
    pub influence_conversation: bool,
}

/// A role an entity can take, unique per (entity, role).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRoleRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning entity.
    pub entity_id: RowId,
    /// Role name.
    pub role: String,
}

/// A group an entity can belong to, unique per (entity, group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityGroupRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning entity.
    pub entity_id: RowId,
    /// Group name.
    pub group_name: String,
}
