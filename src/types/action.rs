//! Custom actions.

use serde::{Deserialize, Serialize};

use super::ids::{RowId, VersionId};

/// A custom action, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Action name, unique per version.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}
