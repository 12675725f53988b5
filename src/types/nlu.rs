//! Regex features, lookup tables, and synonyms with per-language examples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{LanguageId, RowId, VersionId};

/// A regex feature, unique by name within its version. References an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Feature name, unique per version.
    pub name: String,
    /// Entity this feature extracts.
    pub entity_id: RowId,
}

/// A regex pattern for one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegexExampleRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning regex feature.
    pub regex_id: RowId,
    /// Target language.
    pub language_id: LanguageId,
    /// Pattern text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A lookup table, unique by name within its version. References an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Table name, unique per version.
    pub name: String,
    /// Entity this table extracts.
    pub entity_id: RowId,
}

/// A lookup value for one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupExampleRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning lookup table.
    pub lookup_id: RowId,
    /// Target language.
    pub language_id: LanguageId,
    /// Value text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A synonym mapping, unique per (version, canonical value, entity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Canonical value the synonyms map to.
    pub canonical_value: String,
    /// Entity the synonyms belong to.
    pub entity_id: RowId,
}

/// A synonym surface form for one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymExampleRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning synonym mapping.
    pub synonym_id: RowId,
    /// Target language.
    pub language_id: LanguageId,
    /// Surface form text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
