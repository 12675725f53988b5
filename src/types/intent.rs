//! Intents with per-language localizations and training examples.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{LanguageId, RowId, VersionId};

/// A user intent, unique by name within its version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Intent name, unique per version.
    pub name: String,
}

/// Localization of an intent for one language, unique per (intent, language).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentLocalizationRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning intent.
    pub intent_id: RowId,
    /// Target language.
    pub language_id: LanguageId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A single training example under one localization.
///
/// Export order is creation order, tie-broken by row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentExampleRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning localization.
    pub localization_id: RowId,
    /// Example text.
    pub text: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
