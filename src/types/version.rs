//! Projects, versions, and version-scoped configuration rows.
//!
//! A project always holds exactly one version per status. Drafts are mutated
//! freely; production (`locked`) and archived graphs are only ever replaced
//! wholesale by the promotion orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{LanguageId, ProjectId, RowId, VersionId};

/// Lifecycle status of a version.
///
/// Production versions are stored and addressed with the `locked` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Freely mutable working copy.
    Draft,
    /// The published (production) generation.
    Locked,
    /// The single retained previous generation.
    Archived,
}

impl VersionStatus {
    /// Parse a status token. Only the literal set `draft`/`locked`/`archived`
    /// is accepted.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "locked" => Some(Self::Locked),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Status token as stored and addressed externally.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Locked => "locked",
            Self::Archived => "archived",
        }
    }

    /// Whether graphs in this status accept mutation.
    pub fn is_mutable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Whether graphs in this status may be exported.
    pub fn is_exportable(&self) -> bool {
        matches!(self, Self::Draft | Self::Locked)
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A project owning one configuration graph per version status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRow {
    /// Unique project identifier.
    pub id: ProjectId,
    /// External project code, unique across projects.
    pub code: String,
    /// Human-readable project name.
    pub name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Entry in the global language registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRow {
    /// Unique language identifier.
    pub id: LanguageId,
    /// Language code (e.g. `en`), unique across languages.
    pub code: String,
    /// Human-readable language name.
    pub name: String,
}

/// One generation of a configuration graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRow {
    /// Unique version identifier.
    pub id: VersionId,
    /// Owning project.
    pub project_id: ProjectId,
    /// The version this one was branched from, if any.
    pub parent_version_id: Option<VersionId>,
    /// Human-facing label (e.g. `v3`).
    pub label: String,
    /// Lifecycle status. Exactly one version per (project, status).
    pub status: VersionStatus,
    /// Optional author attribution.
    pub created_by: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl VersionRow {
    /// Create a new version row with both timestamps set to `now`.
    pub fn new(project_id: ProjectId, label: impl Into<String>, status: VersionStatus) -> Self {
        let now = Utc::now();
        Self {
            id: VersionId::fresh(),
            project_id,
            parent_version_id: None,
            label: label.into(),
            status,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the parent version pointer.
    pub fn with_parent(mut self, parent: VersionId) -> Self {
        self.parent_version_id = Some(parent);
        self
    }
}

/// A language enabled for one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionLanguageRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version.
    pub version_id: VersionId,
    /// Enabled language.
    pub language_id: LanguageId,
    /// Whether this is the version's default language.
    pub is_default: bool,
}

/// Runtime session behavior for one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfigRow {
    /// Row identifier.
    pub id: RowId,
    /// Owning version (at most one config per version).
    pub version_id: VersionId,
    /// Session expiration time in minutes.
    pub session_expiration_time: i64,
    /// Whether slot values survive into a new session.
    pub carry_over_slots_to_new_session: bool,
}

impl SessionConfigRow {
    /// Create a config with the runtime defaults (60 minutes, carry over).
    pub fn with_defaults(version_id: VersionId) -> Self {
        Self {
            id: RowId::fresh(),
            version_id,
            session_expiration_time: 60,
            carry_over_slots_to_new_session: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tokens() {
        assert_eq!(VersionStatus::from_str("draft"), Some(VersionStatus::Draft));
        assert_eq!(VersionStatus::from_str("locked"), Some(VersionStatus::Locked));
        assert_eq!(
            VersionStatus::from_str("archived"),
            Some(VersionStatus::Archived)
        );
        // The external token set is closed; "production" is not a token.
        assert_eq!(VersionStatus::from_str("production"), None);
        assert_eq!(VersionStatus::from_str("LOCKED"), None);
    }

    #[test]
    fn test_status_capabilities() {
        assert!(VersionStatus::Draft.is_mutable());
        assert!(!VersionStatus::Locked.is_mutable());
        assert!(!VersionStatus::Archived.is_mutable());

        assert!(VersionStatus::Draft.is_exportable());
        assert!(VersionStatus::Locked.is_exportable());
        assert!(!VersionStatus::Archived.is_exportable());
    }

    #[test]
    fn test_session_config_defaults() {
        let cfg = SessionConfigRow::with_defaults(VersionId::fresh());
        assert_eq!(cfg.session_expiration_time, 60);
        assert!(cfg.carry_over_slots_to_new_session);
    }
}
