//! Version registry: locating the one version per (project, status).
//!
//! The registry is the only component that resolves external addresses
//! (project code + status token) into version rows, and the place where the
//! exactly-one-per-status invariant is materialized: project creation seeds
//! one empty draft and one empty production version, and every later
//! rotation goes through the promotion orchestrator.

use std::sync::Arc;

use crate::error::{KernelError, KernelResult};
use crate::store::{ConfigStore, StoreError, StoreTx};
use crate::types::{
    LanguageRow, ProjectRow, VersionRow, VersionStatus,
};

/// Label given to the initial draft version of a new project.
pub const INITIAL_DRAFT_LABEL: &str = "v1";

/// Label given to the initial (empty) production version of a new project.
pub const INITIAL_PRODUCTION_LABEL: &str = "v0";

/// Registry over projects and their versions.
pub struct VersionRegistry<S: ConfigStore> {
    store: Arc<S>,
}

impl<S: ConfigStore> VersionRegistry<S> {
    /// Create a registry over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a project with its seed versions: an empty draft labeled
    /// `v1` and an empty production labeled `v0`.
    pub async fn create_project(
        &self,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> KernelResult<ProjectRow> {
        let code = code.into();
        let mut tx = self.store.begin().await?;

        if tx.project_by_code(&code).await?.is_some() {
            return Err(KernelError::conflict(format!(
                "project with code '{code}' already exists"
            )));
        }

        let project = ProjectRow {
            id: crate::types::ProjectId::fresh(),
            code,
            name: name.into(),
            created_at: chrono::Utc::now(),
        };
        tx.insert_project(&project).await?;

        tx.insert_version(&VersionRow::new(
            project.id,
            INITIAL_DRAFT_LABEL,
            VersionStatus::Draft,
        ))
        .await?;
        tx.insert_version(&VersionRow::new(
            project.id,
            INITIAL_PRODUCTION_LABEL,
            VersionStatus::Locked,
        ))
        .await?;

        tx.commit().await?;
        tracing::info!(project_code = %project.code, "Created project with seed versions");
        Ok(project)
    }

    /// Register a language.
    pub async fn register_language(
        &self,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> KernelResult<LanguageRow> {
        let language = LanguageRow {
            id: crate::types::LanguageId::fresh(),
            code: code.into(),
            name: name.into(),
        };
        let mut tx = self.store.begin().await?;
        tx.insert_language(&language).await.map_err(|e| match e {
            StoreError::UniqueViolation(msg) => KernelError::conflict(msg),
            other => other.into(),
        })?;
        tx.commit().await?;
        Ok(language)
    }

    /// Resolve a project by code.
    pub async fn project(&self, code: &str) -> KernelResult<ProjectRow> {
        let mut tx = self.store.begin().await?;
        resolve_project(tx.as_mut(), code).await
    }

    /// Resolve the version addressed by (project code, status token).
    pub async fn version(&self, code: &str, status: VersionStatus) -> KernelResult<VersionRow> {
        let mut tx = self.store.begin().await?;
        resolve_version(tx.as_mut(), code, status).await
    }

    /// All versions of a project, newest first.
    pub async fn list_versions(&self, code: &str) -> KernelResult<Vec<VersionRow>> {
        let mut tx = self.store.begin().await?;
        let project = resolve_project(tx.as_mut(), code).await?;
        Ok(tx.list_versions(&project.id).await?)
    }
}

/// Resolve a project inside an existing session.
pub(crate) async fn resolve_project(
    tx: &mut dyn StoreTx,
    code: &str,
) -> KernelResult<ProjectRow> {
    tx.project_by_code(code)
        .await?
        .ok_or_else(|| KernelError::not_found(format!("project '{code}'")))
}

/// Resolve a version inside an existing session.
pub(crate) async fn resolve_version(
    tx: &mut dyn StoreTx,
    code: &str,
    status: VersionStatus,
) -> KernelResult<VersionRow> {
    let project = resolve_project(tx, code).await?;
    tx.version_by_status(&project.id, status)
        .await?
        .ok_or_else(|| {
            KernelError::not_found(format!("version with status '{status}' for project '{code}'"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_create_project_seeds_versions() {
        let store = Arc::new(InMemoryStore::new());
        let registry = VersionRegistry::new(Arc::clone(&store));

        registry.create_project("acme", "Acme Bot").await.unwrap();

        let draft = registry
            .version("acme", VersionStatus::Draft)
            .await
            .unwrap();
        let production = registry
            .version("acme", VersionStatus::Locked)
            .await
            .unwrap();

        assert_eq!(draft.label, "v1");
        assert_eq!(production.label, "v0");
        assert!(matches!(
            registry
                .version("acme", VersionStatus::Archived)
                .await
                .unwrap_err(),
            KernelError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_project_code_conflicts() {
        let store = Arc::new(InMemoryStore::new());
        let registry = VersionRegistry::new(store);

        registry.create_project("acme", "Acme Bot").await.unwrap();
        let err = registry
            .create_project("acme", "Other")
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unknown_project_not_found() {
        let store = Arc::new(InMemoryStore::new());
        let registry = VersionRegistry::new(store);

        let err = registry.project("ghost").await.unwrap_err();
        assert!(matches!(err, KernelError::NotFound(_)));
    }
}
