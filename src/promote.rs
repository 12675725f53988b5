//! Promotion and rollback: the three-version rotation.
//!
//! Both operations run inside one store session, so any failure at any step
//! leaves the pre-operation state fully intact; the session is simply
//! dropped uncommitted. Rotations on the same project are additionally
//! serialized through an in-flight set: a second concurrent rotation fails
//! with `Conflict` instead of interleaving erase/clone phases.

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::erase::erase_version_graph;
use crate::error::{KernelError, KernelResult};
use crate::guard::PromotionGuard;
use crate::registry::resolve_project;
use crate::replicate::clone_version_graph;
use crate::store::ConfigStore;
use crate::types::{ProjectId, VersionRow, VersionStatus};

/// Result of a successful promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionOutcome {
    /// Label now carried by the production version.
    pub production_label: String,
    /// Label of the freshly created draft.
    pub new_draft_label: String,
}

/// Result of a successful rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackOutcome {
    /// Label restored onto the production version.
    pub production_label: String,
}

/// Increment a version label of the exact form `v<N>`.
///
/// Any other label passes through unchanged.
pub fn increment_label(label: &str) -> String {
    if let Some(digits) = label.strip_prefix('v') {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = digits.parse::<u64>() {
                return format!("v{}", n + 1);
            }
        }
    }
    label.to_string()
}

/// Orchestrator for the promote and rollback rotations of a project.
pub struct PromotionOrchestrator<S: ConfigStore> {
    store: Arc<S>,
    guard: PromotionGuard,
    in_flight: Mutex<BTreeSet<ProjectId>>,
}

impl<S: ConfigStore> PromotionOrchestrator<S> {
    /// Create an orchestrator with the default guard.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_guard(store, PromotionGuard::default())
    }

    /// Create an orchestrator with a custom guard.
    pub fn with_guard(store: Arc<S>, guard: PromotionGuard) -> Self {
        Self {
            store,
            guard,
            in_flight: Mutex::new(BTreeSet::new()),
        }
    }

    /// Promote the draft to production.
    ///
    /// Rotation: draft graph becomes production, the previous production
    /// graph becomes the archived generation (discarding any older
    /// archive), and a fresh draft is cloned from the new production with
    /// an incremented label.
    pub async fn promote(&self, project_code: &str) -> KernelResult<PromotionOutcome> {
        let mut tx = self.store.begin().await?;
        let project = resolve_project(tx.as_mut(), project_code).await?;
        let _permit = self.acquire(project.id)?;

        let draft = tx
            .version_by_status(&project.id, VersionStatus::Draft)
            .await?
            .ok_or_else(|| {
                KernelError::not_found(format!("draft version for project '{project_code}'"))
            })?;
        let mut production = tx
            .version_by_status(&project.id, VersionStatus::Locked)
            .await?
            .ok_or_else(|| {
                KernelError::conflict(format!(
                    "production version missing for project '{project_code}'"
                ))
            })?;

        // Pre-flight gate. Aborting here has zero side effects.
        let draft_graph = tx.load_graph(&draft.id).await?;
        self.guard.validate(tx.as_mut(), &draft_graph).await?;

        let draft_label = draft.label.clone();
        let new_draft_label = increment_label(&draft_label);

        // Only one archived generation is retained.
        if let Some(archive) = tx
            .version_by_status(&project.id, VersionStatus::Archived)
            .await?
        {
            erase_version_graph(tx.as_mut(), &archive.id).await?;
            tx.delete_version(&archive.id).await?;
        }

        // Preserve the outgoing production graph as the new archive.
        let archive = VersionRow::new(project.id, production.label.clone(), VersionStatus::Archived);
        tx.insert_version(&archive).await?;
        clone_version_graph(tx.as_mut(), &production.id, &archive.id).await?;

        // Publish the draft graph in place of production's.
        erase_version_graph(tx.as_mut(), &production.id).await?;
        clone_version_graph(tx.as_mut(), &draft.id, &production.id).await?;
        production.label = draft_label;
        production.updated_at = chrono::Utc::now();
        tx.update_version(&production).await?;

        // Retire the promoted draft row.
        erase_version_graph(tx.as_mut(), &draft.id).await?;
        tx.delete_version(&draft.id).await?;

        // Seed the next draft from the just-published production.
        let new_draft = VersionRow::new(project.id, new_draft_label.clone(), VersionStatus::Draft)
            .with_parent(production.id);
        tx.insert_version(&new_draft).await?;
        clone_version_graph(tx.as_mut(), &production.id, &new_draft.id).await?;

        tx.commit().await?;
        tracing::info!(
            project_code,
            production_label = %production.label,
            new_draft_label = %new_draft.label,
            "Promotion successful"
        );
        Ok(PromotionOutcome {
            production_label: production.label,
            new_draft_label,
        })
    }

    /// Roll production back to the archived generation.
    ///
    /// Reverses the most recent promotion only: the archived graph replaces
    /// production's and the archive row is consumed. A second consecutive
    /// rollback fails with `Conflict` because only one generation of
    /// history is retained.
    pub async fn rollback(&self, project_code: &str) -> KernelResult<RollbackOutcome> {
        let mut tx = self.store.begin().await?;
        let project = resolve_project(tx.as_mut(), project_code).await?;
        let _permit = self.acquire(project.id)?;

        let production = tx
            .version_by_status(&project.id, VersionStatus::Locked)
            .await?;
        let archive = tx
            .version_by_status(&project.id, VersionStatus::Archived)
            .await?;
        let (mut production, archive) = match (production, archive) {
            (Some(p), Some(a)) => (p, a),
            _ => {
                return Err(KernelError::conflict(format!(
                    "no archived version available for rollback of project '{project_code}'"
                )))
            }
        };

        erase_version_graph(tx.as_mut(), &production.id).await?;
        clone_version_graph(tx.as_mut(), &archive.id, &production.id).await?;
        production.label = archive.label.clone();
        production.updated_at = chrono::Utc::now();
        tx.update_version(&production).await?;

        erase_version_graph(tx.as_mut(), &archive.id).await?;
        tx.delete_version(&archive.id).await?;

        tx.commit().await?;
        tracing::info!(
            project_code,
            production_label = %production.label,
            "Rollback successful"
        );
        Ok(RollbackOutcome {
            production_label: production.label,
        })
    }

    fn acquire(&self, project_id: ProjectId) -> KernelResult<RotationPermit<'_>> {
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(project_id) {
            return Err(KernelError::conflict(
                "a promotion or rollback is already in flight for this project",
            ));
        }
        Ok(RotationPermit {
            in_flight: &self.in_flight,
            project_id,
        })
    }
}

/// Releases the project's rotation slot on drop, success or failure alike.
struct RotationPermit<'a> {
    in_flight: &'a Mutex<BTreeSet<ProjectId>>,
    project_id: ProjectId,
}

impl Drop for RotationPermit<'_> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.project_id);
    }
}
