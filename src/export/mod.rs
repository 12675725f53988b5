//! Dialogue exporters: read-only serializers over one version's graph.
//!
//! Four logically independent documents (domain, NLU-per-language, stories,
//! rules) plus the combined payload and the packaged bundle. Exports are
//! addressed by project code and status token and are permitted for `draft`
//! and `locked` only. Each export runs in its own store session, so it sees
//! a consistent snapshot and can never observe a half-rotated graph.
//!
//! Determinism: collections without an explicit order field sort by natural
//! key; collections with one sort by that field (priority descending for
//! response variants and slot mappings, step order ascending). The same
//! graph always yields byte-identical documents.

pub mod bundle;
pub mod domain;
pub mod nlu;
pub mod rules;
pub mod steps;
pub mod stories;

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{KernelError, KernelResult};
use crate::guard::DEFAULT_MIN_INTENT_EXAMPLES;
use crate::registry::resolve_version;
use crate::store::{ConfigStore, StoreTx};
use crate::types::{LanguageRow, VersionGraph, VersionRow, VersionStatus};

pub use bundle::{BundleManifest, CombinedExport, ExportBundle};
pub use domain::{build_domain, DomainDocument};
pub use nlu::{build_nlu, NluBlock, NluDocument};
pub use rules::{build_rules, RuleExport, RulesDocument};
pub use steps::{EntityAnnotation, StepExport};
pub use stories::{build_stories, StoriesDocument, StoryExport};

/// Render any export document as YAML.
pub fn to_yaml<T: Serialize>(document: &T) -> KernelResult<String> {
    Ok(serde_yaml::to_string(document)?)
}

/// Exporter facade over a store.
pub struct DialogueExporter<S: ConfigStore> {
    store: Arc<S>,
    minimum_examples: usize,
}

impl<S: ConfigStore> DialogueExporter<S> {
    /// Create an exporter with the default minimum-examples threshold.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            minimum_examples: DEFAULT_MIN_INTENT_EXAMPLES,
        }
    }

    /// Override the minimum-examples threshold for NLU exports.
    pub fn with_minimum_examples(mut self, minimum_examples: usize) -> Self {
        self.minimum_examples = minimum_examples;
        self
    }

    /// Export the domain document.
    pub async fn domain(
        &self,
        project_code: &str,
        status: VersionStatus,
    ) -> KernelResult<DomainDocument> {
        let mut tx = self.store.begin().await?;
        let (_, graph) = self.resolve(tx.as_mut(), project_code, status).await?;
        Ok(build_domain(&graph))
    }

    /// Export the stories document.
    pub async fn stories(
        &self,
        project_code: &str,
        status: VersionStatus,
    ) -> KernelResult<StoriesDocument> {
        let mut tx = self.store.begin().await?;
        let (_, graph) = self.resolve(tx.as_mut(), project_code, status).await?;
        Ok(build_stories(&graph))
    }

    /// Export the rules document.
    pub async fn rules(
        &self,
        project_code: &str,
        status: VersionStatus,
    ) -> KernelResult<RulesDocument> {
        let mut tx = self.store.begin().await?;
        let (_, graph) = self.resolve(tx.as_mut(), project_code, status).await?;
        Ok(build_rules(&graph))
    }

    /// Export the NLU document for one language.
    pub async fn nlu(
        &self,
        project_code: &str,
        status: VersionStatus,
        language_code: &str,
    ) -> KernelResult<NluDocument> {
        let mut tx = self.store.begin().await?;
        let (_, graph) = self.resolve(tx.as_mut(), project_code, status).await?;
        let language = tx
            .language_by_code(language_code)
            .await?
            .ok_or_else(|| KernelError::not_found(format!("language '{language_code}'")))?;
        if !graph
            .languages
            .iter()
            .any(|l| l.language_id == language.id)
        {
            return Err(KernelError::validation(format!(
                "language '{language_code}' is not enabled for this version"
            )));
        }
        build_nlu(&graph, &language, self.minimum_examples)
    }

    /// Export every document of one version in a single payload.
    ///
    /// Languages whose NLU export fails validation are skipped, matching
    /// the best-effort semantics of a whole-project export.
    pub async fn combined(
        &self,
        project_code: &str,
        status: VersionStatus,
    ) -> KernelResult<CombinedExport> {
        let mut tx = self.store.begin().await?;
        let (version, graph) = self.resolve(tx.as_mut(), project_code, status).await?;
        let languages = enabled_languages(tx.as_mut(), &graph).await?;
        if languages.is_empty() {
            return Err(KernelError::validation(
                "no languages configured for this version",
            ));
        }

        let mut nlu = BTreeMap::new();
        for language in &languages {
            match build_nlu(&graph, language, self.minimum_examples) {
                Ok(document) => {
                    nlu.insert(language.code.clone(), document);
                }
                Err(KernelError::ValidationFailed(reason)) => {
                    tracing::debug!(
                        language = %language.code,
                        reason = %reason,
                        "Skipping language in combined export"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        Ok(CombinedExport {
            project_code: project_code.to_string(),
            version_status: status,
            version_label: version.label,
            languages: languages.into_iter().map(|l| l.code).collect(),
            domain: build_domain(&graph),
            stories: build_stories(&graph),
            rules: build_rules(&graph),
            nlu,
        })
    }

    /// Export the packaged bundle: all documents plus boilerplate runtime
    /// configuration and a readme, with a hash manifest.
    pub async fn bundle(
        &self,
        project_code: &str,
        status: VersionStatus,
        include_config: bool,
    ) -> KernelResult<ExportBundle> {
        let combined = self.combined(project_code, status).await?;
        bundle::assemble_bundle(&combined, include_config)
    }

    async fn resolve(
        &self,
        tx: &mut dyn StoreTx,
        project_code: &str,
        status: VersionStatus,
    ) -> KernelResult<(VersionRow, VersionGraph)> {
        if !status.is_exportable() {
            return Err(KernelError::validation(format!(
                "version status '{status}' is not exportable"
            )));
        }
        let version = resolve_version(tx, project_code, status).await?;
        let graph = tx.load_graph(&version.id).await?;
        Ok((version, graph))
    }
}

/// Enabled languages of a graph, default language first, then code order.
async fn enabled_languages(
    tx: &mut dyn StoreTx,
    graph: &VersionGraph,
) -> KernelResult<Vec<LanguageRow>> {
    let mut rows = Vec::new();
    for enabled in &graph.languages {
        let language = tx.language(&enabled.language_id).await?.ok_or_else(|| {
            KernelError::invariant(format!(
                "enabled language {} is not registered",
                enabled.language_id
            ))
        })?;
        rows.push((enabled.is_default, language));
    }
    rows.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.code.cmp(&b.1.code)));
    Ok(rows.into_iter().map(|(_, language)| language).collect())
}
