//! Combined export and the packaged bundle.
//!
//! The bundle is the complete file set a runtime dialogue engine trains
//! from: the domain document, story and rule data, one NLU file per
//! enabled language, boilerplate runtime configuration, and a readme. A
//! manifest carries per-file canonical hashes and a bundle id derived from
//! them, so two exports of identical graphs produce identical manifests.

use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use super::domain::DomainDocument;
use super::nlu::NluDocument;
use super::rules::RulesDocument;
use super::stories::StoriesDocument;
use super::to_yaml;
use crate::canonical::canonical_hash_hex;
use crate::error::KernelResult;
use crate::types::VersionStatus;

/// All documents of one version in a single payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedExport {
    /// Project code.
    pub project_code: String,
    /// Status token of the exported version.
    pub version_status: VersionStatus,
    /// Label of the exported version.
    pub version_label: String,
    /// Enabled language codes, default language first.
    pub languages: Vec<String>,
    /// Domain document.
    pub domain: DomainDocument,
    /// Stories document.
    pub stories: StoriesDocument,
    /// Rules document.
    pub rules: RulesDocument,
    /// NLU documents keyed by language code. Languages that fail the
    /// minimum-examples gate are absent.
    pub nlu: BTreeMap<String, NluDocument>,
}

/// Manifest over a packaged bundle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BundleManifest {
    /// Identifier derived from the file hashes.
    pub bundle_id: String,
    /// Document schema version.
    pub version: String,
    /// Project code.
    pub project_code: String,
    /// Label of the exported version.
    pub version_label: String,
    /// Status token of the exported version.
    pub version_status: VersionStatus,
    /// Enabled language codes, default language first.
    pub languages: Vec<String>,
    /// Canonical hash per file path.
    pub file_hashes: BTreeMap<String, String>,
    /// Unix timestamp when the bundle was generated.
    pub generated_at: i64,
}

/// A packaged export: file contents by path, plus the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    /// File contents keyed by relative path.
    pub files: BTreeMap<String, String>,
    /// Bundle manifest.
    pub manifest: BundleManifest,
}

impl ExportBundle {
    /// Suggested archive file name for this bundle.
    pub fn archive_name(&self) -> String {
        format!(
            "{}_{}_{}_export.zip",
            self.manifest.project_code, self.manifest.version_label, self.manifest.version_status
        )
    }
}

pub(super) fn assemble_bundle(
    combined: &CombinedExport,
    include_config: bool,
) -> KernelResult<ExportBundle> {
    let mut files = BTreeMap::new();
    files.insert("domain.yml".to_string(), to_yaml(&combined.domain)?);
    files.insert("data/stories.yml".to_string(), to_yaml(&combined.stories)?);
    files.insert("data/rules.yml".to_string(), to_yaml(&combined.rules)?);

    for code in &combined.languages {
        let path = format!("data/nlu_{code}.yml");
        match combined.nlu.get(code) {
            Some(doc) => {
                files.insert(path, to_yaml(doc)?);
            }
            None => {
                files.insert(
                    path,
                    format!(
                        "# No NLU data for language '{code}'\nversion: '{}'\nnlu: []\n",
                        crate::DOCUMENT_SCHEMA_VERSION
                    ),
                );
            }
        }
    }

    if include_config {
        let default_language = combined
            .languages
            .first()
            .map(String::as_str)
            .unwrap_or("en");
        files.insert("config.yml".to_string(), pipeline_config(default_language)?);
        files.insert("endpoints.yml".to_string(), endpoints_config()?);
        files.insert("credentials.yml".to_string(), credentials_config()?);
    }
    files.insert("README.md".to_string(), readme(combined));

    let file_hashes: BTreeMap<String, String> = files
        .iter()
        .map(|(path, contents)| (path.clone(), canonical_hash_hex(contents)))
        .collect();
    let bundle_id = canonical_hash_hex(&(
        &combined.project_code,
        &combined.version_label,
        &file_hashes,
    ));

    Ok(ExportBundle {
        manifest: BundleManifest {
            bundle_id,
            version: crate::DOCUMENT_SCHEMA_VERSION.to_string(),
            project_code: combined.project_code.clone(),
            version_label: combined.version_label.clone(),
            version_status: combined.version_status,
            languages: combined.languages.clone(),
            file_hashes,
            generated_at: chrono::Utc::now().timestamp(),
        },
        files,
    })
}

fn pipeline_config(language: &str) -> KernelResult<String> {
    to_yaml(&json!({
        "recipe": "default.v1",
        "language": language,
        "pipeline": [
            { "name": "WhitespaceTokenizer" },
            { "name": "RegexFeaturizer" },
            { "name": "LexicalSyntacticFeaturizer" },
            { "name": "CountVectorsFeaturizer" },
            {
                "name": "CountVectorsFeaturizer",
                "analyzer": "char_wb",
                "min_ngram": 1,
                "max_ngram": 4
            },
            {
                "name": "DIETClassifier",
                "epochs": 100,
                "constrain_similarities": true
            },
            { "name": "EntitySynonymMapper" },
            {
                "name": "ResponseSelector",
                "epochs": 100,
                "constrain_similarities": true
            },
            {
                "name": "FallbackClassifier",
                "threshold": 0.3,
                "ambiguity_threshold": 0.1
            }
        ],
        "policies": [
            { "name": "MemoizationPolicy" },
            { "name": "RulePolicy" },
            {
                "name": "TEDPolicy",
                "max_history": 5,
                "epochs": 100,
                "constrain_similarities": true
            }
        ]
    }))
}

fn endpoints_config() -> KernelResult<String> {
    to_yaml(&json!({
        "action_endpoint": { "url": "http://localhost:5055/webhook" }
    }))
}

fn credentials_config() -> KernelResult<String> {
    to_yaml(&json!({
        "rest": null,
        "socketio": {
            "user_message_evt": "user_uttered",
            "bot_message_evt": "bot_uttered",
            "session_persistence": false
        }
    }))
}

fn readme(combined: &CombinedExport) -> String {
    format!(
        "# Dialogue Bot Export\n\n\
Project: {code}\n\
Version: {label} ({status})\n\
Languages: {languages}\n\n\
## Files Included\n\n\
- `domain.yml` - Domain configuration (intents, entities, slots, forms, responses, actions)\n\
- `data/stories.yml` - Conversation stories\n\
- `data/rules.yml` - Conversation rules\n\
- `data/nlu_*.yml` - NLU training data for each language\n\
- `config.yml` - Runtime pipeline and policy template\n\
- `endpoints.yml` - Endpoints configuration template\n\
- `credentials.yml` - Channel credentials template\n\n\
## Getting Started\n\n\
1. Train the model: `rasa train`\n\
2. Test in shell: `rasa shell`\n\
3. Run the bot: `rasa run --enable-api`\n",
        code = combined.project_code,
        label = combined.version_label,
        status = combined.version_status,
        languages = combined.languages.join(", "),
    )
}
