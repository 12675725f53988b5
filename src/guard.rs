//! Promotion guard: the pre-flight gate a draft must pass to go live.
//!
//! Invoked only at promotion time. Drafts may sit below the thresholds
//! indefinitely; the guard never runs on ordinary draft mutation.

use std::collections::BTreeMap;

use crate::error::{KernelError, KernelResult};
use crate::store::StoreTx;
use crate::types::{LanguageId, RowId, VersionGraph};

/// Default minimum number of training examples per intent per language.
pub const DEFAULT_MIN_INTENT_EXAMPLES: usize = 10;

/// Promotion-time validation gate.
///
/// Fails unless:
/// - at least one language is enabled for the version,
/// - at least one intent exists,
/// - every intent has at least `minimum_examples` examples for every
///   enabled language (a missing localization counts as zero).
#[derive(Debug, Clone, Copy)]
pub struct PromotionGuard {
    /// Minimum examples per intent per enabled language.
    pub minimum_examples: usize,
}

impl Default for PromotionGuard {
    fn default() -> Self {
        Self {
            minimum_examples: DEFAULT_MIN_INTENT_EXAMPLES,
        }
    }
}

impl PromotionGuard {
    /// Create a guard with a custom minimum.
    pub fn new(minimum_examples: usize) -> Self {
        Self { minimum_examples }
    }

    /// Validate a loaded graph. Language codes are resolved through the
    /// session so failure messages can name the language.
    pub async fn validate(&self, tx: &mut dyn StoreTx, graph: &VersionGraph) -> KernelResult<()> {
        if graph.languages.is_empty() {
            return Err(KernelError::validation(
                "cannot promote: no languages enabled in version",
            ));
        }
        if graph.intents.is_empty() {
            return Err(KernelError::validation(
                "cannot promote: no intents defined in version",
            ));
        }

        let mut language_codes: BTreeMap<LanguageId, String> = BTreeMap::new();
        for enabled in &graph.languages {
            let language = tx.language(&enabled.language_id).await?.ok_or_else(|| {
                KernelError::invariant(format!(
                    "enabled language {} is not registered",
                    enabled.language_id
                ))
            })?;
            language_codes.insert(language.id, language.code);
        }

        // Example counts keyed by (intent, language).
        let mut counts: BTreeMap<(RowId, LanguageId), usize> = BTreeMap::new();
        let mut localization_keys: BTreeMap<RowId, (RowId, LanguageId)> = BTreeMap::new();
        for localization in &graph.intent_localizations {
            localization_keys.insert(
                localization.id,
                (localization.intent_id, localization.language_id),
            );
        }
        for example in &graph.intent_examples {
            if let Some(key) = localization_keys.get(&example.localization_id) {
                *counts.entry(*key).or_insert(0) += 1;
            }
        }

        for intent in &graph.intents {
            for (language_id, code) in &language_codes {
                let count = counts
                    .get(&(intent.id, *language_id))
                    .copied()
                    .unwrap_or(0);
                if count < self.minimum_examples {
                    return Err(KernelError::validation(format!(
                        "intent '{}' has only {} examples for language '{}'; minimum required is {}",
                        intent.name, count, code, self.minimum_examples
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ConfigStore, InMemoryStore};
    use crate::types::{
        IntentExampleRow, IntentLocalizationRow, IntentRow, LanguageRow, VersionId,
        VersionLanguageRow,
    };
    use chrono::Utc;
    use uuid::Uuid;

    fn graph_with_examples(
        version_id: VersionId,
        language_id: crate::types::LanguageId,
        example_count: usize,
    ) -> VersionGraph {
        let intent_id = RowId::new(Uuid::from_u128(1));
        let localization_id = RowId::new(Uuid::from_u128(2));
        VersionGraph {
            languages: vec![VersionLanguageRow {
                id: RowId::new(Uuid::from_u128(3)),
                version_id,
                language_id,
                is_default: true,
            }],
            intents: vec![IntentRow {
                id: intent_id,
                version_id,
                name: "greet".to_string(),
            }],
            intent_localizations: vec![IntentLocalizationRow {
                id: localization_id,
                intent_id,
                language_id,
                created_at: Utc::now(),
            }],
            intent_examples: (0..example_count)
                .map(|n| IntentExampleRow {
                    id: RowId::new(Uuid::from_u128(100 + n as u128)),
                    localization_id,
                    text: format!("example {n}"),
                    created_at: Utc::now(),
                })
                .collect(),
            ..VersionGraph::default()
        }
    }

    async fn language(store: &InMemoryStore) -> LanguageRow {
        let row = LanguageRow {
            id: crate::types::LanguageId::fresh(),
            code: "en".to_string(),
            name: "English".to_string(),
        };
        let mut tx = store.begin().await.unwrap();
        tx.insert_language(&row).await.unwrap();
        tx.commit().await.unwrap();
        row
    }

    #[tokio::test]
    async fn test_guard_requires_languages() {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let guard = PromotionGuard::default();

        let err = guard
            .validate(tx.as_mut(), &VersionGraph::default())
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_guard_requires_intents() {
        let store = InMemoryStore::new();
        let lang = language(&store).await;
        let mut tx = store.begin().await.unwrap();

        let version_id = VersionId::fresh();
        let graph = VersionGraph {
            languages: vec![VersionLanguageRow {
                id: RowId::new(Uuid::from_u128(3)),
                version_id,
                language_id: lang.id,
                is_default: true,
            }],
            ..VersionGraph::default()
        };

        let err = PromotionGuard::default()
            .validate(tx.as_mut(), &graph)
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_guard_minimum_examples_boundary() {
        let store = InMemoryStore::new();
        let lang = language(&store).await;
        let mut tx = store.begin().await.unwrap();
        let guard = PromotionGuard::default();
        let version_id = VersionId::fresh();

        let below = graph_with_examples(version_id, lang.id, 9);
        let err = guard.validate(tx.as_mut(), &below).await.unwrap_err();
        assert!(matches!(err, KernelError::ValidationFailed(_)));
        assert!(err.to_string().contains("greet"));

        let at = graph_with_examples(version_id, lang.id, 10);
        guard.validate(tx.as_mut(), &at).await.unwrap();
    }

    #[tokio::test]
    async fn test_guard_counts_missing_localization_as_zero() {
        let store = InMemoryStore::new();
        let lang = language(&store).await;
        let mut tx = store.begin().await.unwrap();
        let version_id = VersionId::fresh();

        let mut graph = graph_with_examples(version_id, lang.id, 10);
        // A second intent with no localization for the enabled language.
        graph.intents.push(IntentRow {
            id: RowId::new(Uuid::from_u128(50)),
            version_id,
            name: "goodbye".to_string(),
        });

        let err = PromotionGuard::default()
            .validate(tx.as_mut(), &graph)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("goodbye"));
        assert!(err.to_string().contains("only 0 examples"));
    }
}
