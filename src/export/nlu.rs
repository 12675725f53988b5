//! NLU document exporter, one document per (version, language).

use serde::Serialize;

use crate::error::{KernelError, KernelResult};
use crate::types::{LanguageRow, VersionGraph};

/// The NLU training-data document for one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NluDocument {
    /// Document schema version.
    pub version: String,
    /// Training blocks: intents, then regexes, lookups, synonyms.
    pub nlu: Vec<NluBlock>,
}

/// One NLU training block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NluBlock {
    /// Intent examples.
    Intent {
        /// Intent name.
        intent: String,
        /// Example lines as one text block.
        examples: String,
    },
    /// Regex patterns.
    Regex {
        /// Feature name.
        regex: String,
        /// Pattern lines as one text block.
        examples: String,
    },
    /// Lookup values.
    Lookup {
        /// Table name.
        lookup: String,
        /// Value lines as one text block.
        examples: String,
    },
    /// Synonym surface forms.
    Synonym {
        /// Canonical value.
        synonym: String,
        /// Surface form lines as one text block.
        examples: String,
    },
}

fn text_block(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the NLU document for one graph and language.
///
/// Intents with no localization or no examples for the language are
/// skipped; any emitted intent below `minimum_examples` fails the export,
/// as does a document with no intent blocks at all.
pub fn build_nlu(
    graph: &VersionGraph,
    language: &LanguageRow,
    minimum_examples: usize,
) -> KernelResult<NluDocument> {
    let mut blocks = Vec::new();

    let mut intents: Vec<_> = graph.intents.iter().collect();
    intents.sort_by(|a, b| a.name.cmp(&b.name));
    for intent in intents {
        let Some(localization) = graph
            .intent_localizations
            .iter()
            .find(|l| l.intent_id == intent.id && l.language_id == language.id)
        else {
            continue;
        };

        let mut examples: Vec<_> = graph
            .intent_examples
            .iter()
            .filter(|e| e.localization_id == localization.id)
            .collect();
        if examples.is_empty() {
            continue;
        }
        if examples.len() < minimum_examples {
            return Err(KernelError::validation(format!(
                "intent '{}' has only {} examples for language '{}'; minimum required is {}",
                intent.name,
                examples.len(),
                language.code,
                minimum_examples
            )));
        }
        examples.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        blocks.push(NluBlock::Intent {
            intent: intent.name.clone(),
            examples: text_block(&examples.iter().map(|e| e.text.clone()).collect::<Vec<_>>()),
        });
    }

    if blocks.is_empty() {
        return Err(KernelError::validation(format!(
            "no NLU intents found for export in language '{}'",
            language.code
        )));
    }

    let mut regexes: Vec<_> = graph.regexes.iter().collect();
    regexes.sort_by(|a, b| a.name.cmp(&b.name));
    for regex in regexes {
        let mut patterns: Vec<_> = graph
            .regex_examples
            .iter()
            .filter(|e| e.regex_id == regex.id && e.language_id == language.id)
            .collect();
        if patterns.is_empty() {
            continue;
        }
        patterns.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        blocks.push(NluBlock::Regex {
            regex: regex.name.clone(),
            examples: text_block(&patterns.iter().map(|e| e.text.clone()).collect::<Vec<_>>()),
        });
    }

    let mut lookups: Vec<_> = graph.lookups.iter().collect();
    lookups.sort_by(|a, b| a.name.cmp(&b.name));
    for lookup in lookups {
        let mut values: Vec<_> = graph
            .lookup_examples
            .iter()
            .filter(|e| e.lookup_id == lookup.id && e.language_id == language.id)
            .collect();
        if values.is_empty() {
            continue;
        }
        values.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        blocks.push(NluBlock::Lookup {
            lookup: lookup.name.clone(),
            examples: text_block(&values.iter().map(|e| e.text.clone()).collect::<Vec<_>>()),
        });
    }

    let mut synonyms: Vec<_> = graph.synonyms.iter().collect();
    synonyms.sort_by(|a, b| a.canonical_value.cmp(&b.canonical_value));
    for synonym in synonyms {
        let mut forms: Vec<_> = graph
            .synonym_examples
            .iter()
            .filter(|e| e.synonym_id == synonym.id && e.language_id == language.id)
            .collect();
        if forms.is_empty() {
            continue;
        }
        forms.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        blocks.push(NluBlock::Synonym {
            synonym: synonym.canonical_value.clone(),
            examples: text_block(&forms.iter().map(|e| e.text.clone()).collect::<Vec<_>>()),
        });
    }

    Ok(NluDocument {
        version: crate::DOCUMENT_SCHEMA_VERSION.to_string(),
        nlu: blocks,
    })
}
