//! Property tests for label arithmetic and replication invariants.

mod common;

use proptest::prelude::*;

use common::{draft_graph, row_id};
use dialogue_kernel::replicate::replicate_graph;
use dialogue_kernel::types::{LanguageId, VersionId};
use dialogue_kernel::increment_label;

proptest! {
    #[test]
    fn prop_numeric_labels_increment(n in 0u64..1_000_000) {
        let label = format!("v{n}");
        prop_assert_eq!(increment_label(&label), format!("v{}", n + 1));
    }

    #[test]
    fn prop_non_numeric_labels_pass_through(label in "[a-uw-z][a-z0-9._-]{0,12}") {
        // Labels not starting with 'v' are never rewritten.
        prop_assert_eq!(increment_label(&label), label);
    }

    #[test]
    fn prop_v_prefix_with_non_digits_passes_through(suffix in "[a-z.-][a-z0-9.-]{0,8}") {
        let label = format!("v{suffix}");
        prop_assert_eq!(increment_label(&label), label.clone());
    }

    #[test]
    fn prop_replication_preserves_row_counts(examples in 0usize..20) {
        let source_version = VersionId::new(row_id(1).as_uuid());
        let language = LanguageId::new(row_id(2).as_uuid());
        let source = draft_graph(source_version, language, examples);

        let target_version = VersionId::fresh();
        let cloned = replicate_graph(&source, target_version).unwrap();

        prop_assert_eq!(source.row_counts(), cloned.row_counts());
        // Fresh identifiers throughout: no top-level row id survives.
        for (old, new) in source.intents.iter().zip(cloned.intents.iter()) {
            prop_assert_ne!(old.id, new.id);
            prop_assert_eq!(&old.name, &new.name);
        }
    }
}
