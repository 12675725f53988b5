//! # dialogue-kernel
//!
//! Versioned configuration graphs for conversational agents.
//!
//! Every project holds exactly one configuration graph per lifecycle status
//! (draft, production, archived). The kernel answers two questions:
//!
//! > How does a draft graph become the production graph, atomically and
//! > reversibly, without ever leaving a partial state behind?
//!
//! > How does one graph flatten into the deterministic document set a
//! > runtime dialogue engine trains from?
//!
//! ## Core Contract
//!
//! 1. Promotion rotates whole graphs: draft → production → archived, with
//!    a fresh draft cloned from the new production
//! 2. Rollback reverses exactly the most recent promotion
//! 3. Any failure at any step leaves the pre-operation state fully intact
//! 4. The same graph always exports byte-identical documents
//!
//! ## Architecture
//!
//! ```text
//! CRUD collaborators ──▶ draft graph
//!                           │
//!        Guard ─▶ Eraser ─▶ Replicator          (one store transaction)
//!                           │
//!          draft ──▶ production ──▶ archived
//!                           │
//!                      Exporters ──▶ domain / NLU / stories / rules
//!                           │
//!                    ConfigStore (in-memory backend)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Replication preserves the graph shape exactly; only identifiers change
//! - Erasure follows a fixed reverse-dependency phase order
//! - Export ordering is canonical: natural keys where no order field
//!   exists, the order field where one does

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod erase;
pub mod error;
pub mod export;
pub mod guard;
pub mod ordering;
pub mod promote;
pub mod registry;
pub mod replicate;
pub mod store;
pub mod types;

// Re-exports
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};
pub use erase::erase_version_graph;
pub use error::{KernelError, KernelResult};
pub use export::{
    to_yaml, BundleManifest, CombinedExport, DialogueExporter, DomainDocument, ExportBundle,
    NluDocument, RulesDocument, StoriesDocument,
};
pub use guard::{PromotionGuard, DEFAULT_MIN_INTENT_EXAMPLES};
pub use ordering::{add_required_slot, delete_story_step, remove_required_slot};
pub use promote::{
    increment_label, PromotionOrchestrator, PromotionOutcome, RollbackOutcome,
};
pub use registry::{VersionRegistry, INITIAL_DRAFT_LABEL, INITIAL_PRODUCTION_LABEL};
pub use replicate::{
    clone_version_graph, replicate_graph, IdTranslationTable, RefKind, DEPENDENCY_ORDER,
};
pub use store::{ConfigStore, InMemoryStore, StoreError, StoreResult, StoreTx};
pub use types::{VersionGraph, VersionStatus};

/// Schema version stamped on every exported document.
pub const DOCUMENT_SCHEMA_VERSION: &str = "3.1";

/// Schema version of the kernel's own types.
/// Increment on breaking changes to any row or document type.
pub const KERNEL_SCHEMA_VERSION: &str = "1.0.0";
