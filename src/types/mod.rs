//! Core types for the configuration graph.

pub mod ids;
pub mod version;
pub mod intent;
pub mod entity;
pub mod condition;
pub mod slot;
pub mod form;
pub mod action;
pub mod response;
pub mod story;
pub mod rule;
pub mod nlu;
pub mod graph;

pub use ids::{LanguageId, ProjectId, RowId, VersionId};
pub use version::{
    LanguageRow, ProjectRow, SessionConfigRow, VersionLanguageRow, VersionRow, VersionStatus,
};
pub use intent::{IntentExampleRow, IntentLocalizationRow, IntentRow};
pub use entity::{EntityGroupRow, EntityRoleRow, EntityRow};
pub use condition::StateCondition;
pub use slot::{MappingCondition, MappingType, SlotMappingRow, SlotRow, SlotType};
pub use form::{FormRequiredSlotRow, FormRow, FormSlotMappingRow};
pub use action::ActionRow;
pub use response::{
    ResponseButton, ResponseComponentRow, ResponseConditionRow, ResponsePayload, ResponseRow,
    ResponseVariantRow,
};
pub use story::{StepKind, StoryRow, StorySlotEventRow, StoryStepEntityRow, StoryStepRow};
pub use rule::{RuleConditionRow, RuleRow, RuleSlotEventRow, RuleStepEntityRow, RuleStepRow};
pub use nlu::{
    LookupExampleRow, LookupRow, RegexExampleRow, RegexRow, SynonymExampleRow, SynonymRow,
};
pub use graph::VersionGraph;
