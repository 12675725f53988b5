//! Dialogue-state conditions shared by rules and response variants.

use serde::{Deserialize, Serialize};

/// A condition on current dialogue state.
///
/// Rules and response variants store the same two condition kinds; they
/// differ only in how the exporters render them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateCondition {
    /// A slot must hold the given value.
    Slot {
        /// Slot name.
        name: String,
        /// Expected value; `None` matches an unset slot.
        value: Option<String>,
    },
    /// The named form loop must be active (`None` matches no active loop).
    ActiveLoop {
        /// Form name, or `None`.
        name: Option<String>,
    },
}
