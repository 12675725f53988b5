//! Identifier newtypes for the configuration graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create from an existing UUID.
            pub fn new(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            pub fn fresh() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse from a UUID string.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the inner UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

id_type! {
    /// Identifier for a project.
    ProjectId
}

id_type! {
    /// Identifier for one version (generation) of a configuration graph.
    VersionId
}

id_type! {
    /// Identifier for a row in the global language registry.
    LanguageId
}

id_type! {
    /// Identifier for any version-scoped graph row.
    ///
    /// Graph rows share one identifier space; the row kind is carried by the
    /// table the row lives in, and by [`RefKind`](crate::replicate::RefKind)
    /// when a reference is remapped during replication.
    RowId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_ordering() {
        let a = RowId::new(Uuid::from_u128(1));
        let b = RowId::new(Uuid::from_u128(2));
        assert!(a < b);
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = VersionId::fresh();
        let parsed = VersionId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }
}
