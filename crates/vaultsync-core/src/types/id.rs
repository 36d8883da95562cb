//! Newtype wrappers around the opaque string identifiers the server and
//! the metadata document hand out.
//!
//! Using distinct types prevents accidentally passing a `LockToken` where a
//! `FolderId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `String`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Server-side identifier of an encrypted folder.
    FolderId
);

define_id!(
    /// Opaque identifier of an entry inside a metadata document.
    EntryId
);

define_id!(
    /// Opaque token returned by the lock endpoint.
    LockToken
);

define_id!(
    /// Identifier of one propagation job, used to correlate logs and events.
    JobId
);

impl EntryId {
    /// Generate a fresh entry identifier (32 lowercase hex characters).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

impl JobId {
    /// Generate a fresh job identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_entry_ids_are_unique_hex() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_serde_transparent() {
        let id = FolderId::from("8123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"8123\"");
        let back: FolderId = serde_json::from_str("\"8123\"").unwrap();
        assert_eq!(back, id);
    }
}
