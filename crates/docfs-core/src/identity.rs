//! # Identity Newtypes
//!
//! Keys for the four catalog entities. Each is a distinct type, so a
//! [`ProjectId`] can never be passed where a [`NamespaceName`] is expected.
//!
//! ## Validation
//!
//! String keys ([`NamespaceName`], [`ProjectId`]) are client-supplied and
//! double as URL path segments. They are trimmed and validated at construction:
//! non-empty, at most [`MAX_KEY_LEN`] characters, and free of `/`.
//! UUID keys ([`DocumentId`], [`LinkId`]) are generated server-side and are
//! always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum length of a namespace name or project id.
pub const MAX_KEY_LEN: usize = 50;

fn validate_key(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyKey { field });
    }
    let len = trimmed.chars().count();
    if len > MAX_KEY_LEN {
        return Err(ValidationError::KeyTooLong {
            field,
            max: MAX_KEY_LEN,
            actual: len,
        });
    }
    if trimmed.contains('/') {
        return Err(ValidationError::KeyContainsSlash {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// String keys (validated)
// ---------------------------------------------------------------------------

/// Unique name of a top-level namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceName(String);

impl NamespaceName {
    /// Create a validated namespace name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        validate_key("namespace name", raw.as_ref()).map(Self)
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Project identifier, unique only within its namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a validated project id.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ValidationError> {
        validate_key("project id", raw.as_ref()).map(Self)
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_key_impls {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $ty {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_key_impls!(NamespaceName);
string_key_impls!(ProjectId);

// ---------------------------------------------------------------------------
// UUID keys (always valid by construction)
// ---------------------------------------------------------------------------

/// Surrogate identifier of a [`Document`](crate::Document).
///
/// Deliberately distinct from the content digest: the digest identifies the
/// bytes, the id identifies the catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

/// Generated identifier of a [`Link`](crate::Link).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(Uuid);

macro_rules! uuid_key_impls {
    ($ty:ident, $what:literal) => {
        impl $ty {
            #[doc = concat!("Create a new random ", $what, " identifier.")]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a ", $what, " identifier from an existing UUID.")]
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

uuid_key_impls!(DocumentId, "document");
uuid_key_impls!(LinkId, "link");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_name_trims_whitespace() {
        let name = NamespaceName::new("  wb  ").unwrap();
        assert_eq!(name.as_str(), "wb");
        assert_eq!(name, "wb");
    }

    #[test]
    fn namespace_name_rejects_empty() {
        assert_eq!(
            NamespaceName::new("   "),
            Err(ValidationError::EmptyKey {
                field: "namespace name"
            })
        );
    }

    #[test]
    fn project_id_rejects_slash() {
        let err = ProjectId::new("p1/p2").unwrap_err();
        assert!(matches!(err, ValidationError::KeyContainsSlash { .. }));
    }

    #[test]
    fn key_length_limit_counts_chars() {
        let at_limit = "é".repeat(MAX_KEY_LEN);
        assert!(ProjectId::new(&at_limit).is_ok());

        let over = "x".repeat(MAX_KEY_LEN + 1);
        let err = ProjectId::new(&over).unwrap_err();
        assert_eq!(
            err,
            ValidationError::KeyTooLong {
                field: "project id",
                max: MAX_KEY_LEN,
                actual: MAX_KEY_LEN + 1,
            }
        );
    }

    #[test]
    fn string_keys_serialize_as_plain_strings() {
        let name = NamespaceName::new("wb").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"wb\"");
        let back: NamespaceName = serde_json::from_str("\"wb\"").unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn string_keys_validate_on_deserialize() {
        assert!(serde_json::from_str::<ProjectId>("\"\"").is_err());
    }

    #[test]
    fn document_ids_are_unique() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn link_id_display_is_uuid() {
        let uuid = Uuid::new_v4();
        assert_eq!(LinkId::from_uuid(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn document_id_parses_from_display() {
        let id = DocumentId::new();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<DocumentId>().is_err());
    }
}
