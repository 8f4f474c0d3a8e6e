//! Project identifiers.
//!
//! A `ProjectId` can only be obtained through [`ProjectId::parse`] or
//! [`ProjectId::generate`], so any value of this type is safe to use as a
//! file name inside the projects directory.

use std::fmt;
use std::str::FromStr;

use imdf_common::error::{ImdfError, ImdfResult};

/// Longest accepted identifier, in bytes.
pub const MAX_ID_LEN: usize = 50;

/// A validated project identifier: ASCII letters, digits, and `-`, at most
/// [`MAX_ID_LEN`] long.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn parse(raw: &str) -> ImdfResult<Self> {
        if raw.is_empty() {
            return Err(ImdfError::invalid_identifier("identifier is empty"));
        }
        if raw.len() > MAX_ID_LEN {
            return Err(ImdfError::invalid_identifier(format!(
                "identifier is {} bytes long, limit is {MAX_ID_LEN}",
                raw.len()
            )));
        }
        if let Some(bad) = raw.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
            return Err(ImdfError::invalid_identifier(format!(
                "identifier contains {bad:?}; only letters, digits and '-' are allowed"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Fresh random identifier (hyphenated UUIDv4, 36 bytes).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl FromStr for ProjectId {
    type Err = ImdfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdf_common::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_plain_ids() {
        for id in ["abc", "ABC-123", "a", "0", "-"] {
            assert_eq!(ProjectId::parse(id).unwrap().as_str(), id);
        }
        assert!(ProjectId::parse(&"x".repeat(MAX_ID_LEN)).is_ok());
    }

    #[test]
    fn test_rejects_traversal_and_separators() {
        for id in ["", "../etc", "a/b", "a\\b", "a.json", "a b", "a_b", "proj\0", "é"] {
            let err = ProjectId::parse(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidIdentifier, "{id:?}");
        }
        assert!(ProjectId::parse(&"x".repeat(MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = ProjectId::generate();
        let b = ProjectId::generate();
        assert_ne!(a, b);
        assert!(ProjectId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_from_str() {
        let id: ProjectId = "hq-1".parse().unwrap();
        assert_eq!(id.to_string(), "hq-1");
    }

    proptest! {
        #[test]
        fn prop_valid_class_is_accepted(id in "[a-zA-Z0-9-]{1,50}") {
            prop_assert!(ProjectId::parse(&id).is_ok());
        }

        #[test]
        fn prop_any_foreign_char_is_rejected(
            prefix in "[a-z0-9-]{0,20}",
            bad in "[^a-zA-Z0-9-]",
            suffix in "[a-z0-9-]{0,20}",
        ) {
            let id = format!("{prefix}{bad}{suffix}");
            prop_assert!(ProjectId::parse(&id).is_err());
        }
    }
}
