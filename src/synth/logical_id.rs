// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Logical IDs for rendered resources
//!
//! Uses BLAKE3 over the construct path so IDs are stable across runs.

use serde::Serialize;

const DIGEST_LEN: usize = 8;

/// Template-unique identifier of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Derive the ID for a construct path.
    ///
    /// The readable part is every alphanumeric character of the path; the
    /// suffix is the first 8 hex digits of the path digest, upper-cased.
    pub fn from_path(path: &[&str]) -> Self {
        let human: String = path
            .iter()
            .flat_map(|component| component.chars())
            .filter(char::is_ascii_alphanumeric)
            .collect();

        let digest = blake3::hash(path.join("/").as_bytes());
        let suffix = digest.to_hex().as_str()[..DIGEST_LEN].to_ascii_uppercase();

        Self(format!("{}{}", human, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LogicalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stable_and_readable() {
        let a = LogicalId::from_path(&["MyApp"]);
        let b = LogicalId::from_path(&["MyApp"]);
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("MyApp"));
        assert_eq!(a.as_str().len(), "MyApp".len() + DIGEST_LEN);
    }

    #[test]
    fn test_path_separator_matters() {
        // Same characters, different nesting
        let nested = LogicalId::from_path(&["A", "B"]);
        let flat = LogicalId::from_path(&["AB"]);
        assert_ne!(nested, flat);
        assert!(nested.as_str().starts_with("AB"));
    }

    #[test]
    fn test_non_alphanumeric_stripped() {
        let id = LogicalId::from_path(&["my-app", "group_1"]);
        assert!(id.as_str().starts_with("myappgroup1"));
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
