// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Single tag filters and their serialized form

use serde::{Deserialize, Serialize};

use crate::errors::{SynthError, SynthResult};

/// Which parts of a tag a filter matches on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterKind {
    KeyAndValue,
    KeyOnly,
    ValueOnly,
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyAndValue => write!(f, "KEY_AND_VALUE"),
            Self::KeyOnly => write!(f, "KEY_ONLY"),
            Self::ValueOnly => write!(f, "VALUE_ONLY"),
        }
    }
}

/// A single tag matching criterion.
///
/// The public constructors only produce filters with a key, a value, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    key: Option<String>,
    value: Option<String>,
}

impl TagFilter {
    /// Match instances carrying `key` with exactly `value`.
    ///
    /// An empty `key` is absent, which makes this a value-only filter.
    pub fn key_and_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: non_empty(key.into()),
            value: Some(value.into()),
        }
    }

    /// Match instances carrying `key` with any value.
    ///
    /// An empty `key` is absent; the resulting filter matches nothing and
    /// fails to serialize.
    pub fn key_only(key: impl Into<String>) -> Self {
        Self {
            key: non_empty(key.into()),
            value: None,
        }
    }

    /// Match instances carrying `value` under any key
    pub fn value_only(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: Some(value.into()),
        }
    }

    #[cfg(test)]
    pub(crate) fn unchecked(key: Option<&str>, value: Option<&str>) -> Self {
        Self {
            key: key.map(String::from),
            value: value.map(String::from),
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Filter kind, or `None` for a filter with neither key nor value
    pub fn kind(&self) -> Option<FilterKind> {
        match (&self.key, &self.value) {
            (Some(_), Some(_)) => Some(FilterKind::KeyAndValue),
            (Some(_), None) => Some(FilterKind::KeyOnly),
            (None, Some(_)) => Some(FilterKind::ValueOnly),
            (None, None) => None,
        }
    }

    /// Serialize into the wire record
    pub fn to_record(&self) -> SynthResult<TagFilterRecord> {
        match (&self.key, &self.value) {
            (Some(key), Some(value)) => Ok(TagFilterRecord::KeyAndValue {
                key: key.clone(),
                value: value.clone(),
            }),
            (Some(key), None) => Ok(TagFilterRecord::KeyOnly { key: key.clone() }),
            (None, Some(value)) => Ok(TagFilterRecord::ValueOnly {
                value: value.clone(),
            }),
            (None, None) => Err(SynthError::internal(
                "tag filter has neither a key nor a value",
            )),
        }
    }
}

fn non_empty(key: String) -> Option<String> {
    (!key.is_empty()).then_some(key)
}

/// Serialized tag filter, discriminated by its `Type` field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "Type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagFilterRecord {
    KeyAndValue {
        #[serde(rename = "Key")]
        key: String,
        #[serde(rename = "Value")]
        value: String,
    },
    KeyOnly {
        #[serde(rename = "Key")]
        key: String,
    },
    ValueOnly {
        #[serde(rename = "Value")]
        value: String,
    },
}

impl TagFilterRecord {
    pub fn kind(&self) -> FilterKind {
        match self {
            Self::KeyAndValue { .. } => FilterKind::KeyAndValue,
            Self::KeyOnly { .. } => FilterKind::KeyOnly,
            Self::ValueOnly { .. } => FilterKind::ValueOnly,
        }
    }
}
