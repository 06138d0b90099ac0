// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Error types
//!
//! Every failure in deploysynth is a definition-time mistake: the input has
//! to be fixed and synthesis re-run. Errors carry diagnostic codes and help
//! text so the CLI can point straight at the offending constraint.

mod recovery;

pub use recovery::RecoverySuggestion;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::tags::MAX_TAG_GROUPS;

/// Result type for deploysynth operations
pub type SynthResult<T> = Result<T, SynthError>;

/// Main error type for deploysynth
#[derive(Error, Debug, Diagnostic)]
pub enum SynthError {
    // ─────────────────────────────────────────────────────────────────────────
    // Tag Set Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("An instance tag set can have at most {max} tag groups, got {count}")]
    #[diagnostic(
        code(deploysynth::too_many_tag_groups),
        help("Merge filters into at most {max} groups")
    )]
    TooManyTagGroups { count: usize, max: usize },

    #[error("Tag group {group} contains a filter with neither a key nor a value")]
    #[diagnostic(
        code(deploysynth::keyless_valueless_filter),
        help("Give the empty key at least one value, or remove the entry")
    )]
    KeylessValuelessFilter { group: usize },

    #[error("Internal error: {message}")]
    #[diagnostic(
        code(deploysynth::internal),
        help("This is a bug in deploysynth, please report it")
    )]
    Internal { message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Construct Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("There is already a construct with id '{id}' in stack '{stack}'")]
    #[diagnostic(code(deploysynth::duplicate_construct))]
    DuplicateConstruct { stack: String, id: String },

    #[error("Action '{action}' is invalid: {reason}")]
    #[diagnostic(code(deploysynth::invalid_action))]
    InvalidAction { action: String, reason: String },

    #[error("Pipeline '{pipeline}' is invalid: {reason}")]
    #[diagnostic(code(deploysynth::invalid_pipeline))]
    InvalidPipeline { pipeline: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Definition Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Definition file not found: {path}")]
    #[diagnostic(
        code(deploysynth::definition_not_found),
        help("Create a definition with 'deploysynth init' or write .deploysynth.yaml manually")
    )]
    DefinitionNotFound { path: PathBuf },

    #[error("Invalid definition: {reason}")]
    #[diagnostic(code(deploysynth::invalid_definition))]
    InvalidDefinition {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Deployment group '{group}' references unknown application '{application}'")]
    #[diagnostic(
        code(deploysynth::unknown_application),
        help("Declare '{application}' under 'applications' or use 'import: <name>'")
    )]
    UnknownApplication { group: String, application: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(deploysynth::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(deploysynth::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(deploysynth::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(deploysynth::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(deploysynth::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for SynthError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for SynthError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for SynthError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl SynthError {
    /// Error for a tag set built from more groups than allowed
    pub fn too_many_tag_groups(count: usize) -> Self {
        Self::TooManyTagGroups {
            count,
            max: MAX_TAG_GROUPS,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from validating a tag set
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TooManyTagGroups { .. } | Self::KeylessValuelessFilter { .. }
        )
    }

    /// Best recovery suggestion for this error, if one is known
    pub fn recovery(&self) -> Option<RecoverySuggestion> {
        match self {
            Self::TooManyTagGroups { count, max } => {
                Some(RecoverySuggestion::reduce_tag_groups(*count, *max))
            }
            Self::KeylessValuelessFilter { group } => {
                Some(RecoverySuggestion::fix_keyless_filter(*group))
            }
            Self::DefinitionNotFound { .. } => Some(RecoverySuggestion::create_definition()),
            Self::Yaml { .. } => Some(RecoverySuggestion::fix_yaml_syntax()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_groups_message_cites_limit() {
        let err = SynthError::too_many_tag_groups(4);
        let message = err.to_string();
        assert!(message.contains('3'));
        assert!(message.contains('4'));
        assert!(err.is_validation());
    }

    #[test]
    fn test_internal_is_not_validation() {
        let err = SynthError::internal("boom");
        assert!(!err.is_validation());
        assert!(err.recovery().is_none());
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn test_io_and_parse_errors_are_not_validation() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{").unwrap_err();
        let errors = [
            SynthError::from(yaml_err),
            SynthError::Json { message: "bad".into() },
            SynthError::FileReadError {
                path: PathBuf::from("x"),
                error: "denied".into(),
            },
            SynthError::FileWriteError {
                path: PathBuf::from("x"),
                error: "denied".into(),
            },
        ];
        for err in &errors {
            assert!(!err.is_validation(), "{} classified as validation", err);
        }
        assert!(SynthError::KeylessValuelessFilter { group: 1 }.is_validation());
    }

    #[test]
    fn test_recovery_for_keyless_filter() {
        let err = SynthError::KeylessValuelessFilter { group: 2 };
        let suggestion = err.recovery().unwrap();
        assert!(suggestion.steps.iter().any(|s| s.contains("group 2")));
    }
}
