// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Error recovery suggestions
//!
//! Provides actionable suggestions for recovering from errors.

/// A recovery suggestion with concrete steps
#[derive(Debug, Clone)]
pub struct RecoverySuggestion {
    /// Brief description of what to do
    pub action: String,
    /// Detailed steps
    pub steps: Vec<String>,
    /// Commands to run
    pub commands: Vec<String>,
}

impl RecoverySuggestion {
    /// Suggest shrinking a tag set down to the allowed number of groups
    pub fn reduce_tag_groups(count: usize, max: usize) -> Self {
        Self {
            action: format!("Reduce the tag set from {} to at most {} groups", count, max),
            steps: vec![
                "Filters inside one group are alternatives for a single match".into(),
                "Combine groups that select the same instances".into(),
                format!("Keep no more than {} entries under the tag set list", max),
            ],
            commands: vec![
                "# Inspect the serialized tag sets:".into(),
                "deploysynth tags".into(),
            ],
        }
    }

    /// Suggest fixing an entry with an empty key and no values
    pub fn fix_keyless_filter(group: usize) -> Self {
        Self {
            action: "Remove the keyless, valueless tag filter".into(),
            steps: vec![
                format!("Tag group {} maps the empty key to an empty value list", group),
                "An empty key only makes sense with at least one value (VALUE_ONLY)".into(),
                "Either add values to the \"\" entry or delete it".into(),
            ],
            commands: vec![],
        }
    }

    /// Suggest creating a definition file
    pub fn create_definition() -> Self {
        Self {
            action: "Create a definition file".into(),
            steps: vec![
                "No .deploysynth.yaml found in current directory".into(),
                "Initialize a new definition or create the file manually".into(),
            ],
            commands: vec![
                "# Write a starter definition:".into(),
                "deploysynth init".into(),
            ],
        }
    }

    /// Suggest fixing invalid YAML
    pub fn fix_yaml_syntax() -> Self {
        Self {
            action: "Fix YAML syntax error".into(),
            steps: vec![
                "Check for common YAML issues:".into(),
                "  • Incorrect indentation (use spaces, not tabs)".into(),
                "  • Tag keys that need quoting, such as the empty key \"\"".into(),
                "  • Tag values written as a scalar instead of a list".into(),
            ],
            commands: vec![
                "# Re-run validation after editing:".into(),
                "deploysynth validate".into(),
            ],
        }
    }
}

impl std::fmt::Display for RecoverySuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "→ {}", self.action)?;

        for step in &self.steps {
            writeln!(f, "  {}", step)?;
        }

        if !self.commands.is_empty() {
            writeln!(f)?;
            for cmd in &self.commands {
                writeln!(f, "  {}", cmd)?;
            }
        }

        Ok(())
    }
}
