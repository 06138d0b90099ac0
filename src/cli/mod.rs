// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for deploysynth.

pub mod init;
pub mod synth;
pub mod tags;
pub mod validate;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::definition::{StackDefinition, DEFAULT_DEFINITION_FILE};
use crate::errors::SynthError;

/// Deployment definition synthesizer
///
/// Render deployment groups and pipeline actions into template documents.
#[derive(Parser, Debug)]
#[clap(
    name = "deploysynth",
    version,
    about = "Synthesize deployment-group and pipeline-action definitions into templates",
    long_about = None,
    after_help = "Examples:\n\
        deploysynth init                      Write a starter .deploysynth.yaml\n\
        deploysynth validate                  Check the definition\n\
        deploysynth synth --format yaml       Print the rendered template\n\
        deploysynth tags                      Show serialized instance tag sets\n\n\
        See 'deploysynth <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter definition file
    Init {
        /// Stack name (defaults to current directory name)
        name: Option<String>,

        /// Overwrite an existing definition
        #[clap(long)]
        force: bool,
    },

    /// Validate a definition file
    Validate {
        /// Definition file to validate
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,
    },

    /// Render the template
    Synth {
        /// Definition file
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,

        /// Output format
        #[clap(short, long, default_value = "json")]
        format: TemplateFormat,

        /// Write the template to a file instead of stdout
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the serialized instance tag sets of each deployment group
    Tags {
        /// Definition file
        #[clap(default_value = DEFAULT_DEFINITION_FILE)]
        definition: PathBuf,
    },
}

/// Rendered template format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Json,
    Yaml,
}

impl std::str::FromStr for TemplateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!("Unknown template format: {}", s)),
        }
    }
}

/// Load a definition, printing recovery steps when it cannot be read
pub(crate) fn load_definition(path: &Path) -> miette::Result<StackDefinition> {
    StackDefinition::from_file(path).map_err(report)
}

/// Print the recovery suggestion for `error`, if any, and convert it for miette
pub(crate) fn report(error: SynthError) -> miette::Report {
    if let Some(suggestion) = error.recovery() {
        eprintln!("{}", suggestion.to_string().dimmed());
    }
    miette::Report::new(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_synth_args() {
        let cli = Cli::try_parse_from(["deploysynth", "synth", "stack.yaml", "-f", "yaml"]).unwrap();
        match cli.command {
            Commands::Synth {
                definition,
                format,
                output,
            } => {
                assert_eq!(definition, PathBuf::from("stack.yaml"));
                assert_eq!(format, TemplateFormat::Yaml);
                assert!(output.is_none());
            }
            other => panic!("Expected synth command, got {:?}", other),
        }
    }

    #[test]
    fn test_default_definition_path() {
        let cli = Cli::try_parse_from(["deploysynth", "validate"]).unwrap();
        match cli.command {
            Commands::Validate { definition } => {
                assert_eq!(definition, PathBuf::from(DEFAULT_DEFINITION_FILE));
            }
            other => panic!("Expected validate command, got {:?}", other),
        }
    }
}
