// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Synth command - render the template

use miette::Result;
use std::path::PathBuf;
use tracing::info;

use super::{load_definition, report, TemplateFormat};
use crate::errors::SynthError;
use crate::utils::{plural, print_success};

/// Run the synth command
pub async fn run(
    definition_path: PathBuf,
    format: TemplateFormat,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let definition = load_definition(&definition_path)?;
    let stack = definition.synthesize().map_err(report)?;

    let mut rendered = match format {
        TemplateFormat::Json => stack.to_json(),
        TemplateFormat::Yaml => stack.to_yaml(),
    }
    .map_err(report)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered)
                .map_err(|e| SynthError::FileWriteError {
                    path: path.clone(),
                    error: e.to_string(),
                })
                .map_err(report)?;
            info!(path = %path.display(), "wrote template");
            print_success(&format!(
                "Wrote {} to {}",
                plural(stack.resources().count(), "resource"),
                path.display()
            ));
        }
        None => print!("{}", rendered),
    }

    if verbose {
        for (id, resource) in stack.resources() {
            eprintln!("  {} {}", id, resource.resource_type);
        }
    }

    Ok(())
}
