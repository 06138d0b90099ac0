// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Validate command - check a definition file

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{load_definition, report};
use crate::definition::DefinitionValidator;
use crate::utils::{plural, print_error, print_header, print_section, print_success, print_warning};

/// Run the validate command
pub async fn run(definition_path: PathBuf, verbose: bool) -> Result<()> {
    print_header("Validating definition...");

    let definition = match load_definition(&definition_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("  {} Failed to load {}", "✗".red(), definition_path.display());
            eprintln!();
            return Err(e);
        }
    };

    print_success("Definition file is valid YAML");

    let validation = DefinitionValidator::validate(&definition);

    if !validation.errors.is_empty() {
        print_section(&"Errors".red().bold().to_string());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if !validation.warnings.is_empty() {
        print_section(&"Warnings".yellow().bold().to_string());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    // Structural checks passed; synthesis catches what they cannot see
    if validation.is_valid() {
        definition.synthesize().map_err(report)?;
        print_success("Definition synthesizes");
    }

    if verbose {
        print_section("Definition summary");
        println!("  Name: {}", definition.name);
        println!("  Applications: {}", definition.applications.len());
        println!("  Deployment groups: {}", definition.deployment_groups.len());
        for group in &definition.deployment_groups {
            let ec2 = group.ec2_instance_tags.as_ref().map_or(0, Vec::len);
            let on_premises = group.on_premise_instance_tags.as_ref().map_or(0, Vec::len);
            println!(
                "    - {} {}",
                group.id,
                format!(
                    "[ec2: {}, on-premises: {}]",
                    plural(ec2, "tag group"),
                    plural(on_premises, "tag group")
                )
                .dimmed()
            );
        }
        println!("  Pipelines: {}", definition.pipelines.len());
        for pipeline in &definition.pipelines {
            println!(
                "    - {} {}",
                pipeline.id,
                format!("[{}]", plural(pipeline.stages.len(), "stage")).dimmed()
            );
        }
    }

    println!();

    if !validation.is_valid() {
        Err(miette::miette!(
            "Definition validation failed with {}",
            plural(validation.errors.len(), "error")
        ))
    } else if validation.has_warnings() {
        println!("{}", "Definition is valid but has warnings.".yellow().bold());
        Ok(())
    } else {
        println!("{}", "Definition is valid!".green().bold());
        Ok(())
    }
}
