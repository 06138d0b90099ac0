// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Init command - write a starter definition

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::definition::DEFAULT_DEFINITION_FILE;
use crate::utils::{print_header, print_success};

/// Run the init command
pub async fn run(name: Option<String>, force: bool, verbose: bool) -> Result<()> {
    let stack_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "my-stack".to_string())
    });

    print_header("Initializing deploysynth definition...");

    let path = Path::new(DEFAULT_DEFINITION_FILE);
    if path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            DEFAULT_DEFINITION_FILE
        ));
    }

    let content = starter_definition(&stack_name);
    std::fs::write(path, &content).map_err(|e| {
        miette::miette!("Failed to write {}: {}", DEFAULT_DEFINITION_FILE, e)
    })?;

    print_success(&format!("Created {}", DEFAULT_DEFINITION_FILE));

    println!();
    println!("{}", "Definition initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} to describe your deployment groups",
        DEFAULT_DEFINITION_FILE.cyan()
    );
    println!("  2. Run {} to check it", "deploysynth validate".cyan());
    println!("  3. Run {} to render the template", "deploysynth synth".cyan());
    println!();

    if verbose {
        println!("{}", "Generated definition:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

fn starter_definition(name: &str) -> String {
    format!(
        r#"# deploysynth stack definition
version: "1"
name: "{name}"

applications:
  - id: App

deployment_groups:
  - id: WebServers
    application: App
    # Up to 3 tag groups; an instance must match every group.
    # Within a group, an instance matches if it carries any of the filters.
    # An empty key matches on value alone, an empty value list on key alone.
    ec2_instance_tags:
      - role: [web]
        "": [production]

# pipelines:
#   - id: Release
#     stages:
#       - name: Approve
#         actions:
#           - type: manual-approval
#             name: Gate
#       - name: Notify
#         actions:
#           - type: lambda-invoke
#             name: Announce
#             function:
#               name: announce
#               arn: arn:aws:lambda:us-east-1:123456789012:function:announce
#             user_parameters: {{ channel: releases }}
"#
    )
}
