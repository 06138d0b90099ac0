// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Tags command - show serialized instance tag sets

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{load_definition, report};
use crate::definition::build_tag_set;
use crate::tags::{InstanceTagSet, TagFilterRecord};
use crate::utils::{plural, print_header, print_info, print_section};

/// Run the tags command
pub async fn run(definition_path: PathBuf, verbose: bool) -> Result<()> {
    let definition = load_definition(&definition_path)?;

    print_header(&format!("Instance tag sets in '{}'", definition.name));

    if definition.deployment_groups.is_empty() {
        println!("  {}", "No deployment groups defined".dimmed());
        return Ok(());
    }

    for group in &definition.deployment_groups {
        print_section(&group.id);

        let ec2 = build_tag_set(group.ec2_instance_tags.as_deref()).map_err(report)?;
        let on_premises = build_tag_set(group.on_premise_instance_tags.as_deref()).map_err(report)?;

        if ec2.is_none() && on_premises.is_none() {
            println!("  {}", "No instance tags".dimmed());
            continue;
        }

        if let Some(set) = ec2 {
            print_tag_set("EC2", &set, verbose)?;
        }
        if let Some(set) = on_premises {
            print_tag_set("On-premises", &set, verbose)?;
        }
    }

    println!();
    Ok(())
}

fn print_tag_set(label: &str, set: &InstanceTagSet, verbose: bool) -> Result<()> {
    let records = set.to_records().map_err(report)?;
    println!(
        "  {} {}",
        label.bold(),
        format!("({})", plural(records.len(), "group")).dimmed()
    );

    for (index, group) in records.iter().enumerate() {
        println!("    Group {}:", index + 1);
        if group.is_empty() {
            println!("      {}", "(no filters)".dimmed());
        }
        for record in group {
            print_info(&format!("  {}", describe(record)));
        }
    }

    if verbose {
        let json = serde_json::to_string_pretty(&records).map_err(|e| report(e.into()))?;
        println!("{}", json.dimmed());
    }

    Ok(())
}

fn describe(record: &TagFilterRecord) -> String {
    match record {
        TagFilterRecord::KeyAndValue { key, value } => {
            format!("{} {}={}", record.kind(), key, value)
        }
        TagFilterRecord::KeyOnly { key } => format!("{} {}", record.kind(), key),
        TagFilterRecord::ValueOnly { value } => format!("{} ={}", record.kind(), value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_records() {
        let and = TagFilterRecord::KeyAndValue {
            key: "role".into(),
            value: "web".into(),
        };
        assert_eq!(describe(&and), "KEY_AND_VALUE role=web");
        assert_eq!(
            describe(&TagFilterRecord::KeyOnly { key: "role".into() }),
            "KEY_ONLY role"
        );
        assert_eq!(
            describe(&TagFilterRecord::ValueOnly { value: "prod".into() }),
            "VALUE_ONLY =prod"
        );
    }
}
