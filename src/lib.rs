// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! # deploysynth - Deployment Definition Synthesizer
//!
//! `deploysynth` turns CodeDeploy deployment groups and CodePipeline actions
//! into CloudFormation template documents.
//!
//! ## Features
//!
//! - **Instance tag sets** - Validated EC2 and on-premises tag filter groups
//! - **Deployment groups** - Server deployment groups with load balancers and auto-scaling groups
//! - **Pipeline actions** - Lambda invoke actions that wire up their own IAM grants
//! - **Stable logical IDs** - Derived from construct paths, identical across runs
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a starter definition
//! deploysynth init my-stack
//!
//! # Check it
//! deploysynth validate
//!
//! # Render the template
//! deploysynth synth --format yaml
//! ```
//!
//! ## Library use
//!
//! ```
//! use deploysynth::{tag_group, InstanceTagSet};
//!
//! let tags = InstanceTagSet::new([tag_group! { "role" => ["web"], "" => ["prod"] }]).unwrap();
//! let records = serde_json::to_value(tags.to_records().unwrap()).unwrap();
//! assert_eq!(records[0][1]["Type"], "VALUE_ONLY");
//! ```

pub mod cli;
pub mod codedeploy;
pub mod definition;
pub mod errors;
pub mod iam;
pub mod pipeline;
pub mod synth;
pub mod tags;
pub mod utils;

// Re-export commonly used types
pub use definition::{DefinitionValidator, StackDefinition};
pub use errors::{SynthError, SynthResult};
pub use synth::{Construct, LogicalId, Stack, Token};
pub use tags::{InstanceTagSet, TagFilter, TagFilterRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
