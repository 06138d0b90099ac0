// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Generic pipeline actions and their artifact bounds

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{SynthError, SynthResult};
use crate::iam::Role;

pub const MIN_RUN_ORDER: u32 = 1;
pub const MAX_RUN_ORDER: u32 = 999;

/// Kind of work an action performs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionCategory {
    Source,
    Build,
    Test,
    Approval,
    Deploy,
    Invoke,
}

impl std::fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source => write!(f, "Source"),
            Self::Build => write!(f, "Build"),
            Self::Test => write!(f, "Test"),
            Self::Approval => write!(f, "Approval"),
            Self::Deploy => write!(f, "Deploy"),
            Self::Invoke => write!(f, "Invoke"),
        }
    }
}

/// How many input and output artifacts an action accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactBounds {
    pub min_inputs: usize,
    pub max_inputs: usize,
    pub min_outputs: usize,
    pub max_outputs: usize,
}

impl ArtifactBounds {
    fn check(&self, action: &str, what: &str, count: usize, min: usize, max: usize) -> SynthResult<()> {
        if count < min || count > max {
            return Err(SynthError::InvalidAction {
                action: action.to_string(),
                reason: format!(
                    "expected between {} and {} {} artifacts, got {}",
                    min, max, what, count
                ),
            });
        }
        Ok(())
    }
}

impl Default for ArtifactBounds {
    fn default() -> Self {
        default_bounds()
    }
}

/// Bounds used by actions without special artifact requirements: 0 to 5 of each
pub fn default_bounds() -> ArtifactBounds {
    ArtifactBounds {
        min_inputs: 0,
        max_inputs: 5,
        min_outputs: 0,
        max_outputs: 5,
    }
}

/// Construction options for [`Action`]
#[derive(Debug, Clone)]
pub struct ActionProps {
    pub name: String,
    pub category: ActionCategory,
    pub provider: String,
    pub run_order: Option<u32>,
    pub artifact_bounds: ArtifactBounds,
    pub configuration: Map<String, Value>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Action declaration as placed in a pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    category: ActionCategory,
    provider: String,
    run_order: u32,
    configuration: Map<String, Value>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ActionDeclaration<'a> {
    name: &'a str,
    action_type_id: ActionTypeId<'a>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    configuration: &'a Map<String, Value>,
    input_artifacts: Vec<ArtifactName<'a>>,
    output_artifacts: Vec<ArtifactName<'a>>,
    run_order: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ActionTypeId<'a> {
    category: ActionCategory,
    owner: &'static str,
    provider: &'a str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ArtifactName<'a> {
    name: &'a str,
}

impl Action {
    /// Validate and build an action
    pub fn new(props: ActionProps) -> SynthResult<Self> {
        if props.name.is_empty() {
            return Err(SynthError::InvalidAction {
                action: props.name,
                reason: "action name is empty".into(),
            });
        }

        let run_order = props.run_order.unwrap_or(MIN_RUN_ORDER);
        if !(MIN_RUN_ORDER..=MAX_RUN_ORDER).contains(&run_order) {
            return Err(SynthError::InvalidAction {
                action: props.name,
                reason: format!(
                    "run order must be between {} and {}, got {}",
                    MIN_RUN_ORDER, MAX_RUN_ORDER, run_order
                ),
            });
        }

        let bounds = props.artifact_bounds;
        bounds.check(
            &props.name,
            "input",
            props.inputs.len(),
            bounds.min_inputs,
            bounds.max_inputs,
        )?;
        bounds.check(
            &props.name,
            "output",
            props.outputs.len(),
            bounds.min_outputs,
            bounds.max_outputs,
        )?;

        Ok(Self {
            name: props.name,
            category: props.category,
            provider: props.provider,
            run_order,
            configuration: props.configuration,
            inputs: props.inputs,
            outputs: props.outputs,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ActionCategory {
        self.category
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn run_order(&self) -> u32 {
        self.run_order
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }

    pub(crate) fn declaration(&self) -> ActionDeclaration<'_> {
        ActionDeclaration {
            name: &self.name,
            action_type_id: ActionTypeId {
                category: self.category,
                owner: "AWS",
                provider: &self.provider,
                version: "1",
            },
            configuration: &self.configuration,
            input_artifacts: artifact_names(&self.inputs),
            output_artifacts: artifact_names(&self.outputs),
            run_order: self.run_order,
        }
    }
}

fn artifact_names(artifacts: &[String]) -> Vec<ArtifactName<'_>> {
    artifacts.iter().map(|name| ArtifactName { name }).collect()
}

/// Anything that can be placed in a pipeline stage.
///
/// `bind` runs once the action is accepted by a stage, giving it a chance
/// to grant the pipeline role what it needs.
pub trait PipelineAction {
    /// Name the action will have in its stage
    fn name(&self) -> &str;

    fn bind(&self, pipeline_role: &mut Role);

    fn into_action(self) -> Action;
}

impl PipelineAction for Action {
    fn name(&self) -> &str {
        Action::name(self)
    }

    fn bind(&self, _pipeline_role: &mut Role) {}

    fn into_action(self) -> Action {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(name: &str) -> ActionProps {
        ActionProps {
            name: name.into(),
            category: ActionCategory::Deploy,
            provider: "CodeDeploy".into(),
            run_order: None,
            artifact_bounds: default_bounds(),
            configuration: Map::new(),
            inputs: vec![],
            outputs: vec![],
        }
    }

    #[test]
    fn test_defaults() {
        let action = Action::new(props("Deploy")).unwrap();
        assert_eq!(action.run_order(), 1);
        assert_eq!(action.category(), ActionCategory::Deploy);
    }

    #[test]
    fn test_run_order_out_of_range() {
        let mut p = props("Deploy");
        p.run_order = Some(0);
        assert!(matches!(
            Action::new(p).unwrap_err(),
            SynthError::InvalidAction { .. }
        ));

        let mut p = props("Deploy");
        p.run_order = Some(1000);
        assert!(Action::new(p).is_err());
    }

    #[test]
    fn test_artifact_bounds_enforced() {
        let mut p = props("Deploy");
        p.inputs = (0..6).map(|i| format!("in{}", i)).collect();
        let err = Action::new(p).unwrap_err();
        assert!(err.to_string().contains("input"));

        let mut p = props("Deploy");
        p.artifact_bounds.min_outputs = 1;
        let err = Action::new(p).unwrap_err();
        assert!(err.to_string().contains("output"));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(Action::new(props("")).is_err());
    }

    #[test]
    fn test_declaration() {
        let mut p = props("Deploy");
        p.inputs = vec!["Source".into()];
        p.configuration
            .insert("ApplicationName".into(), json!("my-app"));
        let action = Action::new(p).unwrap();

        assert_eq!(
            serde_json::to_value(action.declaration()).unwrap(),
            json!({
                "Name": "Deploy",
                "ActionTypeId": {
                    "Category": "Deploy",
                    "Owner": "AWS",
                    "Provider": "CodeDeploy",
                    "Version": "1",
                },
                "Configuration": {"ApplicationName": "my-app"},
                "InputArtifacts": [{"Name": "Source"}],
                "OutputArtifacts": [],
                "RunOrder": 1,
            })
        );
    }
}
