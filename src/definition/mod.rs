// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Stack definition files
//!
//! Defines the schema for .deploysynth.yaml files and turns a parsed
//! definition into a synthesized [`Stack`].

mod validation;

pub use validation::{DefinitionValidator, ValidationResult};

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::codedeploy::{
    ApplicationRef, LoadBalancerKind, ServerApplication, ServerDeploymentGroup,
    ServerDeploymentGroupProps, TargetGroup,
};
use crate::errors::{SynthError, SynthResult};
use crate::iam::Role;
use crate::pipeline::{
    default_bounds, Action, ActionCategory, ActionProps, FunctionRef, Pipeline,
    PipelineInvokeAction, PipelineInvokeActionProps,
};
use crate::synth::{Stack, Token};
use crate::tags::{InstanceTagSet, TagGroupSpec};

/// Default definition file name
pub const DEFAULT_DEFINITION_FILE: &str = ".deploysynth.yaml";

/// Stack definition from .deploysynth.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDefinition {
    /// Definition format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Stack name
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub applications: Vec<ApplicationDefinition>,

    #[serde(default)]
    pub deployment_groups: Vec<DeploymentGroupDefinition>,

    #[serde(default)]
    pub pipelines: Vec<PipelineDefinition>,
}

fn default_version() -> String {
    "1".to_string()
}

/// CodeDeploy application created in the stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDefinition {
    pub id: String,

    /// Physical application name
    #[serde(default)]
    pub name: Option<String>,
}

/// How a deployment group names its application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ApplicationSelector {
    /// Id of an application declared in this file
    Id(String),

    /// Existing application, by name
    Import { import: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentGroupDefinition {
    pub id: String,

    /// Created automatically when absent
    #[serde(default)]
    pub application: Option<ApplicationSelector>,

    #[serde(default)]
    pub deployment_group_name: Option<String>,

    #[serde(default)]
    pub deployment_config_name: Option<String>,

    /// Auto-scaling group names
    #[serde(default)]
    pub auto_scaling_groups: Vec<String>,

    #[serde(default)]
    pub load_balancer: Option<LoadBalancerDefinition>,

    /// EC2 tag groups, one mapping of key to values per group
    #[serde(default)]
    pub ec2_instance_tags: Option<Vec<TagGroupSpec>>,

    /// On-premises tag groups, one mapping of key to values per group
    #[serde(default)]
    pub on_premise_instance_tags: Option<Vec<TagGroupSpec>>,
}

impl DeploymentGroupDefinition {
    /// Whether the group selects any instances at all
    pub fn has_targets(&self) -> bool {
        !self.auto_scaling_groups.is_empty()
            || self.ec2_instance_tags.is_some()
            || self.on_premise_instance_tags.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerDefinition {
    pub kind: LoadBalancerKind,
    pub target_group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    pub id: String,

    /// Physical pipeline name
    #[serde(default)]
    pub name: Option<String>,

    pub stages: Vec<StageDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDefinition {
    pub name: String,
    pub actions: Vec<ActionDefinition>,
}

/// Action specification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionDefinition {
    /// Invoke a Lambda function
    LambdaInvoke {
        name: String,

        #[serde(default)]
        run_order: Option<u32>,

        function: FunctionDefinition,

        /// Any YAML value; passed through as JSON
        #[serde(default)]
        user_parameters: Option<serde_json::Value>,

        #[serde(default)]
        add_put_job_result_policy: Option<bool>,

        #[serde(default)]
        inputs: Vec<String>,

        #[serde(default)]
        outputs: Vec<String>,
    },

    /// Wait for a person to approve
    ManualApproval {
        name: String,

        #[serde(default)]
        run_order: Option<u32>,
    },
}

impl ActionDefinition {
    pub fn name(&self) -> &str {
        match self {
            Self::LambdaInvoke { name, .. } | Self::ManualApproval { name, .. } => name,
        }
    }

    pub fn run_order(&self) -> Option<u32> {
        match self {
            Self::LambdaInvoke { run_order, .. } | Self::ManualApproval { run_order, .. } => {
                *run_order
            }
        }
    }
}

/// Existing Lambda function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub arn: String,

    /// Execution role; without it the function is not granted job result permissions
    #[serde(default)]
    pub role: Option<RoleDefinition>,
}

/// Existing IAM role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    pub arn: String,
}

impl StackDefinition {
    /// Load a definition from a YAML file
    pub fn from_file(path: &Path) -> SynthResult<Self> {
        if !path.exists() {
            return Err(SynthError::DefinitionNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SynthError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a definition from a YAML string
    pub fn from_yaml(yaml: &str) -> SynthResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize the definition to YAML
    pub fn to_yaml(&self) -> SynthResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    /// Total number of constructs declared at the top level
    pub fn construct_count(&self) -> usize {
        self.applications.len() + self.deployment_groups.len() + self.pipelines.len()
    }

    /// Build every declared construct and render it into a new stack.
    ///
    /// Stops at the first error.
    pub fn synthesize(&self) -> SynthResult<Stack> {
        let mut stack = Stack::new(self.name.as_str());

        let mut applications = IndexMap::new();
        for definition in &self.applications {
            let application =
                ServerApplication::new(&mut stack, &definition.id, definition.name.clone())?;
            stack.synth(&application)?;
            applications.insert(definition.id.as_str(), application);
        }

        for definition in &self.deployment_groups {
            let group = build_deployment_group(&mut stack, definition, &applications)?;
            stack.synth(&group)?;
        }

        let mut functions: IndexMap<String, (FunctionDefinition, FunctionRef)> = IndexMap::new();
        for definition in &self.pipelines {
            let pipeline = build_pipeline(&mut stack, definition, &mut functions)?;
            stack.synth(&pipeline)?;
        }

        for (_, function) in functions.values() {
            stack.synth(function)?;
        }

        info!(
            stack = %self.name,
            resources = stack.resources().count(),
            "synthesized stack"
        );
        Ok(stack)
    }
}

/// Build a tag set from its definition, if present
pub fn build_tag_set(specs: Option<&[TagGroupSpec]>) -> SynthResult<Option<InstanceTagSet>> {
    specs.map(|specs| InstanceTagSet::new(specs.iter().cloned())).transpose()
}

fn build_deployment_group(
    stack: &mut Stack,
    definition: &DeploymentGroupDefinition,
    applications: &IndexMap<&str, ServerApplication>,
) -> SynthResult<ServerDeploymentGroup> {
    let application = match &definition.application {
        None => None,
        Some(ApplicationSelector::Import { import }) => Some(ApplicationRef::import(import.as_str())),
        Some(ApplicationSelector::Id(id)) => {
            let application = applications.get(id.as_str()).ok_or_else(|| {
                SynthError::UnknownApplication {
                    group: definition.id.clone(),
                    application: id.clone(),
                }
            })?;
            Some(application.to_ref())
        }
    };

    let props = ServerDeploymentGroupProps {
        application,
        deployment_group_name: definition.deployment_group_name.clone(),
        deployment_config_name: definition.deployment_config_name.clone(),
        auto_scaling_groups: definition
            .auto_scaling_groups
            .iter()
            .map(|name| Token::literal(name.as_str()))
            .collect(),
        load_balancer: definition
            .load_balancer
            .as_ref()
            .map(|lb| TargetGroup::imported(lb.kind, lb.target_group.as_str())),
        ec2_instance_tags: build_tag_set(definition.ec2_instance_tags.as_deref())?,
        on_premise_instance_tags: build_tag_set(definition.on_premise_instance_tags.as_deref())?,
    };

    ServerDeploymentGroup::new(stack, &definition.id, props)
}

fn build_pipeline(
    stack: &mut Stack,
    definition: &PipelineDefinition,
    functions: &mut IndexMap<String, (FunctionDefinition, FunctionRef)>,
) -> SynthResult<Pipeline> {
    let mut pipeline = Pipeline::new(stack, &definition.id, definition.name.clone())?;

    for stage in &definition.stages {
        pipeline.add_stage(&stage.name)?;

        for action in &stage.actions {
            match action {
                ActionDefinition::LambdaInvoke {
                    name,
                    run_order,
                    function,
                    user_parameters,
                    add_put_job_result_policy,
                    inputs,
                    outputs,
                } => {
                    let lambda = function_ref(stack, functions, function)?;
                    let props = PipelineInvokeActionProps {
                        lambda,
                        user_parameters: user_parameters.clone(),
                        add_put_job_result_policy: *add_put_job_result_policy,
                        run_order: *run_order,
                        inputs: inputs.clone(),
                        outputs: outputs.clone(),
                    };
                    let invoke = PipelineInvokeAction::new(name, props)?;
                    pipeline.add_action(&stage.name, invoke)?;
                }
                ActionDefinition::ManualApproval { name, run_order } => {
                    let approval = Action::new(ActionProps {
                        name: name.clone(),
                        category: ActionCategory::Approval,
                        provider: "Manual".into(),
                        run_order: *run_order,
                        artifact_bounds: default_bounds(),
                        configuration: Default::default(),
                        inputs: Vec::new(),
                        outputs: Vec::new(),
                    })?;
                    pipeline.add_action(&stage.name, approval)?;
                }
            }
        }
    }

    Ok(pipeline)
}

/// Functions are shared by name so every action invoking one adds to the same role.
///
/// Every use of a name must declare the same arn and role.
fn function_ref<'a>(
    stack: &mut Stack,
    functions: &'a mut IndexMap<String, (FunctionDefinition, FunctionRef)>,
    definition: &FunctionDefinition,
) -> SynthResult<&'a mut FunctionRef> {
    match functions.entry(definition.name.clone()) {
        Entry::Occupied(entry) => {
            let (first, function) = entry.into_mut();
            if *first != *definition {
                return Err(conflicting_function(definition));
            }
            Ok(function)
        }
        Entry::Vacant(entry) => {
            let mut function = FunctionRef::import(definition.name.as_str(), definition.arn.as_str());
            if let Some(role) = &definition.role {
                let id = format!("{}ExecutionRole", definition.name);
                function = function.with_role(Role::import(stack, &id, &role.name, &role.arn)?);
            }
            debug!(function = %definition.name, "imported function");
            let (_, function) = entry.insert((definition.clone(), function));
            Ok(function)
        }
    }
}

pub(crate) fn conflicting_function(definition: &FunctionDefinition) -> SynthError {
    SynthError::InvalidDefinition {
        reason: format!(
            "function '{}' is declared again with a different arn or role",
            definition.name
        ),
        help: Some(
            "Declare the function once with a YAML anchor and reference it from each action"
                .into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codedeploy::DEPLOYMENT_GROUP_TYPE;
    use crate::pipeline::PIPELINE_TYPE;
    use serde_json::json;

    const FULL: &str = r#"
version: "1"
name: "demo"
applications:
  - id: MyApp
deployment_groups:
  - id: Ec2Group
    application: MyApp
    auto_scaling_groups: [web-asg]
    load_balancer:
      kind: application
      target_group: web-tg
    ec2_instance_tags:
      - some-key: [some-value]
        other-key: []
  - id: OnPremGroup
    application:
      import: LegacyApp
    on_premise_instance_tags:
      - some-key: [some-value, another-value]
      - "": [keyless-value]
pipelines:
  - id: Pipeline
    stages:
      - name: Approve
        actions:
          - type: manual-approval
            name: Gate
      - name: Invoke
        actions:
          - type: lambda-invoke
            name: CallFn
            function:
              name: my-fn
              arn: arn:aws:lambda:us-east-1:123456789012:function:my-fn
              role:
                name: fn-role
                arn: arn:aws:iam::123456789012:role/fn-role
            user_parameters:
              env: prod
"#;

    #[test]
    fn test_parse_definition() {
        let definition = StackDefinition::from_yaml(FULL).unwrap();
        assert_eq!(definition.name, "demo");
        assert_eq!(definition.construct_count(), 4);
        assert_eq!(
            definition.deployment_groups[1].application,
            Some(ApplicationSelector::Import {
                import: "LegacyApp".into()
            })
        );

        let tags = definition.deployment_groups[0]
            .ec2_instance_tags
            .as_ref()
            .unwrap();
        let keys: Vec<_> = tags[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["some-key", "other-key"]);
    }

    #[test]
    fn test_synthesize_full_definition() {
        let stack = StackDefinition::from_yaml(FULL).unwrap().synthesize().unwrap();

        assert_eq!(stack.find_resources(DEPLOYMENT_GROUP_TYPE).len(), 2);
        assert!(stack.has_resource(
            DEPLOYMENT_GROUP_TYPE,
            &json!({
                "AutoScalingGroups": ["web-asg"],
                "LoadBalancerInfo": {"TargetGroupInfoList": [{"Name": "web-tg"}]},
                "Ec2TagSet": {
                    "Ec2TagSetList": [{
                        "Ec2TagGroup": [
                            {"Type": "KEY_AND_VALUE", "Key": "some-key", "Value": "some-value"},
                            {"Type": "KEY_ONLY", "Key": "other-key"},
                        ],
                    }],
                },
            })
        ));
        assert!(stack.has_resource(
            DEPLOYMENT_GROUP_TYPE,
            &json!({
                "ApplicationName": "LegacyApp",
                "OnPremisesTagSet": {
                    "OnPremisesTagSetList": [
                        {"OnPremisesTagGroup": [
                            {"Type": "KEY_AND_VALUE", "Key": "some-key", "Value": "some-value"},
                            {"Type": "KEY_AND_VALUE", "Key": "some-key", "Value": "another-value"},
                        ]},
                        {"OnPremisesTagGroup": [
                            {"Type": "VALUE_ONLY", "Value": "keyless-value"},
                        ]},
                    ],
                },
            })
        ));

        assert_eq!(stack.find_resources(PIPELINE_TYPE).len(), 1);
        assert!(stack.has_resource("AWS::IAM::Policy", &json!({"Roles": ["fn-role"]})));
    }

    #[test]
    fn test_keyless_valueless_definition_fails() {
        let yaml = r#"
name: "bad"
deployment_groups:
  - id: Group
    on_premise_instance_tags:
      - "": []
"#;
        let err = StackDefinition::from_yaml(yaml).unwrap().synthesize().unwrap_err();
        assert!(matches!(err, SynthError::KeylessValuelessFilter { .. }));
    }

    #[test]
    fn test_four_tag_groups_fail() {
        let yaml = r#"
name: "bad"
deployment_groups:
  - id: Group
    on_premise_instance_tags: [{}, {}, {}, {}]
"#;
        let err = StackDefinition::from_yaml(yaml).unwrap().synthesize().unwrap_err();
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_unknown_application() {
        let yaml = r#"
name: "bad"
deployment_groups:
  - id: Group
    application: Missing
"#;
        let err = StackDefinition::from_yaml(yaml).unwrap().synthesize().unwrap_err();
        assert!(matches!(err, SynthError::UnknownApplication { .. }));
    }

    #[test]
    fn test_shared_function_role_collects_statements() {
        let yaml = r#"
name: "shared"
pipelines:
  - id: Pipeline
    stages:
      - name: Invoke
        actions:
          - type: lambda-invoke
            name: First
            function: &fn
              name: my-fn
              arn: arn:aws:lambda:us-east-1:1:function:my-fn
              role: { name: fn-role, arn: "arn:aws:iam::1:role/fn-role" }
          - type: lambda-invoke
            name: Second
            run_order: 2
            function: *fn
"#;
        let stack = StackDefinition::from_yaml(yaml).unwrap().synthesize().unwrap();
        let policies = stack.find_resources("AWS::IAM::Policy");
        let function_policy = policies
            .iter()
            .find(|p| p.properties["Roles"] == json!(["fn-role"]))
            .unwrap();
        assert_eq!(
            function_policy.properties["PolicyDocument"]["Statement"]
                .as_array()
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_conflicting_function_redeclaration_fails() {
        let yaml = r#"
name: conflict
pipelines:
  - id: Pipeline
    stages:
      - name: Invoke
        actions:
          - type: lambda-invoke
            name: First
            function: { name: fn, arn: "arn:one" }
          - type: lambda-invoke
            name: Second
            function:
              name: fn
              arn: "arn:two"
              role: { name: r, arn: "arn:aws:iam::123456789012:role/r" }
"#;
        let err = StackDefinition::from_yaml(yaml).unwrap().synthesize().unwrap_err();
        assert!(matches!(err, SynthError::InvalidDefinition { .. }));
        assert!(err.to_string().contains("'fn'"));
    }

    #[test]
    fn test_round_trip_yaml() {
        let definition = StackDefinition::from_yaml(FULL).unwrap();
        let yaml = definition.to_yaml().unwrap();
        let parsed = StackDefinition::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.name, definition.name);
        assert_eq!(parsed.construct_count(), definition.construct_count());
    }

    #[test]
    fn test_missing_file() {
        let err = StackDefinition::from_file(Path::new("/nonexistent/.deploysynth.yaml"))
            .unwrap_err();
        assert!(matches!(err, SynthError::DefinitionNotFound { .. }));
    }
}
