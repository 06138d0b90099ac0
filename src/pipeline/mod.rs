// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! CodePipeline pipelines, stages and actions
//!
//! Actions are bound to the pipeline when added, which lets them extend the
//! pipeline role's policy with what they need at run time.

mod action;
mod lambda;

pub use action::{
    default_bounds, Action, ActionCategory, ActionProps, ArtifactBounds, PipelineAction,
    MAX_RUN_ORDER, MIN_RUN_ORDER,
};
pub use lambda::{FunctionRef, PipelineInvokeAction, PipelineInvokeActionProps};

use serde::Serialize;
use tracing::debug;

use crate::errors::{SynthError, SynthResult};
use crate::iam::Role;
use crate::synth::{Construct, LogicalId, Resource, Stack, Token};

pub const PIPELINE_TYPE: &str = "AWS::CodePipeline::Pipeline";

/// A named stage holding actions
#[derive(Debug, Clone)]
pub struct Stage {
    name: String,
    actions: Vec<Action>,
}

impl Stage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// Pipeline with its service role
#[derive(Debug)]
pub struct Pipeline {
    id: String,
    logical_id: LogicalId,
    pipeline_name: Option<String>,
    role: Role,
    stages: Vec<Stage>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PipelineProperties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    role_arn: Token,
    stages: Vec<StageDeclaration<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct StageDeclaration<'a> {
    name: &'a str,
    actions: Vec<action::ActionDeclaration<'a>>,
}

impl Pipeline {
    /// Create a pipeline and its role (`<id>Role`)
    pub fn new(stack: &mut Stack, id: &str, pipeline_name: Option<String>) -> SynthResult<Self> {
        let logical_id = stack.allocate(&[id])?;
        let role = Role::new(stack, &format!("{}Role", id), "codepipeline.amazonaws.com")?;

        Ok(Self {
            id: id.to_string(),
            logical_id,
            pipeline_name,
            role,
            stages: Vec::new(),
        })
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn add_stage(&mut self, name: &str) -> SynthResult<()> {
        if self.stages.iter().any(|s| s.name == name) {
            return Err(SynthError::InvalidPipeline {
                pipeline: self.id.clone(),
                reason: format!("duplicate stage name '{}'", name),
            });
        }

        self.stages.push(Stage {
            name: name.to_string(),
            actions: Vec::new(),
        });
        Ok(())
    }

    /// Bind `action` to this pipeline and append it to `stage`
    pub fn add_action(&mut self, stage: &str, action: impl PipelineAction) -> SynthResult<()> {
        let Some(index) = self.stages.iter().position(|s| s.name == stage) else {
            return Err(SynthError::InvalidPipeline {
                pipeline: self.id.clone(),
                reason: format!("no stage named '{}'", stage),
            });
        };

        if self.stages[index]
            .actions
            .iter()
            .any(|a| a.name() == action.name())
        {
            return Err(SynthError::InvalidAction {
                action: action.name().to_string(),
                reason: format!("stage '{}' already has an action with this name", stage),
            });
        }

        // Only accepted actions may touch the role
        action.bind(&mut self.role);
        let action = action.into_action();

        debug!(
            pipeline = %self.id,
            stage,
            action = action.name(),
            category = %action.category(),
            "added pipeline action"
        );
        self.stages[index].actions.push(action);
        Ok(())
    }

    fn validate(&self) -> SynthResult<()> {
        if self.stages.is_empty() {
            return Err(SynthError::InvalidPipeline {
                pipeline: self.id.clone(),
                reason: "pipeline has no stages".into(),
            });
        }

        if let Some(stage) = self.stages.iter().find(|s| s.actions.is_empty()) {
            return Err(SynthError::InvalidPipeline {
                pipeline: self.id.clone(),
                reason: format!("stage '{}' has no actions", stage.name),
            });
        }

        Ok(())
    }
}

impl Construct for Pipeline {
    fn synthesize(&self, stack: &mut Stack) -> SynthResult<()> {
        self.validate()?;
        self.role.synthesize(stack)?;

        let properties = PipelineProperties {
            name: self.pipeline_name.as_deref(),
            role_arn: self.role.role_arn(),
            stages: self
                .stages
                .iter()
                .map(|stage| StageDeclaration {
                    name: &stage.name,
                    actions: stage.actions.iter().map(Action::declaration).collect(),
                })
                .collect(),
        };

        stack.put_resource(
            self.logical_id.clone(),
            Resource::new(PIPELINE_TYPE, properties)?,
        );
        Ok(())
    }
}
