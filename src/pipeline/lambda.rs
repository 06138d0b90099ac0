// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Invoking Lambda functions from a pipeline

use serde_json::{Map, Value};
use tracing::warn;

use super::action::{default_bounds, Action, ActionCategory, ActionProps, PipelineAction};
use crate::errors::SynthResult;
use crate::iam::{PolicyStatement, Role};
use crate::synth::{Construct, Stack};

/// Existing Lambda function
#[derive(Debug, Clone)]
pub struct FunctionRef {
    function_name: String,
    function_arn: String,
    role: Option<Role>,
}

impl FunctionRef {
    pub fn import(function_name: impl Into<String>, function_arn: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            function_arn: function_arn.into(),
            role: None,
        }
    }

    /// Attach the function's execution role so statements can be added to it
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn function_arn(&self) -> &str {
        &self.function_arn
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Add a statement to the execution role.
    ///
    /// Functions imported without a role silently keep their permissions.
    pub fn add_to_role_policy(&mut self, statement: PolicyStatement) {
        match &mut self.role {
            Some(role) => role.add_to_policy(statement),
            None => warn!(
                function = %self.function_name,
                actions = ?statement.actions(),
                "function has no execution role, dropping policy statement"
            ),
        }
    }
}

impl Construct for FunctionRef {
    fn synthesize(&self, stack: &mut Stack) -> SynthResult<()> {
        match &self.role {
            Some(role) => role.synthesize(stack),
            None => Ok(()),
        }
    }
}

/// Construction options for [`PipelineInvokeAction`]
#[derive(Debug)]
pub struct PipelineInvokeActionProps<'a> {
    /// Function to invoke
    pub lambda: &'a mut FunctionRef,

    /// Passed to the function as the job's user parameters
    pub user_parameters: Option<Value>,

    /// Let the function report job results back to the pipeline; defaults to true.
    ///
    /// The grant is on every pipeline (`*`): naming this pipeline would make
    /// the function and the pipeline depend on each other.
    pub add_put_job_result_policy: Option<bool>,

    pub run_order: Option<u32>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl<'a> PipelineInvokeActionProps<'a> {
    pub fn new(lambda: &'a mut FunctionRef) -> Self {
        Self {
            lambda,
            user_parameters: None,
            add_put_job_result_policy: None,
            run_order: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

/// Pipeline action that invokes a Lambda function
#[derive(Debug, Clone)]
pub struct PipelineInvokeAction {
    action: Action,
    function_arn: String,
}

impl PipelineInvokeAction {
    pub fn new(name: &str, props: PipelineInvokeActionProps<'_>) -> SynthResult<Self> {
        let mut configuration = Map::new();
        configuration.insert(
            "FunctionName".into(),
            Value::String(props.lambda.function_name().to_string()),
        );
        if let Some(user_parameters) = props.user_parameters {
            configuration.insert("UserParameters".into(), user_parameters);
        }

        let action = Action::new(ActionProps {
            name: name.to_string(),
            category: ActionCategory::Invoke,
            provider: "Lambda".into(),
            run_order: props.run_order,
            artifact_bounds: default_bounds(),
            configuration,
            inputs: props.inputs,
            outputs: props.outputs,
        })?;

        if props.add_put_job_result_policy.unwrap_or(true) {
            props.lambda.add_to_role_policy(
                PolicyStatement::new()
                    .add_all_resources()
                    .add_action("codepipeline:PutJobSuccessResult")
                    .add_action("codepipeline:PutJobFailureResult"),
            );
        }

        Ok(Self {
            action,
            function_arn: props.lambda.function_arn().to_string(),
        })
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

impl PipelineAction for PipelineInvokeAction {
    fn name(&self) -> &str {
        self.action.name()
    }

    fn bind(&self, pipeline_role: &mut Role) {
        pipeline_role.add_to_policy(
            PolicyStatement::new()
                .add_action("lambda:ListFunctions")
                .add_all_resources(),
        );

        pipeline_role.add_to_policy(
            PolicyStatement::new()
                .add_action("lambda:InvokeFunction")
                .add_resource(self.function_arn.as_str()),
        );
    }

    fn into_action(self) -> Action {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:my-fn";

    fn function_with_role(stack: &mut Stack) -> FunctionRef {
        let role = Role::import(stack, "FnRole", "fn-role", "arn:aws:iam::123456789012:role/fn-role")
            .unwrap();
        FunctionRef::import("my-fn", ARN).with_role(role)
    }

    #[test]
    fn test_configuration() {
        let mut stack = Stack::new("test");
        let mut function = function_with_role(&mut stack);
        let mut props = PipelineInvokeActionProps::new(&mut function);
        props.user_parameters = Some(json!({"env": "prod"}));

        let invoke = PipelineInvokeAction::new("Invoke", props).unwrap();
        let action = invoke.action();
        assert_eq!(action.category(), ActionCategory::Invoke);
        assert_eq!(action.provider(), "Lambda");
        assert_eq!(
            Value::Object(action.configuration().clone()),
            json!({"FunctionName": "my-fn", "UserParameters": {"env": "prod"}})
        );
    }

    #[test]
    fn test_user_parameters_omitted_when_absent() {
        let mut function = FunctionRef::import("my-fn", ARN);
        let invoke =
            PipelineInvokeAction::new("Invoke", PipelineInvokeActionProps::new(&mut function))
                .unwrap();
        assert!(!invoke.action().configuration().contains_key("UserParameters"));
    }

    #[test]
    fn test_put_job_result_policy_added_by_default() {
        let mut stack = Stack::new("test");
        let mut function = function_with_role(&mut stack);
        PipelineInvokeAction::new("Invoke", PipelineInvokeActionProps::new(&mut function))
            .unwrap();

        let statements = function.role().unwrap().statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].actions(),
            &[
                "codepipeline:PutJobSuccessResult".to_string(),
                "codepipeline:PutJobFailureResult".to_string(),
            ]
        );

        stack.synth(&function).unwrap();
        assert!(stack.has_resource("AWS::IAM::Policy", &json!({"Roles": ["fn-role"]})));
    }

    #[test]
    fn test_put_job_result_policy_can_be_disabled() {
        let mut stack = Stack::new("test");
        let mut function = function_with_role(&mut stack);
        let mut props = PipelineInvokeActionProps::new(&mut function);
        props.add_put_job_result_policy = Some(false);
        PipelineInvokeAction::new("Invoke", props).unwrap();

        assert!(function.role().unwrap().statements().is_empty());
    }

    #[test]
    fn test_bind_grants_pipeline_role() {
        let mut stack = Stack::new("test");
        let mut pipeline_role =
            Role::new(&mut stack, "PipelineRole", "codepipeline.amazonaws.com").unwrap();
        let mut function = FunctionRef::import("my-fn", ARN);
        let invoke =
            PipelineInvokeAction::new("Invoke", PipelineInvokeActionProps::new(&mut function))
                .unwrap();

        invoke.bind(&mut pipeline_role);

        let statements: Vec<Value> = pipeline_role
            .statements()
            .iter()
            .map(|s| serde_json::to_value(s).unwrap())
            .collect();
        assert_eq!(
            statements,
            vec![
                json!({"Action": "lambda:ListFunctions", "Effect": "Allow", "Resource": "*"}),
                json!({"Action": "lambda:InvokeFunction", "Effect": "Allow", "Resource": ARN}),
            ]
        );
    }
}
