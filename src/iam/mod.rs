// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! IAM policy statements and roles

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::errors::SynthResult;
use crate::synth::{Construct, LogicalId, Resource, Stack, Token};

const POLICY_VERSION: &str = "2012-10-17";

/// An `Allow` statement granting actions on resources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyStatement {
    actions: Vec<String>,
    resources: Vec<Token>,
}

impl PolicyStatement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn add_resource(mut self, resource: impl Into<Token>) -> Self {
        self.resources.push(resource.into());
        self
    }

    /// Grant on every resource (`*`)
    pub fn add_all_resources(self) -> Self {
        self.add_resource("*")
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &[Token] {
        &self.resources
    }
}

/// One element renders as a scalar, anything else as a list
struct OneOrMany<'a, T>(&'a [T]);

impl<T: Serialize> Serialize for OneOrMany<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            [single] => single.serialize(serializer),
            many => many.serialize(serializer),
        }
    }
}

impl Serialize for PolicyStatement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PolicyStatement", 3)?;
        state.serialize_field("Action", &OneOrMany(&self.actions))?;
        state.serialize_field("Effect", "Allow")?;
        state.serialize_field("Resource", &OneOrMany(&self.resources))?;
        state.end()
    }
}

#[derive(Debug, Clone)]
enum RoleSource {
    /// Created in the stack, assumed by the given service principal
    Owned { id: LogicalId, assumed_by: String },
    /// Existing role referenced by name and ARN
    Imported { name: String, arn: String },
}

/// A role whose inline policy collects statements from constructs that use it
#[derive(Debug, Clone)]
pub struct Role {
    source: RoleSource,
    policy_id: LogicalId,
    statements: Vec<PolicyStatement>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyProperties<'a> {
    policy_document: PolicyDocument<'a>,
    policy_name: &'a str,
    roles: [Token; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyDocument<'a> {
    statement: &'a [PolicyStatement],
    version: &'static str,
}

impl Role {
    /// Create a role in `stack` that `service` (e.g. `codepipeline.amazonaws.com`) can assume
    pub fn new(stack: &mut Stack, id: &str, service: &str) -> SynthResult<Self> {
        let role_id = stack.allocate(&[id])?;
        let policy_id = stack.allocate(&[id, "DefaultPolicy"])?;

        Ok(Self {
            source: RoleSource::Owned {
                id: role_id,
                assumed_by: service.to_string(),
            },
            policy_id,
            statements: Vec::new(),
        })
    }

    /// Reference an existing role; only its inline policy is rendered
    pub fn import(stack: &mut Stack, id: &str, name: &str, arn: &str) -> SynthResult<Self> {
        stack.allocate(&[id])?;
        let policy_id = stack.allocate(&[id, "Policy"])?;

        Ok(Self {
            source: RoleSource::Imported {
                name: name.to_string(),
                arn: arn.to_string(),
            },
            policy_id,
            statements: Vec::new(),
        })
    }

    pub fn role_name(&self) -> Token {
        match &self.source {
            RoleSource::Owned { id, .. } => Token::Ref(id.clone()),
            RoleSource::Imported { name, .. } => Token::literal(name.as_str()),
        }
    }

    pub fn role_arn(&self) -> Token {
        match &self.source {
            RoleSource::Owned { id, .. } => Token::get_att(id, "Arn"),
            RoleSource::Imported { arn, .. } => Token::literal(arn.as_str()),
        }
    }

    pub fn add_to_policy(&mut self, statement: PolicyStatement) {
        debug!(
            role = %self.role_name(),
            actions = ?statement.actions(),
            "added policy statement"
        );
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }
}

impl Construct for Role {
    fn synthesize(&self, stack: &mut Stack) -> SynthResult<()> {
        if let RoleSource::Owned { id, assumed_by } = &self.source {
            let properties = json!({
                "AssumeRolePolicyDocument": {
                    "Statement": [{
                        "Action": "sts:AssumeRole",
                        "Effect": "Allow",
                        "Principal": { "Service": assumed_by },
                    }],
                    "Version": POLICY_VERSION,
                }
            });
            stack.put_resource(id.clone(), Resource::new("AWS::IAM::Role", properties)?);
        }

        if self.statements.is_empty() {
            return Ok(());
        }

        let properties = PolicyProperties {
            policy_document: PolicyDocument {
                statement: &self.statements,
                version: POLICY_VERSION,
            },
            policy_name: self.policy_id.as_str(),
            roles: [self.role_name()],
        };
        stack.put_resource(
            self.policy_id.clone(),
            Resource::new("AWS::IAM::Policy", properties)?,
        );

        Ok(())
    }
}
