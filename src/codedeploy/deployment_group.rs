// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Server deployment groups

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApplicationRef, ServerApplication, DEPLOYMENT_GROUP_TYPE};
use crate::errors::SynthResult;
use crate::synth::{Construct, LogicalId, Resource, Stack, Token};
use crate::tags::{InstanceTagSet, TagFilterRecord};

/// Load balancer family a target group belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadBalancerKind {
    Application,
    Network,
}

/// Target group traffic is shifted through during deployments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    kind: LoadBalancerKind,
    name: Token,
}

impl TargetGroup {
    /// Target group rendered in this stack under `id`
    pub fn from_resource(kind: LoadBalancerKind, id: &LogicalId) -> Self {
        Self {
            kind,
            name: Token::get_att(id, "TargetGroupName"),
        }
    }

    /// Existing target group, by name
    pub fn imported(kind: LoadBalancerKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Token::Literal(name.into()),
        }
    }

    pub fn kind(&self) -> LoadBalancerKind {
        self.kind
    }

    pub fn name(&self) -> &Token {
        &self.name
    }
}

/// Construction options for [`ServerDeploymentGroup`]
#[derive(Debug, Clone, Default)]
pub struct ServerDeploymentGroupProps {
    /// Owning application; one is created when absent
    pub application: Option<ApplicationRef>,
    pub deployment_group_name: Option<String>,
    pub deployment_config_name: Option<String>,
    pub auto_scaling_groups: Vec<Token>,
    pub load_balancer: Option<TargetGroup>,
    pub ec2_instance_tags: Option<InstanceTagSet>,
    pub on_premise_instance_tags: Option<InstanceTagSet>,
}

/// Deployment group targeting EC2 and on-premises servers
#[derive(Debug, Clone)]
pub struct ServerDeploymentGroup {
    logical_id: LogicalId,
    application: ApplicationRef,
    created_application: Option<ServerApplication>,
    deployment_group_name: Option<String>,
    deployment_config_name: Option<String>,
    auto_scaling_groups: Vec<Token>,
    load_balancer: Option<TargetGroup>,
    ec2_instance_tags: Option<InstanceTagSet>,
    on_premise_instance_tags: Option<InstanceTagSet>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeploymentGroupProperties<'a> {
    application_name: Token,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_group_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_config_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_scaling_groups: Option<&'a [Token]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    load_balancer_info: Option<LoadBalancerInfo<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deployment_style: Option<DeploymentStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ec2_tag_set: Option<Ec2TagSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_premises_tag_set: Option<OnPremisesTagSet>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct LoadBalancerInfo<'a> {
    target_group_info_list: [TargetGroupInfo<'a>; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TargetGroupInfo<'a> {
    name: &'a Token,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeploymentStyle {
    deployment_option: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2TagSet {
    ec2_tag_set_list: Vec<Ec2TagSetListObject>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct Ec2TagSetListObject {
    ec2_tag_group: Vec<TagFilterRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct OnPremisesTagSet {
    on_premises_tag_set_list: Vec<OnPremisesTagSetListObject>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct OnPremisesTagSetListObject {
    on_premises_tag_group: Vec<TagFilterRecord>,
}

impl ServerDeploymentGroup {
    pub fn new(stack: &mut Stack, id: &str, props: ServerDeploymentGroupProps) -> SynthResult<Self> {
        let logical_id = stack.allocate(&[id])?;

        let (application, created_application) = match props.application {
            Some(application) => (application, None),
            None => {
                let created = ServerApplication::at_path(stack, &[id, "Application"], None)?;
                (created.to_ref(), Some(created))
            }
        };

        debug!(
            id,
            auto_scaling_groups = props.auto_scaling_groups.len(),
            ec2_tag_groups = props.ec2_instance_tags.as_ref().map_or(0, InstanceTagSet::len),
            on_premise_tag_groups = props
                .on_premise_instance_tags
                .as_ref()
                .map_or(0, InstanceTagSet::len),
            "created server deployment group"
        );

        Ok(Self {
            logical_id,
            application,
            created_application,
            deployment_group_name: props.deployment_group_name,
            deployment_config_name: props.deployment_config_name,
            auto_scaling_groups: props.auto_scaling_groups,
            load_balancer: props.load_balancer,
            ec2_instance_tags: props.ec2_instance_tags,
            on_premise_instance_tags: props.on_premise_instance_tags,
        })
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    pub fn application(&self) -> &ApplicationRef {
        &self.application
    }

    /// Name of the deployment group as resolved at deploy time
    pub fn deployment_group_name(&self) -> Token {
        Token::Ref(self.logical_id.clone())
    }

    pub fn auto_scaling_groups(&self) -> &[Token] {
        &self.auto_scaling_groups
    }

    /// Add an auto-scaling group after construction
    pub fn add_auto_scaling_group(&mut self, auto_scaling_group: impl Into<Token>) {
        self.auto_scaling_groups.push(auto_scaling_group.into());
    }

    fn ec2_tag_set(&self) -> SynthResult<Option<Ec2TagSet>> {
        let Some(tag_set) = &self.ec2_instance_tags else {
            return Ok(None);
        };

        let ec2_tag_set_list = tag_set
            .to_records()?
            .into_iter()
            .map(|ec2_tag_group| Ec2TagSetListObject { ec2_tag_group })
            .collect();

        Ok(Some(Ec2TagSet { ec2_tag_set_list }))
    }

    fn on_premises_tag_set(&self) -> SynthResult<Option<OnPremisesTagSet>> {
        let Some(tag_set) = &self.on_premise_instance_tags else {
            return Ok(None);
        };

        let on_premises_tag_set_list = tag_set
            .to_records()?
            .into_iter()
            .map(|on_premises_tag_group| OnPremisesTagSetListObject {
                on_premises_tag_group,
            })
            .collect();

        Ok(Some(OnPremisesTagSet {
            on_premises_tag_set_list,
        }))
    }
}

impl Construct for ServerDeploymentGroup {
    fn synthesize(&self, stack: &mut Stack) -> SynthResult<()> {
        if let Some(application) = &self.created_application {
            application.synthesize(stack)?;
        }

        let properties = DeploymentGroupProperties {
            application_name: self.application.application_name(),
            deployment_group_name: self.deployment_group_name.as_deref(),
            deployment_config_name: self.deployment_config_name.as_deref(),
            auto_scaling_groups: (!self.auto_scaling_groups.is_empty())
                .then_some(self.auto_scaling_groups.as_slice()),
            load_balancer_info: self.load_balancer.as_ref().map(|tg| LoadBalancerInfo {
                target_group_info_list: [TargetGroupInfo { name: tg.name() }],
            }),
            deployment_style: self.load_balancer.as_ref().map(|_| DeploymentStyle {
                deployment_option: "WITH_TRAFFIC_CONTROL",
            }),
            ec2_tag_set: self.ec2_tag_set()?,
            on_premises_tag_set: self.on_premises_tag_set()?,
        };

        stack.put_resource(
            self.logical_id.clone(),
            Resource::new(DEPLOYMENT_GROUP_TYPE, properties)?,
        );
        Ok(())
    }
}

/// Existing deployment group, referenced by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDeploymentGroupRef {
    application: ApplicationRef,
    deployment_group_name: String,
}

impl ServerDeploymentGroupRef {
    pub fn import(application: ApplicationRef, deployment_group_name: impl Into<String>) -> Self {
        Self {
            application,
            deployment_group_name: deployment_group_name.into(),
        }
    }

    pub fn application(&self) -> &ApplicationRef {
        &self.application
    }

    pub fn deployment_group_name(&self) -> Token {
        Token::literal(self.deployment_group_name.as_str())
    }
}
