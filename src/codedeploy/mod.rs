// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! CodeDeploy server applications and deployment groups
//!
//! A deployment group picks its targets from auto-scaling groups and/or
//! instance tag sets, optionally behind a load balancer target group.

mod application;
mod deployment_group;

pub use application::{ApplicationRef, ServerApplication};
pub use deployment_group::{
    LoadBalancerKind, ServerDeploymentGroup, ServerDeploymentGroupProps, ServerDeploymentGroupRef,
    TargetGroup,
};

pub const APPLICATION_TYPE: &str = "AWS::CodeDeploy::Application";
pub const DEPLOYMENT_GROUP_TYPE: &str = "AWS::CodeDeploy::DeploymentGroup";
