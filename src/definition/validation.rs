// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Definition validation
//!
//! Checks a whole definition and reports every problem at once, unlike
//! synthesis which stops at the first.

use std::collections::{HashMap, HashSet};

use super::{
    build_tag_set, conflicting_function, ActionDefinition, ApplicationSelector,
    FunctionDefinition, StackDefinition,
};
use crate::pipeline::{MAX_RUN_ORDER, MIN_RUN_ORDER};
use crate::tags::TagGroupSpec;

/// Definition validator
pub struct DefinitionValidator;

impl DefinitionValidator {
    /// Validate a stack definition
    pub fn validate(definition: &StackDefinition) -> ValidationResult {
        let mut result = ValidationResult::new();

        if definition.version != "1" {
            result.add_warning(&format!(
                "Unknown definition version '{}', reading it as version 1",
                definition.version
            ));
        }

        if definition.construct_count() == 0 {
            result.add_error("Definition declares no applications, deployment groups or pipelines");
        }

        // Construct ids share one namespace in the stack
        let mut seen_ids = HashSet::new();
        let ids = definition
            .applications
            .iter()
            .map(|a| a.id.as_str())
            .chain(definition.deployment_groups.iter().map(|g| g.id.as_str()))
            .chain(definition.pipelines.iter().map(|p| p.id.as_str()));
        for id in ids {
            if id.is_empty() {
                result.add_error("Construct id must not be empty");
            } else if !seen_ids.insert(id) {
                result.add_error(&format!("Duplicate construct id: '{}'", id));
            }
        }

        Self::validate_deployment_groups(definition, &mut result);
        Self::validate_pipelines(definition, &mut result);

        result
    }

    fn validate_deployment_groups(definition: &StackDefinition, result: &mut ValidationResult) {
        let application_ids: HashSet<&str> =
            definition.applications.iter().map(|a| a.id.as_str()).collect();

        for group in &definition.deployment_groups {
            match &group.application {
                Some(ApplicationSelector::Id(id)) if !application_ids.contains(id.as_str()) => {
                    result.add_error(&format!(
                        "Deployment group '{}': References unknown application '{}'",
                        group.id, id
                    ));
                }
                None => {
                    result.add_warning(&format!(
                        "Deployment group '{}': No application given, one will be created",
                        group.id
                    ));
                }
                _ => {}
            }

            if !group.has_targets() {
                result.add_warning(&format!(
                    "Deployment group '{}': No auto-scaling groups or instance tags, \
                     deployments will have no targets",
                    group.id
                ));
            }

            Self::validate_tag_set(
                &group.id,
                "ec2_instance_tags",
                group.ec2_instance_tags.as_deref(),
                result,
            );
            Self::validate_tag_set(
                &group.id,
                "on_premise_instance_tags",
                group.on_premise_instance_tags.as_deref(),
                result,
            );
        }
    }

    fn validate_tag_set(
        group: &str,
        field: &str,
        specs: Option<&[TagGroupSpec]>,
        result: &mut ValidationResult,
    ) {
        if let Err(e) = build_tag_set(specs) {
            result.add_error(&format!("Deployment group '{}': {}: {}", group, field, e));
        }
    }

    fn validate_pipelines(definition: &StackDefinition, result: &mut ValidationResult) {
        // Functions are shared by name across every pipeline
        let mut functions: HashMap<&str, &FunctionDefinition> = HashMap::new();

        for pipeline in &definition.pipelines {
            if pipeline.stages.is_empty() {
                result.add_error(&format!("Pipeline '{}': No stages defined", pipeline.id));
            }

            let mut stage_names = HashSet::new();
            for stage in &pipeline.stages {
                if !stage_names.insert(stage.name.as_str()) {
                    result.add_error(&format!(
                        "Pipeline '{}': Duplicate stage name '{}'",
                        pipeline.id, stage.name
                    ));
                }

                if stage.actions.is_empty() {
                    result.add_error(&format!(
                        "Pipeline '{}': Stage '{}' has no actions",
                        pipeline.id, stage.name
                    ));
                }

                let mut action_names = HashSet::new();
                for action in &stage.actions {
                    if !action_names.insert(action.name()) {
                        result.add_error(&format!(
                            "Pipeline '{}': Stage '{}' has duplicate action '{}'",
                            pipeline.id,
                            stage.name,
                            action.name()
                        ));
                    }

                    if let Some(run_order) = action.run_order() {
                        if !(MIN_RUN_ORDER..=MAX_RUN_ORDER).contains(&run_order) {
                            result.add_error(&format!(
                                "Pipeline '{}': Action '{}' run order {} is outside {}..={}",
                                pipeline.id,
                                action.name(),
                                run_order,
                                MIN_RUN_ORDER,
                                MAX_RUN_ORDER
                            ));
                        }
                    }

                    if let ActionDefinition::LambdaInvoke {
                        function,
                        add_put_job_result_policy,
                        ..
                    } = action
                    {
                        let first = *functions.entry(function.name.as_str()).or_insert(function);
                        if first != function {
                            result.add_error(&format!(
                                "Pipeline '{}': Action '{}': {}",
                                pipeline.id,
                                action.name(),
                                conflicting_function(function)
                            ));
                        }

                        if function.role.is_none() && add_put_job_result_policy.unwrap_or(true) {
                            result.add_warning(&format!(
                                "Pipeline '{}': Function '{}' has no role, it will not be allowed \
                                 to report job results",
                                pipeline.id, function.name
                            ));
                        }
                    }
                }
            }
        }
    }
}

/// Result of definition validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
