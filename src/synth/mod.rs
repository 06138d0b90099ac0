// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Template synthesis
//!
//! A [`Stack`] collects the resources rendered by constructs and turns them
//! into a template document. Constructs reserve their logical IDs when they
//! are created and write their resources when passed to [`Stack::synth`].

mod logical_id;
mod token;

pub use logical_id::LogicalId;
pub use token::Token;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::errors::{SynthError, SynthResult};

/// Something that renders one or more resources into a stack
pub trait Construct {
    /// Write this construct's resources into `stack`
    fn synthesize(&self, stack: &mut Stack) -> SynthResult<()>;
}

/// A single rendered resource
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(rename = "Properties", skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Resource {
    /// Render `properties` into a resource of the given type.
    ///
    /// `properties` must serialize to a JSON object.
    pub fn new(resource_type: &str, properties: impl Serialize) -> SynthResult<Self> {
        match serde_json::to_value(properties)? {
            Value::Object(properties) => Ok(Self {
                resource_type: resource_type.to_string(),
                properties,
            }),
            Value::Null => Ok(Self {
                resource_type: resource_type.to_string(),
                properties: Map::new(),
            }),
            other => Err(SynthError::internal(format!(
                "properties of {} rendered as {} instead of an object",
                resource_type, other
            ))),
        }
    }
}

#[derive(Serialize)]
struct Template<'a> {
    #[serde(rename = "Resources")]
    resources: &'a IndexMap<LogicalId, Resource>,
}

/// Container of resources rendered into one template
#[derive(Debug)]
pub struct Stack {
    name: String,
    paths: HashSet<String>,
    resources: IndexMap<LogicalId, Resource>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            paths: HashSet::new(),
            resources: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reserve a construct path and return its logical ID.
    ///
    /// Each path can be reserved once per stack.
    pub fn allocate(&mut self, path: &[&str]) -> SynthResult<LogicalId> {
        let joined = path.join("/");
        if !self.paths.insert(joined.clone()) {
            return Err(SynthError::DuplicateConstruct {
                stack: self.name.clone(),
                id: joined,
            });
        }

        let id = LogicalId::from_path(path);
        debug!(path = %joined, logical_id = %id, "allocated construct");
        Ok(id)
    }

    /// Render a construct into this stack
    pub fn synth(&mut self, construct: &dyn Construct) -> SynthResult<()> {
        construct.synthesize(self)
    }

    /// Insert a rendered resource, replacing any previous rendering of the same ID
    pub fn put_resource(&mut self, id: LogicalId, resource: Resource) {
        debug!(logical_id = %id, resource_type = %resource.resource_type, "rendered resource");
        self.resources.insert(id, resource);
    }

    pub fn resource(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.get(id)
    }

    pub fn resources(&self) -> impl Iterator<Item = (&LogicalId, &Resource)> {
        self.resources.iter()
    }

    /// All rendered resources of the given type, in render order
    pub fn find_resources(&self, resource_type: &str) -> Vec<&Resource> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    /// Whether some resource of `resource_type` has every top-level property
    /// in `expected` with an equal value
    pub fn has_resource(&self, resource_type: &str, expected: &Value) -> bool {
        let Some(expected) = expected.as_object() else {
            return false;
        };

        self.find_resources(resource_type).iter().any(|resource| {
            expected
                .iter()
                .all(|(key, value)| resource.properties.get(key) == Some(value))
        })
    }

    /// Render the template document
    pub fn to_template(&self) -> SynthResult<Value> {
        serde_json::to_value(Template {
            resources: &self.resources,
        })
        .map_err(Into::into)
    }

    pub fn to_json(&self) -> SynthResult<String> {
        serde_json::to_string_pretty(&self.to_template()?).map_err(Into::into)
    }

    pub fn to_yaml(&self) -> SynthResult<String> {
        serde_yaml::to_string(&self.to_template()?).map_err(Into::into)
    }
}
