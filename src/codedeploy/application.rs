// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Server compute platform applications

use serde::Serialize;

use super::APPLICATION_TYPE;
use crate::errors::SynthResult;
use crate::synth::{Construct, LogicalId, Resource, Stack, Token};

/// Application created in the stack
#[derive(Debug, Clone)]
pub struct ServerApplication {
    logical_id: LogicalId,
    application_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ApplicationProperties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    application_name: Option<&'a str>,
    compute_platform: &'static str,
}

impl ServerApplication {
    pub fn new(stack: &mut Stack, id: &str, application_name: Option<String>) -> SynthResult<Self> {
        Self::at_path(stack, &[id], application_name)
    }

    pub(crate) fn at_path(
        stack: &mut Stack,
        path: &[&str],
        application_name: Option<String>,
    ) -> SynthResult<Self> {
        Ok(Self {
            logical_id: stack.allocate(path)?,
            application_name,
        })
    }

    pub fn logical_id(&self) -> &LogicalId {
        &self.logical_id
    }

    /// Reference to hand to deployment groups
    pub fn to_ref(&self) -> ApplicationRef {
        ApplicationRef::Owned(self.logical_id.clone())
    }
}

impl Construct for ServerApplication {
    fn synthesize(&self, stack: &mut Stack) -> SynthResult<()> {
        let properties = ApplicationProperties {
            application_name: self.application_name.as_deref(),
            compute_platform: "Server",
        };
        stack.put_resource(
            self.logical_id.clone(),
            Resource::new(APPLICATION_TYPE, properties)?,
        );
        Ok(())
    }
}

/// Application a deployment group belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationRef {
    /// Application rendered in this stack
    Owned(LogicalId),
    /// Existing application, by name
    Imported(String),
}

impl ApplicationRef {
    pub fn import(application_name: impl Into<String>) -> Self {
        Self::Imported(application_name.into())
    }

    pub fn application_name(&self) -> Token {
        match self {
            Self::Owned(id) => Token::Ref(id.clone()),
            Self::Imported(name) => Token::literal(name.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_resource() {
        let mut stack = Stack::new("test");
        let app = ServerApplication::new(&mut stack, "MyApp", None).unwrap();
        stack.synth(&app).unwrap();

        let resource = stack.resource(app.logical_id()).unwrap();
        assert_eq!(resource.resource_type, APPLICATION_TYPE);
        assert_eq!(
            serde_json::Value::Object(resource.properties.clone()),
            json!({"ComputePlatform": "Server"})
        );
    }

    #[test]
    fn test_named_application() {
        let mut stack = Stack::new("test");
        let app = ServerApplication::new(&mut stack, "MyApp", Some("my-app".into())).unwrap();
        stack.synth(&app).unwrap();

        assert!(stack.has_resource(
            APPLICATION_TYPE,
            &json!({"ApplicationName": "my-app", "ComputePlatform": "Server"})
        ));
    }

    #[test]
    fn test_refs() {
        let mut stack = Stack::new("test");
        let app = ServerApplication::new(&mut stack, "MyApp", None).unwrap();

        assert_eq!(
            app.to_ref().application_name(),
            Token::Ref(app.logical_id().clone())
        );
        assert_eq!(
            ApplicationRef::import("MyApp").application_name(),
            Token::literal("MyApp")
        );
    }
}
