// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deploysynth contributors

//! Values that are either literal or resolved by the deployment service

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::LogicalId;

/// A string-valued property: a literal, or a reference to another resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain string
    Literal(String),
    /// `{"Ref": id}`
    Ref(LogicalId),
    /// `{"Fn::GetAtt": [id, attribute]}`
    GetAtt(LogicalId, String),
}

impl Token {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    pub fn get_att(id: &LogicalId, attribute: &str) -> Self {
        Self::GetAtt(id.clone(), attribute.to_string())
    }

    /// Literal value, if this token is not a reference
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(s) => serializer.serialize_str(s),
            Self::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Self::GetAtt(id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &(id, attribute))?;
                map.end()
            }
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(s) => write!(f, "{}", s),
            Self::Ref(id) => write!(f, "${{Ref:{}}}", id),
            Self::GetAtt(id, attribute) => write!(f, "${{GetAtt:{}.{}}}", id, attribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialization() {
        let id = LogicalId::from_path(&["ALB"]);

        assert_eq!(serde_json::to_value(Token::from("x")).unwrap(), json!("x"));
        assert_eq!(
            serde_json::to_value(Token::Ref(id.clone())).unwrap(),
            json!({"Ref": id.as_str()})
        );
        assert_eq!(
            serde_json::to_value(Token::get_att(&id, "TargetGroupName")).unwrap(),
            json!({"Fn::GetAtt": [id.as_str(), "TargetGroupName"]})
        );
    }

    #[test]
    fn test_display() {
        let id = LogicalId::from_path(&["Role"]);
        assert_eq!(Token::literal("name").to_string(), "name");
        assert_eq!(
            Token::get_att(&id, "Arn").to_string(),
            format!("${{GetAtt:{}.Arn}}", id)
        );
        assert_eq!(Token::Ref(id).as_literal(), None);
    }
}
