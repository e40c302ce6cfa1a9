use serde::{Deserialize, Serialize};

use super::schema::SchemaNode;
use super::types::{DepthLimit, JsonPointer, OperationName, SchemaType};

/// Registration record for one operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        alias = "input_schema",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_schema: Option<SchemaNode>,
    #[serde(
        default,
        alias = "output_schema",
        skip_serializing_if = "Option::is_none"
    )]
    pub output_schema: Option<SchemaNode>,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_input_schema(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.input_schema = Some(schema.into());
        self
    }

    pub fn with_output_schema(mut self, schema: impl Into<SchemaNode>) -> Self {
        self.output_schema = Some(schema.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandRequest {
    pub operation: OperationName,
    pub path: JsonPointer,
    pub schema_type: SchemaType,
    pub max_depth: DepthLimit,
}

impl ExpandRequest {
    /// Whole input schema, no ceiling.
    pub fn new(operation: OperationName) -> Self {
        Self {
            operation,
            path: JsonPointer::root(),
            schema_type: SchemaType::Input,
            max_depth: DepthLimit::Unbounded,
        }
    }

    pub fn at(mut self, path: &str) -> Self {
        self.path = JsonPointer::parse(path);
        self
    }

    pub fn of(mut self, schema_type: SchemaType) -> Self {
        self.schema_type = schema_type;
        self
    }

    pub fn max_depth(mut self, max_depth: DepthLimit) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// `data` payload of a successful expansion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedSchema {
    pub tool_name: String,
    pub path: String,
    pub schema_type: SchemaType,
    pub schema: SchemaNode,
}
