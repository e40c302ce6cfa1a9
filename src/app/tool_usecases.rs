use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    app::{ports::OperationExecutorPort, registry::SchemaRegistry},
    domain::{
        errors::{DomainError, Result},
        models::{ExpandRequest, ExpandedSchema},
        schema::SchemaNode,
        types::{DepthLimit, JsonPointer, OperationName, SchemaType},
    },
};

pub const EXPAND_TOOL_NAME: &str = "expand_schema";

const TRUNCATED_NOTE: &str =
    "Input schema is abbreviated; call expand_schema with a path for nested fields.";

/// One entry of the tool listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: SchemaNode,
}

/// Result shape of the expand tool. Failures never escape as `Err`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandEnvelope {
    pub success: bool,
    pub data: Option<ExpandedSchema>,
    pub error: Option<String>,
}

impl ExpandEnvelope {
    fn ok(data: ExpandedSchema) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn failed(err: &DomainError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
        }
    }
}

pub struct ToolUseCases {
    registry: Arc<SchemaRegistry>,
    executor: Arc<dyn OperationExecutorPort>,
}

impl ToolUseCases {
    pub fn new(registry: Arc<SchemaRegistry>, executor: Arc<dyn OperationExecutorPort>) -> Self {
        if registry.contains(EXPAND_TOOL_NAME) {
            tracing::warn!(
                "operation '{}' is shadowed by the built-in expand tool",
                EXPAND_TOOL_NAME
            );
        }
        Self { registry, executor }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Whether `name` is a registered operation reachable through `tools/call`.
    pub fn is_operation(&self, name: &str) -> bool {
        name != EXPAND_TOOL_NAME && self.registry.contains(name)
    }

    /// Registered operations with their input schemas truncated at depth 1.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.registry
            .operation_names()
            .filter(|name| name.as_str() != EXPAND_TOOL_NAME)
            .map(|name| self.tool_definition(name))
            .collect()
    }

    fn tool_definition(&self, name: &OperationName) -> ToolDefinition {
        let description = self.registry.description(name.as_str()).map(str::to_string);
        let Some(full) = self.registry.full_input_schema(name.as_str()) else {
            return ToolDefinition {
                name: name.to_string(),
                description,
                input_schema: SchemaNode::from(json!({ "type": "object" })),
            };
        };

        let truncated =
            SchemaRegistry::create_truncated_input_schema(&full, DepthLimit::TRUNCATION_DEFAULT);
        let description = if truncated != full {
            Some(match description {
                Some(text) => format!("{} {}", text.trim_end(), TRUNCATED_NOTE),
                None => TRUNCATED_NOTE.to_string(),
            })
        } else {
            description
        };

        ToolDefinition {
            name: name.to_string(),
            description,
            input_schema: truncated,
        }
    }

    /// Parse expand-tool arguments and run the expansion.
    pub fn expand(&self, args: &Value) -> ExpandEnvelope {
        let outcome = parse_expand_args(args).and_then(|request| {
            let schema = self.registry.expand(&request)?;
            Ok(ExpandedSchema {
                tool_name: request.operation.to_string(),
                path: request.path.to_string(),
                schema_type: request.schema_type,
                schema,
            })
        });

        match outcome {
            Ok(data) => ExpandEnvelope::ok(data),
            Err(err) => {
                tracing::debug!("expand failed: {}", err);
                ExpandEnvelope::failed(&err)
            }
        }
    }

    pub async fn call_operation(&self, name: &str, arguments: Value) -> Result<Value> {
        if !self.is_operation(name) {
            return Err(DomainError::NotFound(format!(
                "operation '{}' not found",
                name
            )));
        }
        let operation = OperationName::new(name)?;
        tracing::info!("dispatching operation '{}'", operation);
        self.executor.execute(&operation, arguments).await
    }
}

fn parse_expand_args(args: &Value) -> Result<ExpandRequest> {
    let tool_name = match args.get("toolName") {
        Some(Value::String(raw)) => OperationName::new(raw)
            .map_err(|_| DomainError::InvalidData("'toolName' cannot be empty".into()))?,
        Some(_) => {
            return Err(DomainError::InvalidData(
                "'toolName' must be a string".into(),
            ))
        }
        None => return Err(DomainError::InvalidData("'toolName' is required".into())),
    };

    let path = match args.get("path") {
        None | Some(Value::Null) => JsonPointer::root(),
        Some(Value::String(raw)) => JsonPointer::parse(raw),
        Some(_) => return Err(DomainError::InvalidData("'path' must be a string".into())),
    };

    let schema_type = match args.get("schemaType") {
        None | Some(Value::Null) => SchemaType::Input,
        Some(Value::String(raw)) => raw.parse::<SchemaType>()?,
        Some(_) => {
            return Err(DomainError::InvalidData(
                "'schemaType' must be 'input' or 'output'".into(),
            ))
        }
    };

    let max_depth = match args.get("maxDepth") {
        None | Some(Value::Null) => DepthLimit::Unbounded,
        Some(value) => {
            let raw = value.as_u64().ok_or_else(|| {
                DomainError::InvalidData("'maxDepth' must be a non-negative integer".into())
            })?;
            let depth = usize::try_from(raw)
                .map_err(|_| DomainError::InvalidData("'maxDepth' is out of range".into()))?;
            DepthLimit::Bounded(depth)
        }
    };

    Ok(ExpandRequest {
        operation: tool_name,
        path,
        schema_type,
        max_depth,
    })
}
