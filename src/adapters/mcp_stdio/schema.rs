use serde_json::{json, Value};

use crate::app::tool_usecases::{ToolUseCases, EXPAND_TOOL_NAME};
use crate::domain::errors::DomainError;

pub(super) fn tools_schema(uc: &ToolUseCases) -> Result<Value, DomainError> {
    let mut tools = Vec::new();
    for tool in uc.list_tools() {
        tools.push(serde_json::to_value(tool)?);
    }
    tools.push(expand_tool_schema());
    Ok(json!({ "tools": tools }))
}

fn expand_tool_schema() -> Value {
    json!({
        "name": EXPAND_TOOL_NAME,
        "description": "Return the full (or depth-limited) schema fragment of a tool at a JSON Pointer path. Use it when a tool's input schema shows an 'expandable' placeholder.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "toolName": { "type": "string", "description": "Name of the tool whose schema to expand" },
                "path": {
                    "type": "string",
                    "description": "JSON Pointer into the schema, e.g. /properties/filter. Empty or '/' is the whole schema."
                },
                "schemaType": {
                    "type": "string",
                    "enum": ["input", "output"],
                    "description": "Which schema to read (default input)."
                },
                "maxDepth": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Optional nesting ceiling counted from the path; omit for the full fragment."
                }
            },
            "required": ["toolName"]
        }
    })
}
