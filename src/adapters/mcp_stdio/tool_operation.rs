use serde_json::Value;

use crate::app::tool_usecases::ToolUseCases;
use crate::domain::errors::DomainError;

use super::tool_text_result;

pub(super) async fn handle_operation_tool(
    name: &str,
    args: Value,
    uc: &ToolUseCases,
) -> Result<Value, DomainError> {
    let result = uc.call_operation(name, args).await?;
    let text = match result {
        Value::String(text) => text,
        other => serde_json::to_string(&other)?,
    };
    tool_text_result(text, false)
}
