use serde_json::Value;

use crate::app::tool_usecases::ToolUseCases;
use crate::domain::errors::DomainError;

use super::tool_text_result;

/// The envelope carries failures itself; only serialization can make this `Err`.
pub(super) fn handle_expand_tool(args: &Value, uc: &ToolUseCases) -> Result<Value, DomainError> {
    let envelope = uc.expand(args);
    let text = serde_json::to_string(&envelope)?;
    tool_text_result(text, !envelope.success)
}
