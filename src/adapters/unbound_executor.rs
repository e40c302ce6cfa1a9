use async_trait::async_trait;
use serde_json::Value;

use crate::{
    app::ports::OperationExecutorPort,
    domain::{
        errors::{DomainError, Result},
        types::OperationName,
    },
};

/// Executor used when no backend is wired in: schemas stay browsable, calls fail.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnboundExecutor;

#[async_trait]
impl OperationExecutorPort for UnboundExecutor {
    async fn execute(&self, operation: &OperationName, _arguments: Value) -> Result<Value> {
        Err(DomainError::InvalidState(format!(
            "no backend configured for operation '{}'",
            operation
        )))
    }
}
