use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{errors::Result, models::OperationDescriptor, types::OperationName};

// ── Ports ─────────────────────────────────────────────────────────────────────

/// Backend that actually runs a registered operation.
#[async_trait]
pub trait OperationExecutorPort: Send + Sync {
    async fn execute(&self, operation: &OperationName, arguments: Value) -> Result<Value>;
}

/// Where operation descriptors come from at startup.
#[async_trait]
pub trait CatalogSourcePort: Send + Sync {
    async fn load(&self) -> Result<Vec<OperationDescriptor>>;
}
