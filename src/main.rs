use std::path::PathBuf;
use std::sync::Arc;

use mcp_schema_registry::adapters::catalog_file::CatalogFileAdapter;
use mcp_schema_registry::adapters::unbound_executor::UnboundExecutor;
use mcp_schema_registry::app::ports::CatalogSourcePort;
use mcp_schema_registry::app::registry::SchemaRegistry;
use mcp_schema_registry::app::tool_usecases::ToolUseCases;

fn catalog_path_from_env() -> Option<PathBuf> {
    std::env::var("SCHEMA_REGISTRY_CATALOG")
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = if std::env::var("SCHEMA_REGISTRY_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_env("SCHEMA_REGISTRY_LOG")
    } else {
        tracing_subscriber::EnvFilter::new("mcp_schema_registry=info")
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr) // log to stderr so stdout stays clean for MCP
        .with_env_filter(env_filter)
        .init();

    let catalog_path = catalog_path_from_env();
    match &catalog_path {
        Some(path) => tracing::info!("catalog: {}", path.display()),
        None => tracing::info!("catalog: none (SCHEMA_REGISTRY_CATALOG unset)"),
    }

    let descriptors = CatalogFileAdapter::new(catalog_path)
        .load()
        .await
        .map_err(anyhow::Error::new)?;
    let registry = Arc::new(SchemaRegistry::new(descriptors));
    let uc = Arc::new(ToolUseCases::new(registry, Arc::new(UnboundExecutor)));

    mcp_schema_registry::adapters::mcp_stdio::start_mcp_server(uc).await?;

    Ok(())
}
