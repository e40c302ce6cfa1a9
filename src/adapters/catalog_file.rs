use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::task;

use crate::{
    app::ports::CatalogSourcePort,
    domain::{
        errors::{DomainError, Result},
        models::OperationDescriptor,
    },
};

const DEFAULT_MAX_CATALOG_BYTES: usize = 8 * 1024 * 1024;

fn parse_max_catalog_bytes_from_env() -> usize {
    std::env::var("SCHEMA_REGISTRY_MAX_CATALOG_BYTES")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_CATALOG_BYTES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => CatalogFormat::Yaml,
            _ => CatalogFormat::Json,
        }
    }
}

/// Loads operation descriptors from a JSON or YAML file.
///
/// Accepted shapes: a top-level array of descriptors, or an object holding the
/// array under `tools` or `operations`. Without a path the catalog is empty.
pub struct CatalogFileAdapter {
    path: Option<PathBuf>,
    max_catalog_bytes: usize,
}

impl CatalogFileAdapter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            max_catalog_bytes: parse_max_catalog_bytes_from_env(),
        }
    }

    #[cfg(test)]
    fn new_with_max(path: Option<PathBuf>, max_catalog_bytes: usize) -> Self {
        Self {
            path,
            max_catalog_bytes,
        }
    }

    fn read_sync(path: &Path, max_catalog_bytes: usize) -> Result<Vec<OperationDescriptor>> {
        let len = std::fs::metadata(path)
            .map_err(|e| {
                DomainError::Io(format!(
                    "failed to stat catalog '{}': {}",
                    path.display(),
                    e
                ))
            })?
            .len();
        if len > max_catalog_bytes as u64 {
            return Err(DomainError::InvalidData(format!(
                "catalog '{}' is too large: {} bytes (max {})",
                path.display(),
                len,
                max_catalog_bytes
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Io(format!(
                "failed to read catalog '{}': {}",
                path.display(),
                e
            ))
        })?;
        parse_catalog(&text, CatalogFormat::from_path(path))
    }
}

fn parse_catalog(text: &str, format: CatalogFormat) -> Result<Vec<OperationDescriptor>> {
    let document: Value = match format {
        CatalogFormat::Json => serde_json::from_str(text)?,
        CatalogFormat::Yaml => serde_yaml::from_str(text)?,
    };

    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut root) => match root.remove("tools").or_else(|| root.remove("operations"))
        {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(DomainError::InvalidData(
                    "catalog object must hold a 'tools' or 'operations' array".into(),
                ))
            }
        },
        Value::Null => Vec::new(),
        _ => {
            return Err(DomainError::InvalidData(
                "catalog must be an array of operation descriptors".into(),
            ))
        }
    };

    let mut descriptors = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        if !entry.is_object() {
            tracing::warn!("catalog entry #{} is not an object; skipping", index);
            continue;
        }
        match serde_json::from_value::<OperationDescriptor>(entry) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(e) => tracing::warn!("catalog entry #{} is malformed ({}); skipping", index, e),
        }
    }
    Ok(descriptors)
}

#[async_trait]
impl CatalogSourcePort for CatalogFileAdapter {
    async fn load(&self) -> Result<Vec<OperationDescriptor>> {
        let Some(path) = self.path.clone() else {
            tracing::info!("no catalog configured; starting with an empty registry");
            return Ok(Vec::new());
        };
        let max_catalog_bytes = self.max_catalog_bytes;
        let descriptors = task::spawn_blocking(move || Self::read_sync(&path, max_catalog_bytes))
            .await
            .map_err(|e| DomainError::Io(format!("task execution failed: {}", e)))??;
        tracing::info!("loaded {} operation descriptors", descriptors.len());
        Ok(descriptors)
    }
}
