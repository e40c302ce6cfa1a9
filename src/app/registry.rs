use std::collections::{BTreeMap, HashMap};

use crate::{
    app::{
        projector::{project, project_slot},
        resolver::resolve_slot,
    },
    domain::{
        errors::{DomainError, Result},
        models::{ExpandRequest, OperationDescriptor},
        schema::SchemaNode,
        types::{DepthLimit, OperationName, SchemaType},
    },
};

/// Canonical input/output schemas per operation.
///
/// Populated once by [`SchemaRegistry::new`] and never mutated afterwards.
/// Every accessor hands out an owned deep copy, so callers cannot reach the
/// canonical trees; share the registry behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    operations: BTreeMap<OperationName, Option<String>>,
    input_schemas: HashMap<OperationName, SchemaNode>,
    output_schemas: HashMap<OperationName, SchemaNode>,
}

impl SchemaRegistry {
    /// Later descriptors with the same name overwrite earlier ones. Descriptors
    /// with an empty name are skipped; other names are used verbatim.
    pub fn new(descriptors: impl IntoIterator<Item = OperationDescriptor>) -> Self {
        let mut registry = Self::default();
        let mut skipped = 0usize;

        for descriptor in descriptors {
            let name = match OperationName::new(&descriptor.name) {
                Ok(name) => name,
                Err(_) => {
                    skipped += 1;
                    tracing::debug!("skipping operation descriptor without a name");
                    continue;
                }
            };
            if registry.operations.contains_key(&name) {
                tracing::debug!("operation '{}' registered twice; last one wins", name);
            }

            if let Some(schema) = descriptor.input_schema {
                registry.input_schemas.insert(name.clone(), schema);
            }
            if let Some(schema) = descriptor.output_schema {
                registry.output_schemas.insert(name.clone(), schema);
            }
            registry.operations.insert(name, descriptor.description);
        }

        tracing::info!(
            "schema registry: {} operations ({} input, {} output schemas, {} skipped)",
            registry.operations.len(),
            registry.input_schemas.len(),
            registry.output_schemas.len(),
            skipped
        );
        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Registered operation names in ascending order.
    pub fn operation_names(&self) -> impl Iterator<Item = &OperationName> {
        self.operations.keys()
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.operations.get(name).and_then(|d| d.as_deref())
    }

    pub fn full_input_schema(&self, name: &str) -> Option<SchemaNode> {
        self.input_schemas.get(name).cloned()
    }

    pub fn full_output_schema(&self, name: &str) -> Option<SchemaNode> {
        self.output_schemas.get(name).cloned()
    }

    pub fn full_schema(&self, name: &str, schema_type: SchemaType) -> Option<SchemaNode> {
        match schema_type {
            SchemaType::Input => self.full_input_schema(name),
            SchemaType::Output => self.full_output_schema(name),
        }
    }

    /// Shallow view of `schema`, depth counted from its root.
    /// [`DepthLimit::TRUNCATION_DEFAULT`] keeps the root and its direct members.
    pub fn create_truncated_input_schema(schema: &SchemaNode, max_depth: DepthLimit) -> SchemaNode {
        project(schema, max_depth)
    }

    /// Sub-schema at `request.path`, projected with depth counted from the
    /// resolved node. An unbounded request returns the sub-tree in full.
    ///
    /// A path ending in `properties`, `definitions` or `$defs` yields a member
    /// map whose members each start at depth 0; keyword data comes back as is.
    pub fn expand(&self, request: &ExpandRequest) -> Result<SchemaNode> {
        let name = request.operation.as_str();
        let canonical = self.canonical(name, request.schema_type)?;
        let (resolved, slot) = resolve_slot(canonical, &request.path)?;
        tracing::debug!(
            "expand {} {} schema at '{}' ({:?}, {:?})",
            name,
            request.schema_type,
            request.path,
            slot,
            request.max_depth
        );
        Ok(project_slot(resolved, slot, request.max_depth))
    }

    fn canonical(&self, name: &str, schema_type: SchemaType) -> Result<&SchemaNode> {
        let schemas = match schema_type {
            SchemaType::Input => &self.input_schemas,
            SchemaType::Output => &self.output_schemas,
        };
        if let Some(schema) = schemas.get(name) {
            return Ok(schema);
        }
        if self.contains(name) {
            Err(DomainError::NotFound(format!(
                "operation '{}' has no {} schema",
                name, schema_type
            )))
        } else {
            Err(DomainError::NotFound(format!(
                "operation '{}' not found",
                name
            )))
        }
    }
}
