//! Name-keyed catalog of discovered tools.

use crate::endpoint::domain::SessionKey;
use crate::tool_registry::{
    domain::{ParameterSchema, ToolDefinition},
    ports::ToolSource,
};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Name of the duplicate-handling rule applied by [`ToolCatalog::insert`].
pub const OVERWRITE_POLICY: &str = "insert-overwrite";

/// A discovered tool bound to the source that serves it.
#[derive(Clone)]
pub struct ToolHandle {
    definition: ToolDefinition,
    schema: ParameterSchema,
    source_key: SessionKey,
    source: Arc<dyn ToolSource>,
}

impl ToolHandle {
    /// Binds `definition` to `source`, parsing its parameter schema once.
    #[must_use]
    pub fn new(
        definition: ToolDefinition,
        source_key: SessionKey,
        source: Arc<dyn ToolSource>,
    ) -> Self {
        let schema = definition.parameter_schema();
        Self {
            definition,
            schema,
            source_key,
            source,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Returns the tool definition as listed by its source.
    #[must_use]
    pub const fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Returns the parsed parameter schema.
    #[must_use]
    pub const fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Returns the key of the endpoint that serves this tool.
    #[must_use]
    pub const fn source_key(&self) -> &SessionKey {
        &self.source_key
    }

    /// Returns the serving source.
    #[must_use]
    pub fn source(&self) -> &dyn ToolSource {
        self.source.as_ref()
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ToolHandle")
            .field("definition", &self.definition)
            .field("source_key", &self.source_key)
            .finish_non_exhaustive()
    }
}

/// Result of inserting a handle into the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The name was new.
    Inserted,
    /// An entry with the same name was replaced.
    Overwrote {
        /// Key of the endpoint whose tool was replaced.
        previous_source: SessionKey,
    },
}

/// Insertion-ordered map from tool name to [`ToolHandle`].
///
/// Names are unique. A later insert with a known name replaces the earlier
/// handle in place, so listing order follows first appearance while the
/// last writer wins.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    handles: Vec<ToolHandle>,
}

impl ToolCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Builds a catalog by inserting `handles` in order.
    #[must_use]
    pub fn from_handles(handles: impl IntoIterator<Item = ToolHandle>) -> Self {
        let mut catalog = Self::new();
        for handle in handles {
            catalog.insert(handle);
        }
        catalog
    }

    /// Inserts `handle`, replacing any entry with the same name.
    pub fn insert(&mut self, handle: ToolHandle) -> InsertOutcome {
        let existing = self
            .handles
            .iter_mut()
            .find(|entry| entry.name() == handle.name());

        let Some(slot) = existing else {
            self.handles.push(handle);
            return InsertOutcome::Inserted;
        };

        let previous_source = slot.source_key.clone();
        info!(
            tool = handle.name(),
            previous_source = %previous_source,
            new_source = %handle.source_key,
            policy = OVERWRITE_POLICY,
            "duplicate tool name; keeping the later definition"
        );
        *slot = handle;
        InsertOutcome::Overwrote { previous_source }
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolHandle> {
        self.handles.iter().find(|handle| handle.name() == name)
    }

    /// Returns tool names in catalog order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(ToolHandle::name).collect()
    }

    /// Iterates over handles in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolHandle> {
        self.handles.iter()
    }

    /// Returns the number of tools.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns whether the catalog is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
