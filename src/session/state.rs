//! Explicit per-user session state.

use crate::form::{FieldDescriptor, FormBinder};
use crate::tool_registry::{
    domain::{ParameterSchema, SessionId},
    services::{AggregateSession, DiscoveryOutcome, DiscoveryWarning, ToolCatalog, ToolHandle},
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Catalog and connection status of one user session.
#[derive(Debug, Default)]
pub struct SessionState {
    session: Option<AggregateSession>,
    catalog: ToolCatalog,
    connected_at: Option<DateTime<Utc>>,
    warnings: Vec<DiscoveryWarning>,
}

impl SessionState {
    /// Creates a disconnected state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes any open session and clears the catalog and warnings.
    pub async fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session_id = %session.id(), "closing previous session");
            session.close().await;
        }
        self.catalog = ToolCatalog::new();
        self.connected_at = None;
        self.warnings.clear();
    }

    pub(crate) fn publish(&mut self, outcome: DiscoveryOutcome, connected_at: DateTime<Utc>) {
        self.session = Some(outcome.session);
        self.catalog = outcome.catalog;
        self.warnings = outcome.warnings;
        self.connected_at = Some(connected_at);
    }

    pub(crate) fn record_warnings(&mut self, warnings: Vec<DiscoveryWarning>) {
        self.warnings = warnings;
    }

    /// Returns whether a session with at least one tool is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Returns the open session's identifier.
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(AggregateSession::id)
    }

    /// Returns when the open session connected.
    #[must_use]
    pub const fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }

    /// Returns warnings from the last connect attempt.
    #[must_use]
    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    /// Returns the catalog.
    #[must_use]
    pub const fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Returns tool names in catalog order.
    #[must_use]
    pub fn list_tool_names(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Looks up a tool.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolHandle> {
        self.catalog.get(name)
    }

    /// Returns a tool's parameter schema.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&ParameterSchema> {
        self.tool(name).map(ToolHandle::schema)
    }

    /// Returns the form fields for a tool.
    #[must_use]
    pub fn field_descriptors(&self, name: &str) -> Option<Vec<FieldDescriptor>> {
        self.schema(name).map(FormBinder::field_descriptors)
    }
}
