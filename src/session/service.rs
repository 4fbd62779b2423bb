//! Connect, run, and disconnect operations over a [`SessionState`].

use super::state::SessionState;
use crate::endpoint::domain::EndpointDescriptor;
use crate::form::{FormBindError, FormBinder, FormInputs};
use crate::invocation::{DisplayResult, InvocationError, invoke};
use crate::tool_registry::{
    ports::{Payload, ToolSourceConnector},
    services::{DiscoveryFailure, DiscoveryWarning, discover},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Summary of one connect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectReport {
    /// Whether the session is now connected.
    pub connected: bool,
    /// Number of endpoints attempted.
    pub server_count: usize,
    /// Distinct tools in the catalog.
    pub tool_count: usize,
    /// Tool definitions discovered before duplicate names collapsed.
    pub discovered_count: usize,
    /// Per-endpoint failures.
    pub warnings: Vec<DiscoveryWarning>,
    /// Set when no endpoint yielded a tool.
    pub failure: Option<DiscoveryFailure>,
}

/// Errors from running a tool through its form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchError {
    /// An entered value could not be coerced.
    #[error(transparent)]
    Bind(#[from] FormBindError),
    /// The call failed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

/// Operations a front end drives against a [`SessionState`].
#[derive(Clone)]
pub struct BenchService<C, K>
where
    C: ToolSourceConnector,
    K: Clock + Send + Sync,
{
    connector: Arc<C>,
    clock: Arc<K>,
}

impl<C, K> BenchService<C, K>
where
    C: ToolSourceConnector,
    K: Clock + Send + Sync,
{
    /// Creates a service.
    #[must_use]
    pub const fn new(connector: Arc<C>, clock: Arc<K>) -> Self {
        Self { connector, clock }
    }

    /// Discards the current session, then discovers tools from `endpoints`.
    ///
    /// The previous catalog is gone even when the new attempt finds nothing.
    pub async fn connect(
        &self,
        state: &mut SessionState,
        endpoints: &[EndpointDescriptor],
    ) -> ConnectReport {
        state.reset().await;
        let server_count = endpoints.len();

        match discover(self.connector.as_ref(), endpoints).await {
            Ok(outcome) => {
                let report = ConnectReport {
                    connected: true,
                    server_count,
                    tool_count: outcome.catalog.len(),
                    discovered_count: outcome.discovered_count,
                    warnings: outcome.warnings.clone(),
                    failure: None,
                };
                state.publish(outcome, self.clock.utc());
                info!(
                    servers = server_count,
                    tools = report.tool_count,
                    "connected to MCP servers"
                );
                report
            }
            Err(failure) => {
                state.record_warnings(failure.warnings.clone());
                ConnectReport {
                    connected: false,
                    server_count,
                    tool_count: 0,
                    discovered_count: 0,
                    warnings: failure.warnings.clone(),
                    failure: Some(failure),
                }
            }
        }
    }

    /// Calls `name` with an already-bound payload.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError`] when disconnected, when the tool is not
    /// catalogued, or when the call fails.
    pub async fn run_tool(
        &self,
        state: &SessionState,
        name: &str,
        payload: &Payload,
    ) -> Result<DisplayResult, InvocationError> {
        if !state.is_connected() {
            return Err(InvocationError::new(name, "not connected to any MCP server"));
        }
        let handle = state
            .tool(name)
            .ok_or_else(|| InvocationError::new(name, "tool not found in catalog"))?;
        invoke(handle, payload).await
    }

    /// Binds form `inputs` against the tool's schema, then calls it.
    ///
    /// Required fields left blank are logged and the call still proceeds.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Bind`] for values that cannot be coerced and
    /// [`BenchError::Invocation`] for the failures of
    /// [`BenchService::run_tool`].
    pub async fn run_form(
        &self,
        state: &SessionState,
        name: &str,
        inputs: &FormInputs,
    ) -> Result<DisplayResult, BenchError> {
        let schema = state
            .schema(name)
            .ok_or_else(|| InvocationError::new(name, "tool not found in catalog"))?;
        let missing = FormBinder::missing_required(schema, inputs);
        if !missing.is_empty() {
            warn!(tool = name, fields = ?missing, "required fields left empty; invoking anyway");
        }
        let payload = FormBinder::bind(schema, inputs)?;
        Ok(self.run_tool(state, name, &payload).await?)
    }

    /// Closes the session and clears the catalog.
    pub async fn disconnect(&self, state: &mut SessionState) {
        state.reset().await;
        info!("disconnected");
    }
}
