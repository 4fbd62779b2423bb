//! In-memory tool source adapters for tests and offline demos.

use crate::endpoint::domain::EndpointDescriptor;
use crate::tool_registry::{
    domain::ToolDefinition,
    ports::{Payload, ToolSource, ToolSourceConnector, ToolSourceError, ToolSourceResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// JSON-RPC code reported for calls to tools the source does not know.
const INVALID_PARAMS: i64 = -32602;

/// One call recorded by [`InMemoryToolSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Tool name.
    pub tool: String,
    /// Payload as received.
    pub payload: Payload,
}

/// Scripted tool source.
///
/// Tools, per-tool results, and listing failures are configured up front;
/// every call is recorded so tests can assert on the payload that reached
/// the transport.
#[derive(Debug, Default)]
pub struct InMemoryToolSource {
    state: RwLock<InMemorySourceState>,
}

#[derive(Debug, Default)]
struct InMemorySourceState {
    tools: Vec<ToolDefinition>,
    results: HashMap<String, Result<Value, String>>,
    listing_failure: Option<String>,
    calls: Vec<RecordedCall>,
    closed: bool,
}

fn lock_error(err: impl std::fmt::Display) -> ToolSourceError {
    ToolSourceError::runtime(std::io::Error::other(err.to_string()))
}

impl InMemoryToolSource {
    /// Creates a source that exposes no tools.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source exposing `tools`.
    #[must_use]
    pub fn with_tools(tools: Vec<ToolDefinition>) -> Self {
        Self {
            state: RwLock::new(InMemorySourceState {
                tools,
                ..InMemorySourceState::default()
            }),
        }
    }

    /// Sets the raw result returned when `tool` is called.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn set_result(&self, tool: impl Into<String>, result: Value) -> ToolSourceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.results.insert(tool.into(), Ok(result));
        Ok(())
    }

    /// Makes calls to `tool` fail with a tool-reported error.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn set_failure(
        &self,
        tool: impl Into<String>,
        message: impl Into<String>,
    ) -> ToolSourceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.results.insert(tool.into(), Err(message.into()));
        Ok(())
    }

    /// Makes tool listing fail with a transport error.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn set_listing_failure(&self, message: impl Into<String>) -> ToolSourceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.listing_failure = Some(message.into());
        Ok(())
    }

    /// Returns the calls received so far.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn calls(&self) -> ToolSourceResult<Vec<RecordedCall>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.calls.clone())
    }

    /// Returns whether [`ToolSource::close`] has been called.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn is_closed(&self) -> ToolSourceResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.closed)
    }
}

#[async_trait]
impl ToolSource for InMemoryToolSource {
    async fn list_tools(&self) -> ToolSourceResult<Vec<ToolDefinition>> {
        let state = self.state.read().map_err(lock_error)?;
        if let Some(message) = &state.listing_failure {
            return Err(ToolSourceError::Transport(message.clone()));
        }

        Ok(state.tools.clone())
    }

    async fn call_tool(&self, name: &str, payload: &Payload) -> ToolSourceResult<Value> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(RecordedCall {
            tool: name.to_owned(),
            payload: payload.clone(),
        });

        match state.results.get(name) {
            Some(Ok(result)) => Ok(result.clone()),
            Some(Err(message)) => Err(ToolSourceError::ToolFailed(message.clone())),
            None if state.tools.iter().any(|tool| tool.name() == name) => Ok(Value::Null),
            None => Err(ToolSourceError::Remote {
                code: INVALID_PARAMS,
                message: format!("unknown tool: {name}"),
            }),
        }
    }

    async fn close(&self) -> ToolSourceResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.closed = true;
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum ScriptedEndpoint {
    Reachable(Arc<InMemoryToolSource>),
    Unreachable(String),
}

/// Connector resolving endpoint addresses to scripted sources.
///
/// Addresses that were never scripted behave like a refused connection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolSourceConnector {
    endpoints: Arc<RwLock<HashMap<String, ScriptedEndpoint>>>,
}

impl InMemoryToolSourceConnector {
    /// Creates a connector with no reachable endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `source` at `address`, replacing any earlier script.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn register_source(
        &self,
        address: impl Into<String>,
        source: Arc<InMemoryToolSource>,
    ) -> ToolSourceResult<()> {
        let mut endpoints = self.endpoints.write().map_err(lock_error)?;
        endpoints.insert(address.into(), ScriptedEndpoint::Reachable(source));
        Ok(())
    }

    /// Makes connections to `address` fail with `message`.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn set_unreachable(
        &self,
        address: impl Into<String>,
        message: impl Into<String>,
    ) -> ToolSourceResult<()> {
        let mut endpoints = self.endpoints.write().map_err(lock_error)?;
        endpoints.insert(address.into(), ScriptedEndpoint::Unreachable(message.into()));
        Ok(())
    }
}

#[async_trait]
impl ToolSourceConnector for InMemoryToolSourceConnector {
    async fn connect(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> ToolSourceResult<Arc<dyn ToolSource>> {
        endpoint.validate()?;
        let endpoints = self.endpoints.read().map_err(lock_error)?;
        match endpoints.get(endpoint.address()) {
            Some(ScriptedEndpoint::Reachable(source)) => {
                let shared: Arc<dyn ToolSource> = source.clone();
                Ok(shared)
            }
            Some(ScriptedEndpoint::Unreachable(message)) => {
                Err(ToolSourceError::Connect(message.clone()))
            }
            None => Err(ToolSourceError::Connect(format!(
                "connection refused: {}",
                endpoint.address()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "", json!({})).expect("valid tool")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_addresses_refuse_connections() {
        let connector = InMemoryToolSourceConnector::new();

        let result = connector
            .connect(&EndpointDescriptor::http("http://nowhere/mcp"))
            .await;

        assert!(matches!(result, Err(ToolSourceError::Connect(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_descriptors_are_rejected_before_lookup() {
        let connector = InMemoryToolSourceConnector::new();

        let result = connector.connect(&EndpointDescriptor::http("")).await;

        assert!(matches!(result, Err(ToolSourceError::InvalidEndpoint(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn calls_are_recorded_and_answered() {
        let source = InMemoryToolSource::with_tools(vec![tool("echo")]);
        source
            .set_result("echo", json!("pong"))
            .expect("script should succeed");
        let mut payload = Payload::new();
        payload.insert("text".to_owned(), json!("ping"));

        let result = source
            .call_tool("echo", &payload)
            .await
            .expect("call should succeed");

        assert_eq!(result, json!("pong"));
        let calls = source.calls().expect("calls should be readable");
        assert_eq!(
            calls,
            vec![RecordedCall {
                tool: "echo".to_owned(),
                payload
            }]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_tools_fail_with_remote_error() {
        let source = InMemoryToolSource::new();

        let result = source.call_tool("missing", &Payload::new()).await;

        assert!(matches!(result, Err(ToolSourceError::Remote { .. })));
    }
}
