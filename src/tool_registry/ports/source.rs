//! Transport port for remote tool sources.

use crate::endpoint::domain::{EndpointDescriptor, EndpointDomainError};
use crate::tool_registry::domain::ToolDefinition;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for tool source operations.
pub type ToolSourceResult<T> = Result<T, ToolSourceError>;

/// Call payload: field name to value, in schema order.
pub type Payload = Map<String, Value>;

/// Established session with one remote tool source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// Lists the tools the source exposes.
    async fn list_tools(&self) -> ToolSourceResult<Vec<ToolDefinition>>;

    /// Invokes a tool and returns its raw result.
    async fn call_tool(&self, name: &str, payload: &Payload) -> ToolSourceResult<Value>;

    /// Releases transport resources. Later calls may fail.
    async fn close(&self) -> ToolSourceResult<()>;
}

/// Opens tool source sessions for endpoint descriptors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolSourceConnector: Send + Sync {
    /// Connects to the endpoint and completes any protocol handshake.
    async fn connect(&self, endpoint: &EndpointDescriptor)
    -> ToolSourceResult<Arc<dyn ToolSource>>;
}

/// Errors returned by tool source adapters.
#[derive(Debug, Clone, Error)]
pub enum ToolSourceError {
    /// The descriptor cannot be used with its transport.
    #[error(transparent)]
    InvalidEndpoint(#[from] EndpointDomainError),

    /// The source could not be reached or started.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Reading from or writing to the transport failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The source replied with something that is not valid protocol data.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The source returned a JSON-RPC error.
    #[error("server error [{code}]: {message}")]
    Remote {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the server.
        message: String,
    },

    /// The tool ran and reported failure.
    #[error("tool reported an error: {0}")]
    ToolFailed(String),

    /// No response arrived within the request timeout.
    #[error("request '{method}' timed out after {}s", timeout.as_secs())]
    Timeout {
        /// JSON-RPC method that timed out.
        method: String,
        /// Configured request timeout.
        timeout: Duration,
    },

    /// Underlying runtime failure.
    #[error("tool source runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolSourceError {
    /// Wraps a runtime error from the adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
