//! Single-call invocation of a catalogued tool.

use super::normalizer::{DisplayResult, normalize};
use crate::tool_registry::{ports::Payload, services::ToolHandle};
use thiserror::Error;
use tracing::{info, warn};

/// A tool call failed. Session and catalog are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error running tool '{tool}': {message}")]
pub struct InvocationError {
    /// Tool that was called.
    pub tool: String,
    /// Failure description.
    pub message: String,
}

impl InvocationError {
    /// Creates an invocation error.
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Calls the tool once and normalizes its result.
///
/// There are no retries; the only timeout is the transport's request
/// timeout.
///
/// # Errors
///
/// Returns [`InvocationError`] for any transport, protocol, or tool failure.
pub async fn invoke(handle: &ToolHandle, payload: &Payload) -> Result<DisplayResult, InvocationError> {
    let tool = handle.name();
    info!(tool, source = %handle.source_key(), fields = payload.len(), "invoking tool");

    match handle.source().call_tool(tool, payload).await {
        Ok(raw) => Ok(normalize(&raw)),
        Err(err) => {
            warn!(tool, source = %handle.source_key(), error = %err, "tool invocation failed");
            Err(InvocationError::new(tool, err.to_string()))
        }
    }
}
