//! MCP client session over any JSON-RPC channel.

use super::jsonrpc::{
    ClientIdentity, METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    parse_tools_page, raw_result_from_call, tools_call_params, tools_list_params,
};
use crate::tool_registry::{
    domain::ToolDefinition,
    ports::{Payload, ToolSource, ToolSourceError, ToolSourceResult},
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

/// Upper bound on `tools/list` pages followed for one listing.
const MAX_TOOL_PAGES: usize = 64;

/// Request/response transport carrying JSON-RPC messages.
#[async_trait]
pub trait JsonRpcChannel: Send + Sync {
    /// Sends a request and waits for the matching result.
    async fn request(&self, method: &str, params: Option<Value>) -> ToolSourceResult<Value>;

    /// Sends a notification.
    async fn notify(&self, method: &str, params: Option<Value>) -> ToolSourceResult<()>;

    /// Releases the underlying transport.
    async fn shutdown(&self) -> ToolSourceResult<()>;
}

/// Tool source speaking MCP over a [`JsonRpcChannel`].
#[derive(Debug)]
pub struct McpToolSource<C> {
    channel: C,
    label: String,
    protocol_version: Option<String>,
}

impl<C: JsonRpcChannel> McpToolSource<C> {
    /// Performs the `initialize` handshake and returns a ready source.
    ///
    /// # Errors
    ///
    /// Returns channel errors from the handshake.
    pub async fn handshake(
        channel: C,
        label: impl Into<String>,
        identity: &ClientIdentity,
    ) -> ToolSourceResult<Self> {
        let source_label = label.into();
        let initialized = channel
            .request(METHOD_INITIALIZE, Some(identity.initialize_params()))
            .await?;
        let protocol_version = initialized
            .get("protocolVersion")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let server_name = initialized
            .pointer("/serverInfo/name")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(
            endpoint = %source_label,
            server = server_name,
            protocol_version = protocol_version.as_deref().unwrap_or("unspecified"),
            "MCP session initialized"
        );

        channel.notify(METHOD_INITIALIZED, None).await?;

        Ok(Self {
            channel,
            label: source_label,
            protocol_version,
        })
    }

    /// Returns the protocol version the server agreed to.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }
}

#[async_trait]
impl<C: JsonRpcChannel> ToolSource for McpToolSource<C> {
    async fn list_tools(&self) -> ToolSourceResult<Vec<ToolDefinition>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let page = self
                .channel
                .request(METHOD_TOOLS_LIST, tools_list_params(cursor.as_deref()))
                .await?;
            let (page_tools, next_cursor) = parse_tools_page(&page)?;
            tools.extend(page_tools);

            match next_cursor {
                Some(next) if cursor.as_deref() != Some(next.as_str()) => cursor = Some(next),
                _ => {
                    debug!(endpoint = %self.label, count = tools.len(), "tool listing complete");
                    return Ok(tools);
                }
            }
        }

        Err(ToolSourceError::Protocol(format!(
            "tools/list did not finish within {MAX_TOOL_PAGES} pages"
        )))
    }

    async fn call_tool(&self, name: &str, payload: &Payload) -> ToolSourceResult<Value> {
        let result = self
            .channel
            .request(METHOD_TOOLS_CALL, Some(tools_call_params(name, payload)))
            .await?;
        raw_result_from_call(result)
    }

    async fn close(&self) -> ToolSourceResult<()> {
        debug!(endpoint = %self.label, "closing MCP session");
        self.channel.shutdown().await
    }
}
