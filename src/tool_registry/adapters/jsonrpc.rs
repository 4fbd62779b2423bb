//! JSON-RPC 2.0 message types and MCP payload helpers.
//!
//! Shared by the stdio and streamable HTTP adapters. Nothing here performs
//! I/O; the helpers build request parameters and interpret results.

use crate::tool_registry::{
    domain::ToolDefinition,
    ports::{Payload, ToolSourceError, ToolSourceResult},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";
/// MCP handshake request.
pub const METHOD_INITIALIZE: &str = "initialize";
/// MCP handshake completion notification.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
/// MCP tool listing request.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// MCP tool invocation request.
pub const METHOD_TOOLS_CALL: &str = "tools/call";
/// Code used when a response carries neither `result` nor `error`.
pub const INTERNAL_ERROR: i64 = -32603;

/// JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    /// Creates a request.
    #[must_use]
    pub const fn new(id: u64, method: &'a str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

/// JSON-RPC 2.0 notification (no response expected).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
}

impl<'a> JsonRpcNotification<'a> {
    /// Creates a notification.
    #[must_use]
    pub const fn new(method: &'a str, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// JSON-RPC 2.0 response message (success or error).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcResponse {
    /// Request identifier echoed by the server.
    #[serde(default)]
    pub id: Option<Value>,
    /// Result payload on success.
    #[serde(default)]
    pub result: Option<Value>,
    /// Error object on failure.
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Decodes an incoming message, returning `None` for anything that is not
    /// a response (server requests, notifications, log noise).
    #[must_use]
    pub fn from_message(message: &Value) -> Option<Self> {
        let object = message.as_object()?;
        if object.contains_key("method") {
            return None;
        }
        if !object.contains_key("result") && !object.contains_key("error") {
            return None;
        }

        let mut response = Self::deserialize(message).ok()?;
        // serde reads `"result": null` as an absent field.
        if response.result.is_none() && response.error.is_none() && object.contains_key("result")
        {
            response.result = Some(Value::Null);
        }
        Some(response)
    }

    /// Returns whether this response answers request `id`.
    ///
    /// Servers may echo numeric ids as strings.
    #[must_use]
    pub fn answers(&self, id: u64) -> bool {
        match &self.id {
            Some(Value::Number(number)) => number.as_u64() == Some(id),
            Some(Value::String(text)) => text.parse::<u64>().ok() == Some(id),
            _ => false,
        }
    }

    /// Extracts the result, converting JSON-RPC errors.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSourceError::Remote`] for error responses and for
    /// responses that carry neither field.
    pub fn into_result(self) -> ToolSourceResult<Value> {
        if let Some(error) = self.error {
            return Err(ToolSourceError::Remote {
                code: error.code,
                message: error.message,
            });
        }

        self.result.ok_or_else(|| ToolSourceError::Remote {
            code: INTERNAL_ERROR,
            message: "response missing both result and error".to_owned(),
        })
    }
}

/// Monotonic request identifier source, one per channel.
#[derive(Debug)]
pub struct RequestIds(AtomicU64);

impl RequestIds {
    /// Creates a counter starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Returns the next identifier.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RequestIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Client details announced during the MCP handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
    /// Requested MCP protocol version.
    pub protocol_version: String,
}

impl ClientIdentity {
    /// Builds the `initialize` request parameters.
    #[must_use]
    pub fn initialize_params(&self) -> Value {
        json!({
            "protocolVersion": self.protocol_version,
            "capabilities": {},
            "clientInfo": {
                "name": self.name,
                "version": self.version,
            },
        })
    }
}

/// Builds `tools/list` parameters for an optional pagination cursor.
#[must_use]
pub fn tools_list_params(cursor: Option<&str>) -> Option<Value> {
    cursor.map(|value| json!({ "cursor": value }))
}

/// Builds `tools/call` parameters.
#[must_use]
pub fn tools_call_params(name: &str, payload: &Payload) -> Value {
    json!({
        "name": name,
        "arguments": payload,
    })
}

/// Parses one page of a `tools/list` result.
///
/// Entries that are not usable tool definitions are skipped and logged.
///
/// # Errors
///
/// Returns [`ToolSourceError::Protocol`] when `tools` is missing or not an
/// array.
pub fn parse_tools_page(result: &Value) -> ToolSourceResult<(Vec<ToolDefinition>, Option<String>)> {
    let entries = result
        .get("tools")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolSourceError::Protocol("tools/list result has no tools array".to_owned()))?;

    let tools = entries
        .iter()
        .filter_map(|entry| match ToolDefinition::from_listing_entry(entry) {
            Ok(tool) => Some(tool),
            Err(err) => {
                warn!(error = %err, "skipping unusable tool definition");
                None
            }
        })
        .collect();

    let next_cursor = result
        .get("nextCursor")
        .and_then(Value::as_str)
        .filter(|cursor| !cursor.is_empty())
        .map(str::to_owned);

    Ok((tools, next_cursor))
}

/// Converts a `tools/call` result into the raw result shown to callers.
///
/// - `isError: true` fails with the joined text content;
/// - exactly one text block yields that string;
/// - no text but `structuredContent` yields the structured value;
/// - otherwise the text blocks are returned as an array of strings.
///
/// # Errors
///
/// Returns [`ToolSourceError::ToolFailed`] when the tool reports an error.
pub fn raw_result_from_call(result: Value) -> ToolSourceResult<Value> {
    let texts: Vec<String> = result
        .get("content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    let is_error = result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if is_error {
        return Err(ToolSourceError::ToolFailed(texts.join("\n")));
    }

    if let [single] = texts.as_slice() {
        return Ok(Value::String(single.clone()));
    }

    if texts.is_empty()
        && let Some(structured) = result.get("structuredContent")
    {
        return Ok(structured.clone());
    }

    Ok(Value::Array(texts.into_iter().map(Value::String).collect()))
}
