//! JSON-RPC over MCP streamable HTTP.
//!
//! Every message is a POST to the endpoint URL. Servers answer with either a
//! plain JSON body or a `text/event-stream` carrying the response among
//! other events. The `mcp-session-id` header issued by the server is echoed
//! on later requests.

use super::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestIds};
use super::mcp::JsonRpcChannel;
use crate::tool_registry::ports::{ToolSourceError, ToolSourceResult};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, trace};

const SESSION_HEADER: &str = "mcp-session-id";
const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";
const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Splits a byte stream into trimmed, non-empty lines.
#[derive(Debug, Default)]
struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            push_trimmed(&mut lines, &line);
        }
        lines
    }

    fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.buffer);
        let mut lines = Vec::new();
        push_trimmed(&mut lines, &rest);
        lines
    }
}

fn push_trimmed(lines: &mut Vec<String>, bytes: &[u8]) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_owned());
        }
    }
}

fn is_event_stream_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|value| value.eq_ignore_ascii_case("text/event-stream"))
}

fn sse_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim)
}

fn response_in_sse_line(line: &str, id: u64) -> Option<JsonRpcResponse> {
    let payload = sse_data_payload(line).filter(|data| !data.is_empty())?;
    let message = serde_json::from_str::<Value>(payload).ok()?;
    JsonRpcResponse::from_message(&message).filter(|response| response.answers(id))
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Streamable HTTP channel bound to one endpoint URL.
#[derive(Debug)]
pub struct StreamableHttpChannel {
    client: reqwest::Client,
    url: String,
    session_id: RwLock<Option<String>>,
    protocol_version: RwLock<Option<String>>,
    ids: RequestIds,
    timeout: Duration,
}

impl StreamableHttpChannel {
    /// Creates a channel posting to `url`.
    #[must_use]
    pub fn new(client: reqwest::Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            session_id: RwLock::new(None),
            protocol_version: RwLock::new(None),
            ids: RequestIds::new(),
            timeout,
        }
    }

    /// Returns the session id issued by the server, if any.
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().ok().and_then(|guard| guard.clone())
    }

    fn remember_session(&self, headers: &HeaderMap) {
        if let Some(issued) = header_text(headers, SESSION_HEADER)
            && let Ok(mut guard) = self.session_id.write()
        {
            *guard = Some(issued);
        }
    }

    fn remember_protocol_version(&self, method: &str, result: &Value) {
        if method != super::jsonrpc::METHOD_INITIALIZE {
            return;
        }
        let agreed = result
            .get("protocolVersion")
            .and_then(Value::as_str)
            .map(str::to_owned);
        if let Ok(mut guard) = self.protocol_version.write() {
            *guard = agreed;
        }
    }

    fn post(&self, message: &impl Serialize) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(&self.url)
            .header(ACCEPT, ACCEPT_BOTH)
            .json(message);
        if let Some(session) = self.session_id() {
            builder = builder.header(SESSION_HEADER, session);
        }
        let negotiated = self
            .protocol_version
            .read()
            .ok()
            .and_then(|guard| guard.clone());
        if let Some(version) = negotiated {
            builder = builder.header(PROTOCOL_VERSION_HEADER, version);
        }
        builder
    }

    async fn send(&self, message: &impl Serialize) -> ToolSourceResult<reqwest::Response> {
        let response = self
            .post(message)
            .send()
            .await
            .map_err(|err| ToolSourceError::Transport(format!("{}: {err}", self.url)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToolSourceError::Transport(format!(
                "{} returned HTTP {status}",
                self.url
            )));
        }
        self.remember_session(response.headers());
        Ok(response)
    }

    async fn exchange(&self, request: &JsonRpcRequest<'_>) -> ToolSourceResult<JsonRpcResponse> {
        let response = self.send(request).await?;
        let content_type = header_text(response.headers(), CONTENT_TYPE.as_str()).unwrap_or_default();

        if is_event_stream_content_type(&content_type) {
            return read_event_stream(response, request.id()).await;
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ToolSourceError::Transport(format!("failed to read body: {err}")))?;
        let message = serde_json::from_slice::<Value>(&body)
            .map_err(|err| ToolSourceError::Protocol(format!("response is not JSON: {err}")))?;
        JsonRpcResponse::from_message(&message)
            .filter(|decoded| decoded.answers(request.id()))
            .ok_or_else(|| {
                ToolSourceError::Protocol("response does not answer the request".to_owned())
            })
    }
}

async fn read_event_stream(response: reqwest::Response, id: u64) -> ToolSourceResult<JsonRpcResponse> {
    let mut stream = response.bytes_stream();
    let mut buffer = SseLineBuffer::default();

    while let Some(chunk) = stream.next().await {
        let bytes = chunk
            .map_err(|err| ToolSourceError::Transport(format!("event stream failed: {err}")))?;
        for line in buffer.push(&bytes) {
            if let Some(found) = response_in_sse_line(&line, id) {
                return Ok(found);
            }
            trace!("skipping event-stream line: {line}");
        }
    }

    buffer
        .finish()
        .iter()
        .find_map(|line| response_in_sse_line(line, id))
        .ok_or_else(|| {
            ToolSourceError::Protocol("event stream ended without a response".to_owned())
        })
}

#[async_trait]
impl JsonRpcChannel for StreamableHttpChannel {
    async fn request(&self, method: &str, params: Option<Value>) -> ToolSourceResult<Value> {
        let request = JsonRpcRequest::new(self.ids.next_id(), method, params);
        let response = tokio::time::timeout(self.timeout, self.exchange(&request))
            .await
            .map_err(|_| ToolSourceError::Timeout {
                method: method.to_owned(),
                timeout: self.timeout,
            })??;
        let result = response.into_result()?;
        self.remember_protocol_version(method, &result);
        Ok(result)
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> ToolSourceResult<()> {
        let notification = JsonRpcNotification::new(method, params);
        tokio::time::timeout(self.timeout, self.send(&notification))
            .await
            .map_err(|_| ToolSourceError::Timeout {
                method: method.to_owned(),
                timeout: self.timeout,
            })??;
        Ok(())
    }

    async fn shutdown(&self) -> ToolSourceResult<()> {
        let Some(session) = self.session_id() else {
            return Ok(());
        };
        let outcome = self
            .client
            .delete(&self.url)
            .header(SESSION_HEADER, session)
            .timeout(self.timeout)
            .send()
            .await;
        if let Err(err) = outcome {
            debug!(url = %self.url, error = %err, "session termination request failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn channel_for(server: &MockServer) -> StreamableHttpChannel {
        StreamableHttpChannel::new(
            reqwest::Client::new(),
            format!("{}/mcp", server.uri()),
            TIMEOUT,
        )
    }

    #[test]
    fn sse_buffer_handles_partial_lines() {
        let mut buffer = SseLineBuffer::default();
        assert!(buffer.push(b"data: one").is_empty());
        assert_eq!(buffer.push(b"\r\n\r\n"), vec!["data: one"]);
        assert!(buffer.push(b"data: two").is_empty());
        assert_eq!(buffer.finish(), vec!["data: two"]);
    }

    #[rstest]
    #[case("text/event-stream", true)]
    #[case("Text/Event-Stream; charset=utf-8", true)]
    #[case("application/json", false)]
    fn recognises_event_stream_content_types(#[case] content_type: &str, #[case] expected: bool) {
        assert_eq!(is_event_stream_content_type(content_type), expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn json_responses_capture_and_echo_the_session_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(SESSION_HEADER, "session-1")
                    .set_body_json(json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "result": {"protocolVersion": "2025-06-18"}
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(header(SESSION_HEADER, "session-1"))
            .and(header(PROTOCOL_VERSION_HEADER, "2025-06-18"))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 2,
                "result": {"tools": []}
            })))
            .expect(1)
            .mount(&server)
            .await;
        let channel = channel_for(&server);

        channel
            .request("initialize", Some(json!({})))
            .await
            .expect("initialize should succeed");
        let listing = channel
            .request("tools/list", None)
            .await
            .expect("listing should succeed");

        assert_eq!(listing, json!({"tools": []}));
        assert_eq!(channel.session_id().as_deref(), Some("session-1"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn event_stream_responses_are_scanned_for_the_answer() {
        let server = MockServer::start().await;
        let body = format!(
            "event: message\ndata: {}\n\nevent: message\ndata: {}\n\n",
            json!({"jsonrpc": "2.0", "method": "notifications/progress", "params": {}}),
            json!({"jsonrpc": "2.0", "id": 1, "result": {"ok": true}})
        );
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;
        let channel = channel_for(&server);

        let result = channel
            .request("tools/call", Some(json!({"name": "x"})))
            .await
            .expect("call should succeed");

        assert_eq!(result, json!({"ok": true}));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_errors_are_transport_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let channel = channel_for(&server);

        let result = channel.request("initialize", None).await;

        assert!(matches!(result, Err(ToolSourceError::Transport(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn notifications_accept_202() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;
        let channel = channel_for(&server);

        channel
            .notify("notifications/initialized", None)
            .await
            .expect("notification should be accepted");
    }
}
