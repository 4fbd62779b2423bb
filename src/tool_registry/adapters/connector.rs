//! Connector that opens real MCP sessions by transport kind.

use super::jsonrpc::ClientIdentity;
use super::mcp::McpToolSource;
use super::stdio::StdioChannel;
use super::streamable_http::StreamableHttpChannel;
use crate::endpoint::domain::{EndpointDescriptor, TransportKind};
use crate::tool_registry::ports::{
    ToolSource, ToolSourceConnector, ToolSourceError, ToolSourceResult,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Opens MCP sessions over stdio or streamable HTTP.
#[derive(Debug, Clone)]
pub struct McpConnector {
    identity: ClientIdentity,
    timeout: Duration,
    http: reqwest::Client,
}

impl McpConnector {
    /// Creates a connector announcing `identity` and bounding every request
    /// by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSourceError::Runtime`] when the HTTP client cannot be
    /// built.
    pub fn new(identity: ClientIdentity, timeout: Duration) -> ToolSourceResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(format!("{}/{}", identity.name, identity.version))
            .build()
            .map_err(ToolSourceError::runtime)?;
        Ok(Self {
            identity,
            timeout,
            http,
        })
    }
}

#[async_trait]
impl ToolSourceConnector for McpConnector {
    async fn connect(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> ToolSourceResult<Arc<dyn ToolSource>> {
        endpoint.validate()?;
        let label = endpoint.to_string();
        debug!(endpoint = %label, "connecting");

        let source: Arc<dyn ToolSource> = match endpoint.transport() {
            TransportKind::LongLivedProcess => {
                let channel = StdioChannel::spawn(endpoint.address(), self.timeout)?;
                Arc::new(McpToolSource::handshake(channel, label, &self.identity).await?)
            }
            TransportKind::PersistentHttpStream => {
                let channel =
                    StreamableHttpChannel::new(self.http.clone(), endpoint.address(), self.timeout);
                Arc::new(McpToolSource::handshake(channel, label, &self.identity).await?)
            }
        };
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn connector() -> McpConnector {
        McpConnector::new(
            ClientIdentity {
                name: "toolbench".to_owned(),
                version: "0.1.0".to_owned(),
                protocol_version: "2025-06-18".to_owned(),
            },
            Duration::from_secs(5),
        )
        .expect("connector should build")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_endpoints_handshake_and_list_tools() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {"protocolVersion": "2025-06-18", "serverInfo": {"name": "demo"}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "tools/list"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 2,
                "result": {"tools": [{"name": "search", "inputSchema": {"type": "object"}}]}
            })))
            .mount(&server)
            .await;

        let source = connector()
            .connect(&EndpointDescriptor::http(format!("{}/mcp", server.uri())))
            .await
            .expect("connect should succeed");
        let tools = source.list_tools().await.expect("listing should succeed");

        assert_eq!(tools.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_http_addresses_are_rejected_for_http_transport() {
        let result = connector()
            .connect(&EndpointDescriptor::http("python server.py"))
            .await;

        assert!(matches!(result, Err(ToolSourceError::InvalidEndpoint(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_programs_fail_to_connect() {
        let result = connector()
            .connect(&EndpointDescriptor::stdio("/nonexistent/toolbench-test-server"))
            .await;

        assert!(matches!(result, Err(ToolSourceError::Connect(_))));
    }
}
