//! Failure-isolated tool discovery across every configured endpoint.

use super::catalog::{ToolCatalog, ToolHandle};
use crate::endpoint::domain::{EndpointDescriptor, SessionKey};
use crate::tool_registry::{
    domain::{SessionId, ToolDefinition},
    ports::{ToolSource, ToolSourceConnector, ToolSourceError},
};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Per-endpoint problem recorded during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    /// Key of the failing endpoint.
    pub session_key: SessionKey,
    /// Address of the failing endpoint.
    pub address: String,
    /// Failure description.
    pub message: String,
}

impl DiscoveryWarning {
    fn from_error(key: &SessionKey, endpoint: &EndpointDescriptor, err: &ToolSourceError) -> Self {
        Self {
            session_key: key.clone(),
            address: endpoint.address().to_owned(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "Failed to load tools from {}: {}",
            self.address, self.message
        )
    }
}

/// Discovery produced no tools at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no tools found from any MCP server")]
pub struct DiscoveryFailure {
    /// Warnings collected from every endpoint.
    pub warnings: Vec<DiscoveryWarning>,
}

/// One endpoint connected within an [`AggregateSession`].
#[derive(Clone)]
struct ConnectedSource {
    key: SessionKey,
    source: Arc<dyn ToolSource>,
}

/// All sources opened for one connect attempt.
#[derive(Clone)]
pub struct AggregateSession {
    id: SessionId,
    sources: Vec<ConnectedSource>,
}

impl fmt::Debug for AggregateSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self
            .sources
            .iter()
            .map(|connected| connected.key.as_str())
            .collect();
        formatter
            .debug_struct("AggregateSession")
            .field("id", &self.id)
            .field("sources", &keys)
            .finish()
    }
}

impl AggregateSession {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            sources: Vec::new(),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the keys of the endpoints that connected.
    #[must_use]
    pub fn connected_keys(&self) -> Vec<&SessionKey> {
        self.sources.iter().map(|connected| &connected.key).collect()
    }

    /// Closes every source. Close failures are logged and ignored.
    pub async fn close(&self) {
        for connected in &self.sources {
            if let Err(err) = connected.source.close().await {
                debug!(
                    session_id = %self.id,
                    session_key = %connected.key,
                    error = %err,
                    "source close failed"
                );
            }
        }
    }
}

/// Everything one discovery pass produced.
#[derive(Debug)]
pub struct DiscoveryOutcome {
    /// Session holding every connected source.
    pub session: AggregateSession,
    /// Name-keyed catalog built from all discovered tools.
    pub catalog: ToolCatalog,
    /// Total tool definitions discovered before duplicate names collapsed.
    pub discovered_count: usize,
    /// Per-endpoint failures.
    pub warnings: Vec<DiscoveryWarning>,
}

/// Connects to each endpoint in order and collects its tools.
///
/// Endpoints are visited sequentially. Any per-endpoint error becomes a
/// [`DiscoveryWarning`] and discovery moves on.
///
/// # Errors
///
/// Returns [`DiscoveryFailure`] when no endpoint yields a tool. The session
/// is closed before returning.
pub async fn discover<C>(
    connector: &C,
    endpoints: &[EndpointDescriptor],
) -> Result<DiscoveryOutcome, DiscoveryFailure>
where
    C: ToolSourceConnector + ?Sized,
{
    let mut session = AggregateSession::new();
    let mut handles = Vec::new();
    let mut warnings = Vec::new();
    info!(session_id = %session.id, endpoints = endpoints.len(), "discovering tools");

    for (index, endpoint) in endpoints.iter().enumerate() {
        let key = SessionKey::for_index(index);
        match load_endpoint(connector, &key, endpoint).await {
            Ok((source, tools)) => {
                debug!(session_key = %key, count = tools.len(), "endpoint listed tools");
                handles.extend(
                    tools
                        .into_iter()
                        .map(|tool| ToolHandle::new(tool, key.clone(), Arc::clone(&source))),
                );
                session.sources.push(ConnectedSource { key, source });
            }
            Err(err) => {
                let warning = DiscoveryWarning::from_error(&key, endpoint, &err);
                warn!(session_key = %key, address = endpoint.address(), "{warning}");
                warnings.push(warning);
            }
        }
    }

    let discovered_count = handles.len();
    let catalog = ToolCatalog::from_handles(handles);
    if catalog.is_empty() {
        warn!(session_id = %session.id, "no tools found from any MCP server");
        session.close().await;
        return Err(DiscoveryFailure { warnings });
    }

    info!(
        session_id = %session.id,
        tools = catalog.len(),
        discovered = discovered_count,
        "discovery complete"
    );
    Ok(DiscoveryOutcome {
        session,
        catalog,
        discovered_count,
        warnings,
    })
}

async fn load_endpoint<C>(
    connector: &C,
    key: &SessionKey,
    endpoint: &EndpointDescriptor,
) -> Result<(Arc<dyn ToolSource>, Vec<ToolDefinition>), ToolSourceError>
where
    C: ToolSourceConnector + ?Sized,
{
    let source = connector.connect(endpoint).await?;
    match source.list_tools().await {
        Ok(tools) => Ok((source, tools)),
        Err(err) => {
            if let Err(close_err) = source.close().await {
                debug!(session_key = %key, error = %close_err, "source close failed");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_registry::adapters::{InMemoryToolSource, InMemoryToolSourceConnector};
    use crate::tool_registry::ports::MockToolSourceConnector;
    use rstest::rstest;
    use serde_json::json;

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition::new(name, "", json!({})).expect("valid tool")
    }

    fn serve(
        connector: &InMemoryToolSourceConnector,
        address: &str,
        names: &[&str],
    ) -> Arc<InMemoryToolSource> {
        let source = Arc::new(InMemoryToolSource::with_tools(
            names.iter().map(|name| tool(name)).collect(),
        ));
        connector
            .register_source(address, Arc::clone(&source))
            .expect("script should succeed");
        source
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn failing_endpoints_become_warnings() {
        let connector = InMemoryToolSourceConnector::new();
        serve(&connector, "http://a/mcp", &["search"]);
        let endpoints = [
            EndpointDescriptor::http("http://down/mcp"),
            EndpointDescriptor::http("http://a/mcp"),
        ];

        let outcome = discover(&connector, &endpoints)
            .await
            .expect("discovery should succeed");

        assert_eq!(outcome.catalog.names(), vec!["search"]);
        assert_eq!(outcome.warnings.len(), 1);
        let warning = outcome.warnings.first().expect("warning expected");
        assert_eq!(warning.session_key, SessionKey::for_index(0));
        assert!(
            warning
                .to_string()
                .starts_with("Failed to load tools from http://down/mcp: ")
        );
        assert_eq!(outcome.session.connected_keys(), vec![&SessionKey::for_index(1)]);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn later_endpoints_win_duplicate_names() {
        let connector = InMemoryToolSourceConnector::new();
        serve(&connector, "http://a/mcp", &["search", "fetch"]);
        serve(&connector, "http://b/mcp", &["search"]);
        let endpoints = [
            EndpointDescriptor::http("http://a/mcp"),
            EndpointDescriptor::http("http://b/mcp"),
        ];

        let outcome = discover(&connector, &endpoints)
            .await
            .expect("discovery should succeed");

        assert_eq!(outcome.discovered_count, 3);
        assert_eq!(outcome.catalog.len(), 2);
        let search = outcome.catalog.get("search").expect("search expected");
        assert_eq!(search.source_key(), &SessionKey::for_index(1));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn no_tools_anywhere_fails_and_closes_sources() {
        let connector = InMemoryToolSourceConnector::new();
        let empty = serve(&connector, "http://empty/mcp", &[]);
        let endpoints = [
            EndpointDescriptor::http("http://empty/mcp"),
            EndpointDescriptor::http("not a url"),
        ];

        let failure = discover(&connector, &endpoints)
            .await
            .expect_err("discovery should fail");

        assert_eq!(failure.to_string(), "no tools found from any MCP server");
        assert_eq!(failure.warnings.len(), 1);
        assert!(empty.is_closed().expect("state should be readable"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn listing_failures_close_the_source() {
        let connector = InMemoryToolSourceConnector::new();
        let broken = serve(&connector, "http://broken/mcp", &["x"]);
        broken
            .set_listing_failure("malformed listing")
            .expect("script should succeed");
        serve(&connector, "http://ok/mcp", &["y"]);
        let endpoints = [
            EndpointDescriptor::http("http://broken/mcp"),
            EndpointDescriptor::http("http://ok/mcp"),
        ];

        let outcome = discover(&connector, &endpoints)
            .await
            .expect("discovery should succeed");

        assert_eq!(outcome.catalog.names(), vec!["y"]);
        assert!(broken.is_closed().expect("state should be readable"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn endpoints_are_visited_in_order() {
        let mut connector = MockToolSourceConnector::new();
        let mut sequence = mockall::Sequence::new();
        for address in ["http://first/mcp", "http://second/mcp"] {
            connector
                .expect_connect()
                .withf(move |endpoint| endpoint.address() == address)
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_| Err(ToolSourceError::Connect("refused".to_owned())));
        }
        let endpoints = [
            EndpointDescriptor::http("http://first/mcp"),
            EndpointDescriptor::http("http://second/mcp"),
        ];

        let failure = discover(&connector, &endpoints)
            .await
            .expect_err("discovery should fail");

        let keys: Vec<&SessionKey> = failure
            .warnings
            .iter()
            .map(|warning| &warning.session_key)
            .collect();
        assert_eq!(keys, vec![&SessionKey::for_index(0), &SessionKey::for_index(1)]);
    }
}
