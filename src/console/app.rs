//! Command execution against the endpoint registry and session.

use super::ConsoleCommandError;
use super::command::{Command, HELP_TEXT, parse_command};
use super::render::{render_fields, render_report, render_result, render_servers};
use crate::endpoint::domain::{EndpointDescriptor, EndpointRegistry};
use crate::session::{BenchService, SessionState};
use crate::tool_registry::{ports::ToolSourceConnector, services::ToolHandle};
use mockable::Clock;

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print the text (may be empty) and keep reading.
    Output(String),
    /// Leave the loop.
    Quit,
}

/// Console state: the endpoint registry, the session, and the service
/// operating on them.
pub struct ConsoleApp<C, K>
where
    C: ToolSourceConnector,
    K: Clock + Send + Sync,
{
    registry: EndpointRegistry,
    state: SessionState,
    service: BenchService<C, K>,
}

impl<C, K> ConsoleApp<C, K>
where
    C: ToolSourceConnector,
    K: Clock + Send + Sync,
{
    /// Creates a console with one endpoint copied from `template`.
    #[must_use]
    pub fn new(service: BenchService<C, K>, template: EndpointDescriptor) -> Self {
        Self {
            registry: EndpointRegistry::new(template),
            state: SessionState::new(),
            service,
        }
    }

    /// Returns the endpoint registry.
    #[must_use]
    pub const fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Returns the session state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Parses and executes one input line.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleCommandError`] when the line does not parse or the
    /// command fails.
    pub async fn handle_line(&mut self, line: &str) -> Result<Reply, ConsoleCommandError> {
        match parse_command(line)? {
            Some(command) => self.execute(command).await,
            None => Ok(Reply::Output(String::new())),
        }
    }

    /// Executes one command.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleCommandError`] when the command fails. Session and
    /// registry are left consistent.
    pub async fn execute(&mut self, command: Command) -> Result<Reply, ConsoleCommandError> {
        let text = match command {
            Command::Help => HELP_TEXT.to_owned(),
            Command::Servers => render_servers(&self.registry),
            Command::Add => {
                let index = self.registry.add();
                format!("Added server {}.", index.saturating_add(1))
            }
            Command::Remove(index) => {
                let removed = self.registry.remove(index)?;
                format!("Removed server {}: {removed}", index.saturating_add(1))
            }
            Command::Set {
                index,
                transport,
                address,
            } => {
                self.registry.update(index, address, transport)?;
                let updated = self
                    .registry
                    .get(index)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                format!("Server {}: {updated}", index.saturating_add(1))
            }
            Command::Share => self.share_text()?,
            Command::Connect => {
                let report = self
                    .service
                    .connect(&mut self.state, self.registry.descriptors())
                    .await;
                render_report(&report)
            }
            Command::Tools => self.tools_text()?,
            Command::Schema(tool) => {
                let handle = self.connected_tool(&tool)?;
                let fields = self.state.field_descriptors(&tool).unwrap_or_default();
                render_fields(handle.name(), handle.definition().description(), &fields)
            }
            Command::Run { tool, inputs } => {
                self.connected_tool(&tool)?;
                let result = self.service.run_form(&self.state, &tool, &inputs).await?;
                render_result(&result)
            }
            Command::Disconnect => {
                self.service.disconnect(&mut self.state).await;
                "Disconnected.".to_owned()
            }
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Output(text))
    }

    fn share_text(&self) -> Result<String, ConsoleCommandError> {
        let json = self
            .registry
            .to_json()
            .map_err(|err| ConsoleCommandError::Export(err.to_string()))?;
        let mut lines = self.registry.share_lines();
        lines.push(String::new());
        lines.push(json);
        Ok(lines.join("\n"))
    }

    fn tools_text(&self) -> Result<String, ConsoleCommandError> {
        if !self.state.is_connected() {
            return Err(ConsoleCommandError::NotConnected);
        }
        let lines: Vec<String> = self
            .state
            .catalog()
            .iter()
            .map(|handle| {
                let description = handle.definition().description();
                if description.is_empty() {
                    handle.name().to_owned()
                } else {
                    format!("{} - {description}", handle.name())
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn connected_tool(&self, name: &str) -> Result<&ToolHandle, ConsoleCommandError> {
        if !self.state.is_connected() {
            return Err(ConsoleCommandError::NotConnected);
        }
        self.state
            .tool(name)
            .ok_or_else(|| ConsoleCommandError::UnknownTool(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool_registry::adapters::{InMemoryToolSource, InMemoryToolSourceConnector};
    use crate::tool_registry::domain::ToolDefinition;
    use mockable::DefaultClock;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::Arc;

    type TestConsole = ConsoleApp<InMemoryToolSourceConnector, DefaultClock>;

    const ADDRESS: &str = "http://127.0.0.1:8000/mcp";

    #[fixture]
    fn console() -> (Arc<InMemoryToolSource>, TestConsole) {
        let connector = Arc::new(InMemoryToolSourceConnector::new());
        let source = Arc::new(InMemoryToolSource::with_tools(vec![
            ToolDefinition::new(
                "echo",
                "Echoes text",
                json!({"properties": {"text": {"type": "string"}}}),
            )
            .expect("valid tool"),
        ]));
        source
            .set_result("echo", json!("hello"))
            .expect("script should succeed");
        connector
            .register_source(ADDRESS, Arc::clone(&source))
            .expect("script should succeed");
        let service = BenchService::new(connector, Arc::new(DefaultClock));
        (source, ConsoleApp::new(service, EndpointDescriptor::http(ADDRESS)))
    }

    async fn output(console: &mut TestConsole, line: &str) -> String {
        match console.handle_line(line).await.expect("command should succeed") {
            Reply::Output(text) => text,
            Reply::Quit => panic!("unexpected quit"),
        }
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn connect_then_run_prints_result(console: (Arc<InMemoryToolSource>, TestConsole)) {
        let (source, mut app) = console;

        let report = output(&mut app, "connect").await;
        let tools = output(&mut app, "tools").await;
        let result = output(&mut app, "run echo text=hi").await;

        assert_eq!(report, "Connected to 1 server(s); 1 tool(s) available.");
        assert_eq!(tools, "echo - Echoes text");
        assert_eq!(result, "hello");
        let calls = source.calls().expect("calls should be readable");
        let payload = &calls.first().expect("one call expected").payload;
        assert_eq!(payload.get("text"), Some(&json!("hi")));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn tool_commands_require_a_connection(console: (Arc<InMemoryToolSource>, TestConsole)) {
        let (_, mut app) = console;

        let result = app.handle_line("schema echo").await;

        assert_eq!(result, Err(ConsoleCommandError::NotConnected));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn last_server_cannot_be_removed(console: (Arc<InMemoryToolSource>, TestConsole)) {
        let (_, mut app) = console;

        let result = app.handle_line("remove 1").await;

        assert!(matches!(result, Err(ConsoleCommandError::Registry(_))));
        assert_eq!(app.registry().len(), 1);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn share_lists_every_server(console: (Arc<InMemoryToolSource>, TestConsole)) {
        let (_, mut app) = console;
        output(&mut app, "add").await;
        output(&mut app, "set 2 stdio uvx demo").await;

        let shared = output(&mut app, "share").await;

        assert!(shared.starts_with(
            "Server 1 URL: http://127.0.0.1:8000/mcp\nServer 1 Transport: streamable_http\n\
             Server 2 URL: uvx demo\nServer 2 Transport: stdio\n"
        ));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn quit_ends_the_loop(console: (Arc<InMemoryToolSource>, TestConsole)) {
        let (_, mut app) = console;
        assert_eq!(app.handle_line("quit").await, Ok(Reply::Quit));
    }
}
