//! Interactive console for discovering and running MCP tools.
//!
//! Usage:
//!
//! ```text
//! toolbench
//! ```
//!
//! Commands are read from stdin one per line; type `help` for the list.
//! Client settings come from the TOML file named by `TOOLBENCH_CONFIG`.
//! Logs go to stderr and are filtered with `RUST_LOG`.

use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder;
use toolbench::config::BenchSettings;
use toolbench::console::{ConsoleApp, HELP_TEXT, Reply};
use toolbench::session::BenchService;
use toolbench::telemetry::init_tracing;
use toolbench::tool_registry::adapters::McpConnector;
use tracing::info;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

const PROMPT: &str = "toolbench> ";

fn main() -> Result<(), BoxError> {
    init_tracing()?;
    let settings = BenchSettings::load_from_env()?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(settings))
}

async fn run(settings: BenchSettings) -> Result<(), BoxError> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout_secs = settings.request_timeout_secs,
        "starting toolbench"
    );
    let connector = McpConnector::new(settings.client_identity(), settings.request_timeout())?;
    let service = BenchService::new(Arc::new(connector), Arc::new(mockable::DefaultClock));
    let mut app = ConsoleApp::new(service, settings.default_endpoint.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    emit(HELP_TEXT)?;
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        match app.handle_line(&line).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Output(text)) if text.is_empty() => {}
            Ok(Reply::Output(text)) => emit(&text)?,
            Err(err) => emit(&format!("error: {err}"))?,
        }
        prompt()?;
    }

    app.handle_line("disconnect").await?;
    Ok(())
}

fn emit(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{PROMPT}")?;
    stdout.flush()
}
