//! JSON-RPC over the stdio pipes of a long-lived child process.
//!
//! Messages are newline-delimited JSON. Lines that are not JSON-RPC
//! responses (server log output, notifications, server-initiated requests)
//! and responses for other request ids are skipped.

use super::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestIds};
use super::mcp::JsonRpcChannel;
use crate::tool_registry::ports::{ToolSourceError, ToolSourceResult};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, trace};

type BoxedReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Bidirectional JSON-RPC channel over a byte stream pair.
pub struct StdioChannel {
    label: String,
    writer: Mutex<BoxedWriter>,
    reader: Mutex<BoxedReader>,
    child: Mutex<Option<Child>>,
    ids: RequestIds,
    timeout: Duration,
}

impl std::fmt::Debug for StdioChannel {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("StdioChannel")
            .field("label", &self.label)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl StdioChannel {
    /// Creates a channel over arbitrary streams.
    pub fn new(
        label: impl Into<String>,
        reader: impl AsyncRead + Send + Unpin + 'static,
        writer: impl AsyncWrite + Send + Unpin + 'static,
        timeout: Duration,
    ) -> Self {
        let boxed_reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(reader);
        let boxed_writer: BoxedWriter = Box::new(writer);
        Self {
            label: label.into(),
            writer: Mutex::new(boxed_writer),
            reader: Mutex::new(BufReader::new(boxed_reader)),
            child: Mutex::new(None),
            ids: RequestIds::new(),
            timeout,
        }
    }

    /// Spawns `command_line` and wires its stdin/stdout as the channel.
    ///
    /// The command line is split on whitespace; the first word is the
    /// program. The child is killed when the channel is dropped. Its stderr
    /// is forwarded to `debug` logs.
    ///
    /// # Errors
    ///
    /// Returns [`ToolSourceError::Connect`] when the command line is empty or
    /// the process cannot be spawned.
    pub fn spawn(command_line: &str, timeout: Duration) -> ToolSourceResult<Self> {
        let mut words = command_line.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| ToolSourceError::Connect("empty command line".to_owned()))?;

        let mut child = Command::new(program)
            .args(words)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| ToolSourceError::Connect(format!("failed to spawn '{program}': {err}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolSourceError::Connect("failed to capture stdin".to_owned()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolSourceError::Connect("failed to capture stdout".to_owned()))?;

        if let Some(stderr) = child.stderr.take() {
            let label = command_line.to_owned();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(endpoint = %label, "server stderr: {line}");
                }
            });
        }

        let channel = Self::new(command_line, stdout, stdin, timeout);
        Ok(channel.with_child(child))
    }

    fn with_child(self, child: Child) -> Self {
        Self {
            child: Mutex::new(Some(child)),
            ..self
        }
    }

    async fn write_message(&self, message: &impl Serialize) -> ToolSourceResult<()> {
        let mut line = serde_json::to_string(message)
            .map_err(|err| ToolSourceError::Protocol(format!("failed to encode message: {err}")))?;
        line.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|err| ToolSourceError::Transport(format!("failed to write to stdin: {err}")))?;
        writer
            .flush()
            .await
            .map_err(|err| ToolSourceError::Transport(format!("failed to flush stdin: {err}")))
    }

    async fn read_response(&self, id: u64) -> ToolSourceResult<JsonRpcResponse> {
        let mut reader = self.reader.lock().await;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(|err| {
                ToolSourceError::Transport(format!("failed to read from stdout: {err}"))
            })?;
            if bytes_read == 0 {
                return Err(ToolSourceError::Transport(
                    "server stdout closed (process may have exited)".to_owned(),
                ));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let Ok(message) = serde_json::from_str::<Value>(trimmed) else {
                trace!(endpoint = %self.label, "skipping non-JSON output: {trimmed}");
                continue;
            };

            match JsonRpcResponse::from_message(&message) {
                Some(response) if response.answers(id) => return Ok(response),
                _ => trace!(endpoint = %self.label, "skipping unrelated message"),
            }
        }
    }
}

#[async_trait]
impl JsonRpcChannel for StdioChannel {
    async fn request(&self, method: &str, params: Option<Value>) -> ToolSourceResult<Value> {
        let request = JsonRpcRequest::new(self.ids.next_id(), method, params);
        let exchange = async {
            self.write_message(&request).await?;
            self.read_response(request.id()).await
        };

        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ToolSourceError::Timeout {
                method: method.to_owned(),
                timeout: self.timeout,
            })??;
        response.into_result()
    }

    async fn notify(&self, method: &str, params: Option<Value>) -> ToolSourceResult<()> {
        self.write_message(&JsonRpcNotification::new(method, params))
            .await
    }

    async fn shutdown(&self) -> ToolSourceResult<()> {
        let mut guard = self.child.lock().await;
        if let Some(mut child) = guard.take() {
            debug!(endpoint = %self.label, "stopping server process");
            if let Err(err) = child.kill().await {
                debug!(endpoint = %self.label, error = %err, "server process already gone");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, duplex};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test(flavor = "multi_thread")]
    async fn request_skips_noise_and_unrelated_ids() {
        let (client_side, server_side) = duplex(4096);
        let (client_read, client_write) = tokio::io::split(client_side);
        let channel = StdioChannel::new("test", client_read, client_write, TIMEOUT);

        let server = tokio::spawn(async move {
            let (server_read, mut server_write) = tokio::io::split(server_side);
            let mut lines = BufReader::new(server_read).lines();
            let request_line = lines
                .next_line()
                .await
                .expect("read should succeed")
                .expect("request expected");
            let request: Value = serde_json::from_str(&request_line).expect("valid request");
            let id = request.get("id").cloned().expect("id expected");
            let replies = format!(
                "starting server...\n{}\n{}\n",
                json!({"jsonrpc": "2.0", "id": 999, "result": {"wrong": true}}),
                json!({"jsonrpc": "2.0", "id": id, "result": {"ok": true}})
            );
            server_write
                .write_all(replies.as_bytes())
                .await
                .expect("write should succeed");
            request
        });

        let result = channel
            .request("tools/list", None)
            .await
            .expect("request should succeed");
        let request = server.await.expect("server task should finish");

        assert_eq!(result, json!({"ok": true}));
        assert_eq!(request.get("method"), Some(&json!("tools/list")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn closed_stdout_is_a_transport_error() {
        let (client_side, server_side) = duplex(1024);
        let (client_read, client_write) = tokio::io::split(client_side);
        let channel = StdioChannel::new("test", client_read, client_write, TIMEOUT);
        drop(server_side);

        let result = channel.request("tools/list", None).await;

        assert!(matches!(result, Err(ToolSourceError::Transport(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn silent_server_times_out() {
        let (client_side, _server_side) = duplex(1024);
        let (client_read, client_write) = tokio::io::split(client_side);
        let channel = StdioChannel::new(
            "test",
            client_read,
            client_write,
            Duration::from_millis(50),
        );

        let result = channel.request("initialize", None).await;

        assert!(matches!(result, Err(ToolSourceError::Timeout { .. })));
    }

    #[test]
    fn empty_command_lines_are_rejected() {
        let result = StdioChannel::spawn("   ", TIMEOUT);
        assert!(matches!(result, Err(ToolSourceError::Connect(_))));
    }
}
