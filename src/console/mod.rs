//! Line-oriented console front end.
//!
//! Parsing, execution, and rendering live here so the `toolbench` binary is
//! only a read-eval-print loop.

mod app;
mod command;
mod render;

pub use app::{ConsoleApp, Reply};
pub use command::{Command, HELP_TEXT, parse_command};
pub use render::{render_fields, render_report, render_result, render_rows, render_servers};

use crate::endpoint::domain::{EndpointRegistryError, ParseTransportKindError};
use crate::session::BenchError;
use thiserror::Error;

/// Errors reported to the console user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleCommandError {
    /// The first word is not a command.
    #[error("unknown command '{0}'; type 'help' for a list")]
    UnknownCommand(String),
    /// A required argument is missing.
    #[error("'{command}' needs a <{argument}> argument")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Missing argument name.
        argument: &'static str,
    },
    /// A server number is not a positive integer.
    #[error("'{0}' is not a server number (servers are numbered from 1)")]
    InvalidPosition(String),
    /// The transport name is not supported.
    #[error(transparent)]
    InvalidTransport(#[from] ParseTransportKindError),
    /// A run argument is not `field=value`.
    #[error("expected field=value, got '{0}'")]
    InvalidAssignment(String),
    /// A double quote was opened and never closed.
    #[error("unterminated quote in run arguments")]
    UnterminatedQuote,
    /// The registry refused an edit.
    #[error(transparent)]
    Registry(#[from] EndpointRegistryError),
    /// The command needs a connected session.
    #[error("not connected; run 'connect' first")]
    NotConnected,
    /// The tool is not in the catalog.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    /// Running the tool failed.
    #[error(transparent)]
    Run(#[from] BenchError),
    /// The configuration could not be exported.
    #[error("failed to export configuration: {0}")]
    Export(String),
}
