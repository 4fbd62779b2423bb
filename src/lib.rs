//! Toolbench: a multi-endpoint MCP tool catalog and invocation bridge.
//!
//! The crate discovers the tools exposed by one or more MCP servers, merges
//! them into a single catalog keyed by tool name, turns each tool's input
//! schema into a form, and normalizes call results for display.
//!
//! # Architecture
//!
//! The tool registry follows hexagonal architecture principles:
//!
//! - **Domain**: tool definitions and parameter schemas
//! - **Ports**: the [`tool_registry::ports::ToolSource`] contract
//! - **Adapters**: MCP over stdio and streamable HTTP, plus in-memory sources
//!
//! # Modules
//!
//! - [`endpoint`]: endpoint descriptors and the editable endpoint registry
//! - [`tool_registry`]: discovery, the tool catalog, and transport adapters
//! - [`form`]: schema-driven input forms
//! - [`invocation`]: tool calls and result normalization
//! - [`session`]: session state and the operations front ends drive
//! - [`config`]: client settings
//! - [`telemetry`]: logging setup
//! - [`console`]: the line-oriented front end

pub mod config;
pub mod console;
pub mod endpoint;
pub mod form;
pub mod invocation;
pub mod session;
pub mod telemetry;
pub mod tool_registry;
