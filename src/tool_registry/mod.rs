//! Tool discovery and invocation plumbing for remote tool sources.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]: tool definitions and parameter schemas
//! - Port contracts in [`ports`]: [`ports::ToolSource`] and its connector
//! - Adapter implementations in [`adapters`]: MCP over stdio and
//!   streamable HTTP, plus scripted in-memory sources
//! - Orchestration services in [`services`]: discovery and the catalog

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
