//! Endpoint configuration for the tool bench.
//!
//! An endpoint names one remote tool source: an address plus the transport
//! used to reach it. The [`domain::EndpointRegistry`] keeps the ordered list
//! the user edits before connecting. Nothing in this module opens
//! connections; see [`crate::tool_registry`] for discovery.

pub mod domain;
