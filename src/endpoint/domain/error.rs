//! Error types for endpoint validation and registry edits.

use thiserror::Error;

/// Errors returned while validating an endpoint descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointDomainError {
    /// The endpoint address is empty after trimming.
    #[error("endpoint address must not be empty")]
    EmptyAddress,

    /// An HTTP endpoint address does not have an `http://` or `https://`
    /// prefix.
    #[error("HTTP endpoint address '{0}' must start with 'http://' or 'https://'")]
    InvalidHttpAddress(String),
}

/// Errors returned by [`super::EndpointRegistry`] edits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointRegistryError {
    /// Removing the entry would leave the registry empty.
    #[error("cannot remove the last endpoint; at least one must remain")]
    LastEndpoint,

    /// The index does not address an existing entry.
    #[error("endpoint index {index} is out of range (registry holds {len})")]
    IndexOutOfRange {
        /// Requested zero-based index.
        index: usize,
        /// Number of entries in the registry.
        len: usize,
    },
}

/// Error returned while parsing a transport kind from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported transport: {0} (expected 'stdio' or 'streamable_http')")]
pub struct ParseTransportKindError(pub String);
