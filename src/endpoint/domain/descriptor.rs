//! Endpoint descriptor value objects.

use super::{EndpointDomainError, ParseTransportKindError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Address given to endpoints created without explicit settings.
pub const DEFAULT_ENDPOINT_ADDRESS: &str = "http://127.0.0.1:8000/mcp";

/// Transport used to reach a tool source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransportKind {
    /// MCP over the stdio pipes of a long-lived child process.
    #[serde(rename = "stdio", alias = "process")]
    LongLivedProcess,
    /// MCP over a persistent streamable HTTP connection.
    #[default]
    #[serde(
        rename = "streamable_http",
        alias = "streamable-http",
        alias = "http"
    )]
    PersistentHttpStream,
}

impl TransportKind {
    /// Returns the canonical text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LongLivedProcess => "stdio",
            Self::PersistentHttpStream => "streamable_http",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportKind {
    type Error = ParseTransportKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "stdio" | "process" => Ok(Self::LongLivedProcess),
            "streamable_http" | "streamable-http" | "http" => Ok(Self::PersistentHttpStream),
            _ => Err(ParseTransportKindError(value.to_owned())),
        }
    }
}

/// One configured remote tool source.
///
/// Descriptors are deliberately permissive: any address can be stored so the
/// user can edit freely. [`EndpointDescriptor::validate`] is applied when a
/// connection is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEndpointDescriptor")]
pub struct EndpointDescriptor {
    address: String,
    transport: TransportKind,
}

/// Wire shape of [`EndpointDescriptor`]; decoding goes through
/// [`EndpointDescriptor::new`] so addresses are trimmed.
#[derive(Deserialize)]
struct RawEndpointDescriptor {
    address: String,
    transport: TransportKind,
}

impl From<RawEndpointDescriptor> for EndpointDescriptor {
    fn from(raw: RawEndpointDescriptor) -> Self {
        Self::new(raw.address, raw.transport)
    }
}

impl EndpointDescriptor {
    /// Creates a descriptor, trimming the address.
    #[must_use]
    pub fn new(address: impl Into<String>, transport: TransportKind) -> Self {
        Self {
            address: address.into().trim().to_owned(),
            transport,
        }
    }

    /// Creates a streamable HTTP descriptor.
    #[must_use]
    pub fn http(address: impl Into<String>) -> Self {
        Self::new(address, TransportKind::PersistentHttpStream)
    }

    /// Creates a stdio descriptor from a command line.
    #[must_use]
    pub fn stdio(command_line: impl Into<String>) -> Self {
        Self::new(command_line, TransportKind::LongLivedProcess)
    }

    /// Returns the address (URL or command line).
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the transport kind.
    #[must_use]
    pub const fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Checks that the address is usable with the transport kind.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointDomainError::EmptyAddress`] for a blank address and
    /// [`EndpointDomainError::InvalidHttpAddress`] when an HTTP endpoint does
    /// not use an `http://` or `https://` URL.
    pub fn validate(&self) -> Result<(), EndpointDomainError> {
        if self.address.is_empty() {
            return Err(EndpointDomainError::EmptyAddress);
        }

        let is_http_url =
            self.address.starts_with("http://") || self.address.starts_with("https://");
        if self.transport == TransportKind::PersistentHttpStream && !is_http_url {
            return Err(EndpointDomainError::InvalidHttpAddress(
                self.address.clone(),
            ));
        }

        Ok(())
    }
}

impl Default for EndpointDescriptor {
    fn default() -> Self {
        Self::http(DEFAULT_ENDPOINT_ADDRESS)
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} ({})", self.address, self.transport)
    }
}
