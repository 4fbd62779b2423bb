//! Client settings loaded from an optional TOML file.
//!
//! Settings configure the MCP client only. Endpoint lists are edited per
//! session and are never written back.

use crate::endpoint::domain::EndpointDescriptor;
use crate::tool_registry::adapters::ClientIdentity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "TOOLBENCH_CONFIG";

/// MCP protocol revision requested during the handshake.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid settings TOML.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// TOML deserialization error.
        source: Box<toml::de::Error>,
    },
    /// A value is out of range.
    #[error("invalid setting {key}: {reason}")]
    Invalid {
        /// Setting name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchSettings {
    /// Client name sent in the handshake.
    pub client_name: String,
    /// Client version sent in the handshake.
    pub client_version: String,
    /// Requested MCP protocol version.
    pub protocol_version: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Descriptor used for new endpoints.
    pub default_endpoint: EndpointDescriptor,
}

impl Default for BenchSettings {
    fn default() -> Self {
        Self {
            client_name: env!("CARGO_PKG_NAME").to_owned(),
            client_version: env!("CARGO_PKG_VERSION").to_owned(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            default_endpoint: EndpointDescriptor::default(),
        }
    }
}

impl BenchSettings {
    /// Loads settings from the file named by [`CONFIG_PATH_ENV`], or returns
    /// defaults when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the named file cannot be read or parsed.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is not valid
    /// TOML, or holds out-of-range values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml_str(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source: Box::new(source),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_owned(),
            });
        }
        if self.protocol_version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "protocol_version",
                reason: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the identity announced during the handshake.
    #[must_use]
    pub fn client_identity(&self) -> ClientIdentity {
        ClientIdentity {
            name: self.client_name.clone(),
            version: self.client_version.clone(),
            protocol_version: self.protocol_version.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::domain::TransportKind;
    use rstest::rstest;

    #[test]
    fn empty_files_yield_defaults() {
        let settings = BenchSettings::from_toml_str("").expect("empty TOML should parse");
        assert_eq!(settings, BenchSettings::default());
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_files_override_selected_values() {
        let settings = BenchSettings::from_toml_str(
            r#"
            request_timeout_secs = 5

            [default_endpoint]
            address = "uvx demo-server"
            transport = "stdio"
            "#,
        )
        .expect("settings should parse");

        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(
            settings.default_endpoint.transport(),
            TransportKind::LongLivedProcess
        );
        assert_eq!(settings.client_identity().protocol_version, "2025-06-18");
    }

    #[test]
    fn default_endpoint_addresses_are_trimmed() {
        let settings = BenchSettings::from_toml_str(
            r#"
            [default_endpoint]
            address = "  http://x/mcp "
            transport = "streamable_http"
            "#,
        )
        .expect("settings should parse");

        assert_eq!(settings.default_endpoint.address(), "http://x/mcp");
        assert!(settings.default_endpoint.validate().is_ok());
    }

    #[rstest]
    #[case("request_timeout_secs = 0", "request_timeout_secs")]
    #[case("protocol_version = \" \"", "protocol_version")]
    fn out_of_range_values_are_rejected(#[case] text: &str, #[case] expected_key: &str) {
        let result = BenchSettings::from_toml_str(text);
        assert!(matches!(result, Err(ConfigError::Invalid { key, .. }) if key == expected_key));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let result = BenchSettings::from_toml_str("colour = \"blue\"");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn missing_files_yield_defaults() {
        let settings = BenchSettings::load(Path::new("/nonexistent/toolbench.toml"))
            .expect("missing file should not fail");
        assert_eq!(settings, BenchSettings::default());
    }
}
