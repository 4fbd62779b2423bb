//! Synthetic per-endpoint session keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display label for one endpoint within a connect attempt.
///
/// Keys are derived from the registry position (`server_1`, `server_2`, ...)
/// and only appear in messages; the tool catalog is keyed by tool name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Builds the key for the endpoint at zero-based `index`.
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        Self(format!("server_{}", index.saturating_add(1)))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
