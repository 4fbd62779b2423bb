//! Ordered, never-empty list of endpoint descriptors.

use super::{EndpointDescriptor, EndpointRegistryError, SessionKey, TransportKind};

/// Editable endpoint list.
///
/// The registry always holds at least one descriptor. It is a plain value:
/// edits never connect, and connecting reads a snapshot through
/// [`EndpointRegistry::descriptors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    template: EndpointDescriptor,
    endpoints: Vec<EndpointDescriptor>,
}

impl EndpointRegistry {
    /// Creates a registry holding a single copy of `template`.
    ///
    /// `template` is also the descriptor appended by [`EndpointRegistry::add`].
    #[must_use]
    pub fn new(template: EndpointDescriptor) -> Self {
        Self {
            endpoints: vec![template.clone()],
            template,
        }
    }

    /// Creates a registry from existing descriptors, falling back to a single
    /// copy of `template` when `descriptors` is empty.
    #[must_use]
    pub fn from_descriptors(
        template: EndpointDescriptor,
        descriptors: impl IntoIterator<Item = EndpointDescriptor>,
    ) -> Self {
        let endpoints: Vec<EndpointDescriptor> = descriptors.into_iter().collect();
        if endpoints.is_empty() {
            return Self::new(template);
        }

        Self {
            template,
            endpoints,
        }
    }

    /// Appends a copy of the template descriptor and returns its index.
    pub fn add(&mut self) -> usize {
        self.endpoints.push(self.template.clone());
        self.endpoints.len().saturating_sub(1)
    }

    /// Removes the descriptor at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointRegistryError::LastEndpoint`] when only one
    /// descriptor remains and [`EndpointRegistryError::IndexOutOfRange`] for
    /// an unknown index. The registry is unchanged on error.
    pub fn remove(&mut self, index: usize) -> Result<EndpointDescriptor, EndpointRegistryError> {
        self.ensure_index(index)?;
        if self.endpoints.len() == 1 {
            return Err(EndpointRegistryError::LastEndpoint);
        }

        Ok(self.endpoints.remove(index))
    }

    /// Replaces the address and transport of the descriptor at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointRegistryError::IndexOutOfRange`] for an unknown
    /// index.
    pub fn update(
        &mut self,
        index: usize,
        address: impl Into<String>,
        transport: TransportKind,
    ) -> Result<(), EndpointRegistryError> {
        let len = self.endpoints.len();
        let slot = self
            .endpoints
            .get_mut(index)
            .ok_or(EndpointRegistryError::IndexOutOfRange { index, len })?;
        *slot = EndpointDescriptor::new(address, transport);
        Ok(())
    }

    /// Returns the descriptor at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EndpointDescriptor> {
        self.endpoints.get(index)
    }

    /// Returns all descriptors in display order.
    #[must_use]
    pub fn descriptors(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    /// Returns the number of descriptors (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always `false`; present for API symmetry with [`EndpointRegistry::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Returns the synthetic session key for each descriptor.
    #[must_use]
    pub fn session_keys(&self) -> Vec<SessionKey> {
        (0..self.endpoints.len()).map(SessionKey::for_index).collect()
    }

    /// Renders the configuration as copyable `Server {n} ...` lines.
    #[must_use]
    pub fn share_lines(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .enumerate()
            .flat_map(|(index, descriptor)| {
                let position = index.saturating_add(1);
                [
                    format!("Server {position} URL: {}", descriptor.address()),
                    format!("Server {position} Transport: {}", descriptor.transport()),
                ]
            })
            .collect()
    }

    /// Serializes the descriptor list as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; descriptors only hold strings and enum
    /// tags, so this does not fail in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.endpoints)
    }

    fn ensure_index(&self, index: usize) -> Result<(), EndpointRegistryError> {
        if index < self.endpoints.len() {
            return Ok(());
        }

        Err(EndpointRegistryError::IndexOutOfRange {
            index,
            len: self.endpoints.len(),
        })
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::new(EndpointDescriptor::default())
    }
}
