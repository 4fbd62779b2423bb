//! Domain model for endpoint descriptors and the endpoint registry.

mod descriptor;
mod error;
mod ids;
mod registry;

pub use descriptor::{DEFAULT_ENDPOINT_ADDRESS, EndpointDescriptor, TransportKind};
pub use error::{EndpointDomainError, EndpointRegistryError, ParseTransportKindError};
pub use ids::SessionKey;
pub use registry::EndpointRegistry;
