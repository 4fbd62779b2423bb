//! Application services for tool discovery.

mod catalog;
mod discovery;

pub use catalog::{InsertOutcome, OVERWRITE_POLICY, ToolCatalog, ToolHandle};
pub use discovery::{
    AggregateSession, DiscoveryFailure, DiscoveryOutcome, DiscoveryWarning, discover,
};
