//! Connected-session state and the operations a front end drives.
//!
//! [`SessionState`] is owned by the caller and passed into every
//! [`BenchService`] operation; nothing is kept in globals.

mod service;
mod state;

pub use service::{BenchError, BenchService, ConnectReport};
pub use state::SessionState;
