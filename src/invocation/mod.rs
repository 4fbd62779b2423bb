//! Tool invocation and result normalization.

mod normalizer;
mod pipeline;

pub use normalizer::{DisplayResult, normalize};
pub use pipeline::{InvocationError, invoke};
