//! Domain layer: models, ports, and errors with no infrastructure
//! dependencies.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ChatError, ChatResult};
