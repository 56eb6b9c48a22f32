//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters implement. The domain
//! and service layers depend only on these contracts, never on concrete
//! backends.

pub mod language_model;

pub use language_model::{LanguageModel, TokenStream};
