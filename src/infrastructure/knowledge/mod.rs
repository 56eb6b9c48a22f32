//! Knowledge ingestion infrastructure
//!
//! Filesystem loading of the document corpus, JSON flattening, and startup
//! index construction.

pub mod flatten;
pub mod loader;

pub use flatten::flatten_json;
pub use loader::{initialize_knowledge_base, load_documents};
