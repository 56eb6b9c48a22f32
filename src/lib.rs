//! Ragline - Retrieval-Augmented Chat Service
//!
//! Ragline answers natural-language questions over HTTP by routing each
//! query through an intent classifier and then either a general response
//! path or a retrieval-augmented path grounded in a small document corpus.
//! Answers stream back token by token as server-sent events.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, ports, and errors with no
//!   infrastructure dependencies
//! - **Service Layer** (`services`): Chunking, embedding, similarity search,
//!   and answer orchestration
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging,
//!   corpus ingestion, and the LLM backend client
//! - **Adapter Layer** (`adapters`): The HTTP/SSE surface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ragline::infrastructure::knowledge::initialize_knowledge_base;
//! use ragline::services::{Assistant, KnowledgeBase};
//!
//! # async fn bootstrap(config: ragline::Config) -> anyhow::Result<()> {
//! let index = initialize_knowledge_base(&config.knowledge)?;
//! let knowledge = Arc::new(KnowledgeBase::ready(index));
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ChatError, ChatResult};
pub use domain::models::{
    AssistantConfig, Chunk, ChunkMetadata, Config, DocumentInput, Intent, KnowledgeConfig,
    LlmConfig, LoggingConfig, ServerConfig,
};
pub use domain::ports::{LanguageModel, TokenStream};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Assistant, Chunker, HashedEmbedder, KnowledgeBase, VectorIndex};
