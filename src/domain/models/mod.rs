//! Domain models: corpus documents, chunks, query intent, configuration.

pub mod chunk;
pub mod config;
pub mod intent;

pub use chunk::{Chunk, ChunkMetadata, DocumentInput};
pub use config::{
    AssistantConfig, Config, KnowledgeConfig, LlmConfig, LoggingConfig, ServerConfig,
};
pub use intent::{Intent, GROUNDED_TOKEN};
