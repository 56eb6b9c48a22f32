//! Knowledge corpus models: raw documents and retrievable chunks.

use serde::{Deserialize, Serialize};

/// Provenance attached to every chunk and document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Stable identifier of the origin document (path relative to the data
    /// root, forward slashes).
    pub source: String,

    /// Origin format tag ("json", "txt", "md").
    pub kind: String,
}

impl ChunkMetadata {
    pub fn new(source: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
        }
    }
}

/// A raw document as produced by ingestion, before chunking.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl DocumentInput {
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A unit of retrievable knowledge.
///
/// Created once during startup ingestion and immutable thereafter. The text
/// is never empty; consecutive chunks from the same source share a bounded
/// overlap so context survives split boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}
