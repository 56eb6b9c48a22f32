//! Service layer: chunking, embedding, similarity search, and answer
//! orchestration.

pub mod assistant;
pub mod chunker;
pub mod embedding;
pub mod vector_index;

pub use assistant::{Assistant, AnswerStream};
pub use chunker::{Chunker, ChunkerConfig};
pub use embedding::HashedEmbedder;
pub use vector_index::{KnowledgeBase, SearchHit, VectorIndex};
