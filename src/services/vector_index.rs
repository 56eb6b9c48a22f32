//! In-memory similarity index over embedded chunks.
//!
//! The index is built exactly once at startup, is immutable afterwards, and
//! is shared read-only across all concurrent requests. Queries are a linear
//! scan over cosine similarities; that is intentional at this corpus size
//! (tens to low thousands of chunks) and keeps the index free of locks and
//! persistence.

use std::sync::OnceLock;

use crate::domain::errors::{ChatError, ChatResult};
use crate::domain::models::Chunk;
use crate::services::embedding::HashedEmbedder;

/// One chunk scored against a query.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub similarity: f32,
}

struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// Immutable similarity index.
pub struct VectorIndex {
    embedder: HashedEmbedder,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed all chunks and build the index. Consumes the chunks; there is
    /// no insert or delete after this.
    pub fn build(embedder: HashedEmbedder, chunks: Vec<Chunk>) -> Self {
        let entries = chunks
            .into_iter()
            .map(|chunk| {
                let embedding = embedder.embed(&chunk.text);
                IndexEntry { chunk, embedding }
            })
            .collect();

        Self { embedder, entries }
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k chunks by cosine similarity to the query text, most similar
    /// first. Equal similarities keep their insertion order. Entries with no
    /// similarity at all are excluded, so a query sharing no vocabulary with
    /// the corpus returns nothing.
    pub fn query(&self, text: &str, k: usize) -> Vec<SearchHit> {
        let query = self.embedder.embed(text);

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                chunk: entry.chunk.clone(),
                similarity: cosine_similarity(&query, &entry.embedding),
            })
            .filter(|hit| hit.similarity > 0.0)
            .collect();

        // Stable sort keeps insertion order for equal similarities.
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(k);
        hits
    }
}

/// Cosine similarity with zero-magnitude guard.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Explicit readiness cell around the index.
///
/// Constructed empty, installed exactly once after startup ingestion, and
/// handed to the orchestrator by reference. Reading before install fails
/// fast with [`ChatError::IndexNotReady`] instead of blocking; general
/// (non-grounded) requests never touch it.
#[derive(Default)]
pub struct KnowledgeBase {
    index: OnceLock<VectorIndex>,
}

impl KnowledgeBase {
    /// An empty, not-yet-ready knowledge base.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A knowledge base that is ready from construction.
    pub fn ready(index: VectorIndex) -> Self {
        let base = Self::default();
        base.install(index);
        base
    }

    /// Install the built index. A second install is ignored; the corpus is
    /// fixed for the process lifetime.
    pub fn install(&self, index: VectorIndex) {
        if self.index.set(index).is_err() {
            tracing::warn!("knowledge index already installed; ignoring rebuild");
        }
    }

    pub fn is_ready(&self) -> bool {
        self.index.get().is_some()
    }

    /// The index, or `IndexNotReady` when queried before install.
    pub fn index(&self) -> ChatResult<&VectorIndex> {
        self.index.get().ok_or(ChatError::IndexNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ChunkMetadata;

    fn chunk(text: &str) -> Chunk {
        Chunk::new(text, ChunkMetadata::new("corpus.json", "json"))
    }

    fn index(texts: &[&str]) -> VectorIndex {
        let chunks = texts.iter().map(|t| chunk(t)).collect();
        VectorIndex::build(HashedEmbedder::default(), chunks)
    }

    #[test]
    fn test_build_counts_chunks() {
        let index = index(&["alpha", "beta", "gamma"]);
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_exact_text_is_top_hit() {
        let index = index(&[
            "Admissions close on June 30 each year.",
            "Placement: 95% in 2023",
            "The library is open from 8am to 10pm.",
        ]);

        let hits = index.query("Placement: 95% in 2023", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.text, "Placement: 95% in 2023");
        assert!((hits[0].similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ordered_by_descending_similarity() {
        let index = index(&[
            "cafeteria menu monday",
            "placement statistics 2023",
            "placement office",
        ]);

        let hits = index.query("placement statistics", 3);
        assert!(hits.len() >= 2);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
        assert_eq!(hits[0].chunk.text, "placement statistics 2023");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        // Same token multiset, distinct text: identical vectors, so the
        // similarities tie exactly and insertion order must decide.
        let index = index(&["beta alpha", "alpha beta", "beta  alpha"]);

        let hits = index.query("alpha", 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].chunk.text, "beta alpha");
        assert_eq!(hits[1].chunk.text, "alpha beta");
        assert_eq!(hits[2].chunk.text, "beta  alpha");
    }

    #[test]
    fn test_k_bounds_result_count() {
        let index = index(&["a b", "a c", "a d", "a e"]);
        assert_eq!(index.query("a", 2).len(), 2);
        assert!(index.query("a", 10).len() <= 4);
    }

    #[test]
    fn test_disjoint_vocabulary_returns_nothing() {
        let index = index(&["mensa regula", "bibliotheca hora"]);
        let hits = index.query("completely unrelated words", 8);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let index = index(&["some indexed text"]);
        assert!(index.query("", 8).is_empty());
        assert!(index.query("   ", 8).is_empty());
    }

    #[test]
    fn test_knowledge_base_not_ready() {
        let base = KnowledgeBase::empty();
        assert!(!base.is_ready());
        assert!(matches!(base.index(), Err(ChatError::IndexNotReady)));
    }

    #[test]
    fn test_knowledge_base_ready() {
        let base = KnowledgeBase::ready(index(&["alpha"]));
        assert!(base.is_ready());
        assert_eq!(base.index().unwrap().len(), 1);
    }

    #[test]
    fn test_second_install_is_ignored() {
        let base = KnowledgeBase::ready(index(&["alpha"]));
        base.install(index(&["beta", "gamma"]));
        assert_eq!(base.index().unwrap().len(), 1);
    }

    #[test]
    fn test_cosine_similarity_guards() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}
