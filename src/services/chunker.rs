//! Text chunking service.
//!
//! Splits raw documents into bounded, overlapping segments suitable for
//! embedding. Splitting prefers structural boundaries (paragraph, line,
//! sentence, word) and falls back to a hard character cut only when no
//! boundary fits within the budget.

use anyhow::{anyhow, Result};

use crate::domain::models::{Chunk, DocumentInput};

/// Chunking configuration.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters, overlap included.
    pub chunk_size: usize,

    /// Characters carried over from the previous piece of the same source.
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 700,
            chunk_overlap: 120,
        }
    }
}

impl ChunkerConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be positive".to_string());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }
        Ok(())
    }
}

/// Boundary-preferring text chunker.
#[derive(Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a chunker with custom configuration.
    pub fn with_config(config: ChunkerConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid chunker config: {}", e))?;
        Ok(Self { config })
    }

    /// Split one document into chunks carrying its provenance metadata.
    ///
    /// The underlying pieces partition the source text exactly; each emitted
    /// chunk after the first is prefixed with the trailing overlap of its
    /// predecessor piece, clamped so the prefix is never an entire piece.
    /// Whitespace-only segments are dropped, so every chunk has non-empty
    /// text.
    pub fn split_document(&self, document: &DocumentInput) -> Vec<Chunk> {
        let pieces = self.split_text(&document.text);

        let mut chunks = Vec::with_capacity(pieces.len());
        let mut previous: Option<&str> = None;

        for piece in &pieces {
            let text = match previous {
                Some(prev) => format!(
                    "{}{}",
                    overlap_tail(prev, self.config.chunk_overlap),
                    piece
                ),
                None => piece.clone(),
            };
            previous = Some(piece);

            if !text.trim().is_empty() {
                chunks.push(Chunk::new(text, document.metadata.clone()));
            }
        }

        chunks
    }

    /// Partition text into pieces of at most the budget, cutting at the best
    /// boundary available inside each window.
    ///
    /// The first piece gets the full chunk budget; later pieces leave room
    /// for the overlap prefix added in `split_document`.
    fn split_text(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut rest = text;
        let mut budget = self.config.chunk_size;

        while !rest.is_empty() {
            let window_end = char_budget_end(rest, budget);
            if window_end >= rest.len() {
                pieces.push(rest.to_string());
                break;
            }

            let window = &rest[..window_end];
            let cut = match find_cut(window) {
                Some(cut) if cut > 0 => cut,
                _ => window_end,
            };

            pieces.push(rest[..cut].to_string());
            rest = &rest[cut..];
            budget = self.config.chunk_size - self.config.chunk_overlap;
        }

        pieces
    }
}

/// Byte offset after at most `budget` characters.
fn char_budget_end(text: &str, budget: usize) -> usize {
    match text.char_indices().nth(budget) {
        Some((index, _)) => index,
        None => text.len(),
    }
}

/// Best cut position inside the window: paragraph break, then line break,
/// then sentence end, then word boundary.
fn find_cut(window: &str) -> Option<usize> {
    if let Some(pos) = window.rfind("\n\n") {
        return Some(pos + 2);
    }
    if let Some(pos) = window.rfind('\n') {
        return Some(pos + 1);
    }
    if let Some(pos) = sentence_cut(window) {
        return Some(pos);
    }
    window.rfind(' ').map(|pos| pos + 1)
}

/// Position after the last sentence terminator that is followed by
/// whitespace (or ends the window).
fn sentence_cut(window: &str) -> Option<usize> {
    let bytes = window.as_bytes();
    let mut best = None;

    for (i, byte) in bytes.iter().enumerate() {
        if matches!(byte, b'.' | b'!' | b'?')
            && bytes.get(i + 1).map_or(true, u8::is_ascii_whitespace)
        {
            best = Some(i + 1);
        }
    }

    best
}

/// Trailing `overlap` characters of a piece, clamped below the full piece so
/// the overlap never duplicates an entire predecessor.
fn overlap_tail(piece: &str, overlap: usize) -> &str {
    let total = piece.chars().count();
    if total <= 1 || overlap == 0 {
        return "";
    }

    let take = overlap.min(total - 1);
    let start = piece
        .char_indices()
        .nth(total - take)
        .map_or(0, |(index, _)| index);
    &piece[start..]
}
