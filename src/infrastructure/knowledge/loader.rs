//! Knowledge corpus ingestion.
//!
//! Reads the mandatory primary JSON document plus an optional directory of
//! supplementary files, flattens structured inputs into text, chunks
//! everything, and builds the similarity index. Runs once at startup, before
//! the server accepts traffic.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::errors::ChatError;
use crate::domain::models::{ChunkMetadata, DocumentInput, KnowledgeConfig};
use crate::infrastructure::knowledge::flatten::flatten_json;
use crate::services::chunker::{Chunker, ChunkerConfig};
use crate::services::embedding::HashedEmbedder;
use crate::services::vector_index::VectorIndex;

const SUPPORTED_EXTENSIONS: [&str; 3] = ["json", "txt", "md"];

/// Load all knowledge documents.
///
/// The primary document is mandatory: any failure there aborts startup. The
/// supplementary directory is best-effort: a missing directory means "no
/// extra files", and an unreadable or malformed file is logged and skipped
/// while ingestion continues.
pub fn load_documents(config: &KnowledgeConfig) -> Result<Vec<DocumentInput>> {
    let primary = Path::new(&config.primary_path);
    let data_root = primary.parent().unwrap_or_else(|| Path::new("."));

    let mut documents = Vec::new();
    documents.push(document_from_file(data_root, primary).with_context(|| {
        format!(
            "failed to load primary knowledge document {}",
            primary.display()
        )
    })?);

    for path in supplementary_files(Path::new(&config.extra_dir)) {
        match document_from_file(data_root, &path) {
            Ok(document) => documents.push(document),
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "skipping knowledge file");
            }
        }
    }

    Ok(documents)
}

/// Chunk and embed the corpus into a ready similarity index.
pub fn initialize_knowledge_base(config: &KnowledgeConfig) -> Result<VectorIndex> {
    let chunker = Chunker::with_config(ChunkerConfig {
        chunk_size: config.chunk_size,
        chunk_overlap: config.chunk_overlap,
    })?;

    let documents = load_documents(config)?;

    let mut chunks = Vec::new();
    for document in &documents {
        chunks.extend(chunker.split_document(document));
    }

    let index = VectorIndex::build(HashedEmbedder::default(), chunks);

    tracing::info!(
        documents = documents.len(),
        chunks = index.len(),
        "knowledge base initialized"
    );

    Ok(index)
}

/// Read one file into a document with provenance metadata.
///
/// JSON files are flattened into `"path: value"` lines with underscores
/// rendered as spaces; everything else is taken verbatim.
fn document_from_file(data_root: &Path, path: &Path) -> Result<DocumentInput, ChatError> {
    let source = source_id(data_root, path);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let raw =
        fs::read_to_string(path).map_err(|err| ChatError::parse(source.as_str(), err))?;

    if extension == "json" {
        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|err| ChatError::parse(source.as_str(), err))?;

        let text = flatten_json(&value)
            .iter()
            .map(|line| line.replace('_', " "))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(DocumentInput::new(text, ChunkMetadata::new(source, "json")))
    } else {
        Ok(DocumentInput::new(
            raw,
            ChunkMetadata::new(source, extension),
        ))
    }
}

/// Stable origin identifier: path relative to the data root, forward
/// slashes.
fn source_id(data_root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(data_root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Supported files in the supplementary directory, sorted for a
/// deterministic ingestion order. A missing or unreadable directory is
/// treated as empty.
fn supplementary_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::debug!(dir = %dir.display(), error = %err, "no supplementary knowledge directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_supported_extension(path))
        .collect();

    files.sort();
    files
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}
