//! Domain errors for the ragline chat service.

use thiserror::Error;

/// Domain-level errors that can occur while ingesting knowledge or
/// answering a chat request.
#[derive(Debug, Error)]
pub enum ChatError {
    /// A knowledge document could not be parsed. Recoverable for
    /// supplementary files (the file is skipped), fatal for the primary
    /// document.
    #[error("Malformed knowledge document '{source_name}': {detail}")]
    Parse { source_name: String, detail: String },

    /// The similarity index was queried before it was built. Fatal to the
    /// triggering request, never retried.
    #[error("Knowledge index is not ready")]
    IndexNotReady,

    /// A classifier or generator call failed. Terminal for the request;
    /// partial output already emitted is not retracted.
    #[error("Language model call failed: {0}")]
    Generation(String),

    /// The receiving client went away mid-stream. A cancellation signal,
    /// not a failure.
    #[error("Client disconnected")]
    Disconnected,
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    /// Build a parse error for a named knowledge source.
    pub fn parse(source_name: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        ChatError::Parse {
            source_name: source_name.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Generation(err.to_string())
    }
}
