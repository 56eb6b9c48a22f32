//! Language model port.
//!
//! Abstracts the external LLM backend behind two capabilities: a single-shot
//! classification call and a streaming completion call. The orchestrator only
//! depends on this trait, so tests substitute a scripted implementation and
//! the production adapter speaks an OpenAI-compatible HTTP API.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::domain::errors::ChatResult;

/// Lazy sequence of generated text fragments.
///
/// Fragments arrive in emission order; the first `Err` item is terminal.
/// Dropping the stream aborts any in-flight generation work upstream.
pub type TokenStream = Pin<Box<dyn Stream<Item = ChatResult<String>> + Send>>;

/// Port trait for the LLM backend.
///
/// The two calls carry distinct sampling configuration: classification runs
/// deterministic (temperature 0), generation runs with the responder
/// temperature. Implementations must be `Send + Sync` for concurrent use
/// across requests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Single-shot, non-streaming call. Returns the model's full reply text.
    async fn classify(&self, instruction: &str, message: &str) -> ChatResult<String>;

    /// Streaming call. Returns a lazy token stream; the HTTP request is
    /// issued before this returns, but tokens are pulled on demand.
    async fn stream_reply(&self, instruction: &str, message: &str) -> ChatResult<TokenStream>;
}
