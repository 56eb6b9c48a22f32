//! Chat-completions backend infrastructure
//!
//! HTTP client, wire types, and SSE stream parsing for an OpenAI-compatible
//! chat-completions API (Groq in the default configuration).

pub mod client;
pub mod streaming;
pub mod types;

pub use client::GroqClient;
pub use streaming::SseDataStream;
