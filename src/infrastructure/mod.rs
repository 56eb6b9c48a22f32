//! Infrastructure layer: configuration, logging, corpus ingestion, and the
//! LLM backend client.

pub mod config;
pub mod groq;
pub mod knowledge;
pub mod logging;
