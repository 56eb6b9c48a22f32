use serde::{Deserialize, Serialize};

/// Main configuration structure for ragline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Knowledge corpus ingestion configuration
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Language model backend configuration
    #[serde(default)]
    pub llm: LlmConfig,

    /// Assistant persona configuration
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. An empty list allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    5001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Knowledge corpus ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KnowledgeConfig {
    /// Path to the mandatory primary JSON document
    #[serde(default = "default_primary_path")]
    pub primary_path: String,

    /// Optional directory of supplementary .json/.txt/.md files
    #[serde(default = "default_extra_dir")]
    pub extra_dir: String,

    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters of overlap carried from the previous chunk
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_primary_path() -> String {
    "data/campus.json".to_string()
}

fn default_extra_dir() -> String {
    "data/knowledge".to_string()
}

const fn default_chunk_size() -> usize {
    700
}

const fn default_chunk_overlap() -> usize {
    120
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            primary_path: default_primary_path(),
            extra_dir: default_extra_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Language model backend configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LlmConfig {
    /// API key. Falls back to the GROQ_API_KEY environment variable.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the chat-completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier used for both classification and generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for the intent classifier
    #[serde(default = "default_classifier_temperature")]
    pub classifier_temperature: f32,

    /// Sampling temperature for the streaming responder
    #[serde(default = "default_responder_temperature")]
    pub responder_temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

const fn default_classifier_temperature() -> f32 {
    0.0
}

const fn default_responder_temperature() -> f32 {
    0.3
}

const fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            classifier_temperature: default_classifier_temperature(),
            responder_temperature: default_responder_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Assistant persona configuration
///
/// These two sentences are fixed per deployment: the intro opens every
/// response stream, and the fallback is the exact sentence emitted (and
/// mandated of the generator) when the corpus holds no answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssistantConfig {
    /// Line identifying the assistant, emitted before any other output
    #[serde(default = "default_intro")]
    pub intro: String,

    /// Exact sentence used when no answer is present in the corpus
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_intro() -> String {
    "I am the official AI assistant for this campus.".to_string()
}

fn default_fallback() -> String {
    "I'm not sure about that. Please contact the college administration.".to_string()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            intro: default_intro(),
            fallback: default_fallback(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
