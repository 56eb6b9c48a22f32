use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port: 0")]
    InvalidPort,

    #[error("Primary knowledge document path cannot be empty")]
    EmptyPrimaryPath,

    #[error("Invalid chunk_size: {0}. Must be positive")]
    InvalidChunkSize(usize),

    #[error("Invalid chunk_overlap: {0}. Must be smaller than chunk_size ({1})")]
    InvalidChunkOverlap(usize, usize),

    #[error("Invalid temperature: {0}. Must be within 0.0..=2.0")]
    InvalidTemperature(f32),

    #[error("Invalid timeout_secs: 0. Must be positive")]
    InvalidTimeout,

    #[error("Assistant intro line cannot be empty")]
    EmptyIntro,

    #[error("Assistant fallback sentence cannot be empty")]
    EmptyFallback,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. ragline.yaml (project config)
    /// 3. ragline.local.yaml (local overrides, optional)
    /// 4. Environment variables (RAGLINE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::finish(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file("ragline.yaml"))
                .merge(Yaml::file("ragline.local.yaml"))
                .merge(Env::prefixed("RAGLINE_").split("__")),
        )
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        Self::finish(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Yaml::file(path.as_ref())),
        )
    }

    fn finish(figment: Figment) -> Result<Config> {
        let mut config: Config = figment
            .extract()
            .context("Failed to extract configuration from figment")?;

        // The original deployment keys the backend off GROQ_API_KEY; honor
        // it when the config carries no key of its own.
        if config.llm.api_key.is_empty() {
            if let Ok(key) = std::env::var("GROQ_API_KEY") {
                config.llm.api_key = key;
            }
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if config.knowledge.primary_path.is_empty() {
            return Err(ConfigError::EmptyPrimaryPath);
        }

        if config.knowledge.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(config.knowledge.chunk_size));
        }

        if config.knowledge.chunk_overlap >= config.knowledge.chunk_size {
            return Err(ConfigError::InvalidChunkOverlap(
                config.knowledge.chunk_overlap,
                config.knowledge.chunk_size,
            ));
        }

        for temperature in [
            config.llm.classifier_temperature,
            config.llm.responder_temperature,
        ] {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidTemperature(temperature));
            }
        }

        if config.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        if config.assistant.intro.trim().is_empty() {
            return Err(ConfigError::EmptyIntro);
        }

        if config.assistant.fallback.trim().is_empty() {
            return Err(ConfigError::EmptyFallback);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        Ok(())
    }
}
