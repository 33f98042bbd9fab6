//! Configuration for chunkers

use crate::error::{ChunkError, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Model name used when a configuration does not name one
pub const DEFAULT_MODEL: &str = "gpt-4";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Settings for a chunker: which model's tokenizer sizes the chunks, and the
/// budget each chunk must stay within.
///
/// Every way of obtaining a config validates it, so a zero budget never gets
/// as far as a chunker.
///
/// ```
/// use toksum_chunker::ChunkerConfig;
///
/// let config = ChunkerConfig::builder()
///     .model("claude-3-haiku-20240307")
///     .max_tokens(512usize)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 512);
///
/// assert!(ChunkerConfig::new("gpt-4", 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate_budget"))]
pub struct ChunkerConfig {
    /// Model whose token counter measures chunks
    #[builder(setter(into), default = "default_model()")]
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens per chunk; must be positive
    pub max_tokens: usize,
}

impl ChunkerConfigBuilder {
    fn validate_budget(&self) -> std::result::Result<(), String> {
        match self.max_tokens {
            Some(0) => Err("max_tokens must be positive".to_string()),
            _ => Ok(()),
        }
    }
}

impl ChunkerConfig {
    /// Create a new chunker configuration using the builder
    pub fn builder() -> ChunkerConfigBuilder {
        ChunkerConfigBuilder::default()
    }

    /// Create a validated configuration (convenience method)
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Result<Self> {
        ChunkerConfigBuilder::default()
            .model(model)
            .max_tokens(max_tokens)
            .build()
            .map_err(|e| ChunkError::invalid_config(e.to_string()))
    }

    /// Parse and validate a configuration from a TOML document.
    ///
    /// `model` is optional and defaults to [`DEFAULT_MODEL`]:
    ///
    /// ```toml
    /// model = "gpt-4"
    /// max_tokens = 256
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: ChunkerConfig = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading chunker configuration from {}", path.display());
        let document = std::fs::read_to_string(path)?;
        Self::from_toml_str(&document)
    }

    /// Check the invariants every chunker relies on
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(ChunkError::invalid_config("max_tokens must be positive"));
        }
        Ok(())
    }
}
