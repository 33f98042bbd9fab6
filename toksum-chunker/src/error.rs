//! Error types for chunking

use toksum_tokens::TokenError;

/// Result type for chunking operations.
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Error type for all chunking operations.
///
/// # Error Categories
///
/// - **Configuration Errors**: a zero token budget or an unreadable config file.
///   Fatal, reported at construction time.
/// - **Language Support**: a language without a declaration rule. Only the
///   code splitter returns it; [`crate::SmartChunker::chunk_code`] recovers by
///   chunking paragraphs instead.
/// - **Counter Errors**: failures of the token counter, passed through unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The chunker configuration is invalid (e.g. `max_tokens` is zero)
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// No top-level declaration rule exists for this language
    #[error("Unsupported language for code splitting: {language}")]
    UnsupportedLanguage { language: String },

    /// The token counter failed (e.g. unknown model name)
    #[error(transparent)]
    Counter {
        #[from]
        source: TokenError,
    },

    /// A TOML configuration document could not be parsed
    #[error("Failed to parse configuration: {source}")]
    ConfigParse {
        #[from]
        source: toml::de::Error,
    },

    /// IO errors when reading configuration files
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ChunkError {
    /// Create an invalid configuration error with a custom message.
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an unsupported language error for the given language name.
    pub fn unsupported_language<S: Into<String>>(language: S) -> Self {
        Self::UnsupportedLanguage {
            language: language.into(),
        }
    }
}
