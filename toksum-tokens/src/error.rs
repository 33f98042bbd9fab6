//! Error types for token counting

/// Result type for token counting operations.
///
/// This is a convenience type alias that uses [`TokenError`] as the error type.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Error type for all token counting operations.
///
/// Covers the ways a count can fail: a model name no registered strategy
/// understands, a BPE encoding that could not be loaded, or a counter built
/// from invalid settings. Chunkers never recover from these; they hand them
/// back to their caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The model name does not belong to any known model family
    #[error("Unsupported model: {model}")]
    UnsupportedModel { model: String },

    /// A BPE encoding failed to load
    #[error("Failed to load encoding {encoding}: {source}")]
    Encoding {
        encoding: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Error when counter configuration is invalid
    #[error("Invalid counter configuration: {message}")]
    InvalidConfig { message: String },
}

impl TokenError {
    /// Create an unsupported model error for the given model name.
    pub fn unsupported_model<S: Into<String>>(model: S) -> Self {
        Self::UnsupportedModel {
            model: model.into(),
        }
    }

    /// Wrap a failure to load a named BPE encoding.
    pub fn encoding(encoding: &'static str, source: anyhow::Error) -> Self {
        Self::Encoding { encoding, source }
    }

    /// Create an invalid configuration error with a custom message.
    ///
    /// # Arguments
    /// * `message` - A descriptive error message explaining what's wrong with the configuration
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TokenError::unsupported_model("mystery-9000");
        assert_eq!(err.to_string(), "Unsupported model: mystery-9000");

        let err = TokenError::invalid_config("chars_per_token must be positive");
        assert!(err.to_string().contains("chars_per_token must be positive"));

        let err = TokenError::encoding("cl100k_base", anyhow::anyhow!("missing ranks"));
        assert!(err.to_string().contains("cl100k_base"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
