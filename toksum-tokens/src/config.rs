//! Configuration for token counters

use crate::error::{Result, TokenError};
use derive_builder::Builder;

/// Settings shared by the counters in a [`crate::TokenCounterRegistry`].
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct CounterConfig {
    /// Average characters per token used by approximate counting
    #[builder(default = "4.0")]
    pub chars_per_token: f64,
    /// Count OpenAI models with their real BPE encoding instead of approximating
    #[builder(default = "true")]
    pub exact_openai: bool,
}

impl CounterConfig {
    /// Create a new counter configuration using the builder
    pub fn builder() -> CounterConfigBuilder {
        CounterConfigBuilder::default()
    }

    /// Configuration that approximates every model family, OpenAI included.
    ///
    /// Useful where loading BPE tables is too slow or the exact numbers do not matter.
    pub fn approximate_only() -> Self {
        Self {
            exact_openai: false,
            ..Self::default()
        }
    }

    /// Check that the settings can produce meaningful counts
    pub fn validate(&self) -> Result<()> {
        if !self.chars_per_token.is_finite() || self.chars_per_token <= 0.0 {
            return Err(TokenError::invalid_config(format!(
                "chars_per_token must be a positive number, got {}",
                self.chars_per_token
            )));
        }
        Ok(())
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            chars_per_token: 4.0,
            exact_openai: true,
        }
    }
}
