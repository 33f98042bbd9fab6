//! # toksum-tokens
//!
//! Model-aware token counting. A model name is mapped to a counting strategy:
//! exact BPE counts for OpenAI models and a character-ratio approximation for
//! the other model families.
//!
//! ## Quick Start
//!
//! ```
//! use toksum_tokens::{CounterConfig, TokenCounter, TokenCounterRegistry, count_tokens};
//!
//! // Shortcut over the shared default registry
//! let tokens = count_tokens("gpt-4", "Hello, world!").unwrap();
//! assert!(tokens > 0);
//!
//! // A registry with custom settings
//! let registry = TokenCounterRegistry::new(&CounterConfig::approximate_only()).unwrap();
//! assert_eq!(registry.count("claude-3-haiku-20240307", "Hello, world!").unwrap(), 4);
//! ```
//!
//! ## Architecture
//!
//! - [`counter`]: The [`TokenCounter`] trait and its exact and approximate implementations
//! - [`family`]: Detection of the [`ModelFamily`] a model name belongs to
//! - [`registry`]: Family-keyed dispatch and the [`count_tokens`] shortcut
//! - [`message`]: [`ChatMessage`] for counting whole conversations
//! - [`config`]: Counter settings
//! - [`error`]: Error types and result handling
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`] using the crate's [`TokenError`] type.
//! Unknown model names are reported as [`TokenError::UnsupportedModel`] rather
//! than silently approximated.

pub mod config;
pub mod counter;
pub mod error;
pub mod family;
pub mod message;
pub mod registry;

// Re-export main types for easy access
pub use config::{CounterConfig, CounterConfigBuilder};
pub use counter::{ApproximateCounter, Encoding, TiktokenCounter, TokenCounter};
pub use error::{Result, TokenError};
pub use family::ModelFamily;
pub use message::ChatMessage;
pub use registry::{
    TokenCounterRegistry, count_messages, count_tokens, default_registry, supported_models,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = TokenCounterRegistry::new(&CounterConfig::default()).unwrap();
        assert_eq!(registry.supported_families().len(), ModelFamily::ALL.len());

        let tokens = registry.count("gpt-3.5-turbo", "count the words").unwrap();
        assert_eq!(tokens, count_tokens("gpt-3.5-turbo", "count the words").unwrap());
    }
}
