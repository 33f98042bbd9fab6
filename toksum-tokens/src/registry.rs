//! Model-name to counting-strategy dispatch

use crate::config::CounterConfig;
use crate::counter::{ApproximateCounter, TiktokenCounter, TokenCounter};
use crate::error::{Result, TokenError};
use crate::family::ModelFamily;
use crate::message::{ChatMessage, REPLY_PRIMING_TOKENS, TOKENS_PER_MESSAGE, TOKENS_PER_NAME};
use fnv::FnvHashMap;
use std::sync::{Arc, OnceLock};

/// Dispatch table from model family to token counter.
///
/// A model name is first classified into a [`ModelFamily`], then counted with
/// the strategy registered for that family. OpenAI models get exact BPE
/// counts by default; every other family is approximated.
pub struct TokenCounterRegistry {
    /// Family -> counter mapping
    counters: FnvHashMap<ModelFamily, Arc<dyn TokenCounter>>,
}

impl std::fmt::Debug for TokenCounterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<_> = self
            .counters
            .iter()
            .map(|(family, counter)| (family.as_str(), counter.counter_name()))
            .collect();
        families.sort_unstable();
        f.debug_struct("TokenCounterRegistry")
            .field("counters", &families)
            .finish()
    }
}

impl TokenCounterRegistry {
    /// Build a registry covering every known family from the given settings.
    pub fn new(config: &CounterConfig) -> Result<Self> {
        config.validate()?;

        let approximate = ApproximateCounter::new(config.chars_per_token)?;
        let counters = build_counters(approximate, config.exact_openai);

        tracing::debug!(
            "Token counter registry ready (exact_openai: {}, chars_per_token: {})",
            config.exact_openai,
            config.chars_per_token
        );

        Ok(Self { counters })
    }

    /// Register (or replace) the counter used for a family
    pub fn register(&mut self, family: ModelFamily, counter: impl TokenCounter + 'static) {
        self.counters.insert(family, Arc::new(counter));
    }

    /// Select the counter responsible for a model name
    ///
    /// Fails with [`TokenError::UnsupportedModel`] if the name matches no
    /// family or its family has no registered counter.
    pub fn select(&self, model: &str) -> Result<&dyn TokenCounter> {
        ModelFamily::detect(model)
            .and_then(|family| self.counters.get(&family))
            .map(|counter| &**counter)
            .ok_or_else(|| TokenError::unsupported_model(model))
    }

    /// Count tokens for several texts with the same model.
    ///
    /// # Examples
    /// ```
    /// use toksum_tokens::{CounterConfig, TokenCounterRegistry};
    ///
    /// let registry = TokenCounterRegistry::new(&CounterConfig::approximate_only()).unwrap();
    /// let texts = ["def python():", "This is a test", "count the words"];
    /// let counts = registry.count_batch("gemini-1.5-pro", &texts).unwrap();
    /// assert_eq!(counts, vec![4, 4, 4]);
    /// ```
    pub fn count_batch<S: AsRef<str>>(&self, model: &str, texts: &[S]) -> Result<Vec<usize>> {
        let counter = self.select(model)?;
        texts
            .iter()
            .map(|text| counter.count(model, text.as_ref()))
            .collect()
    }

    /// Count the tokens a chat conversation occupies for `model`.
    ///
    /// Each message costs [`TOKENS_PER_MESSAGE`] plus its role and content
    /// (and [`TOKENS_PER_NAME`] plus the name when present); the reply priming
    /// adds [`REPLY_PRIMING_TOKENS`] once. The same framing is applied to every
    /// family, so non-OpenAI totals are as approximate as their text counts.
    /// An empty conversation is 0 tokens.
    ///
    /// # Examples
    /// ```
    /// use toksum_tokens::{ChatMessage, CounterConfig, TokenCounterRegistry};
    ///
    /// let registry = TokenCounterRegistry::new(&CounterConfig::approximate_only()).unwrap();
    /// let messages = [ChatMessage::user("Hello, world!")];
    /// // 3 framing + 1 role + 4 content + 3 priming
    /// assert_eq!(registry.count_messages("claude-3-haiku-20240307", &messages).unwrap(), 11);
    /// ```
    pub fn count_messages(&self, model: &str, messages: &[ChatMessage]) -> Result<usize> {
        if messages.is_empty() {
            return Ok(0);
        }

        let counter = self.select(model)?;
        let mut total = REPLY_PRIMING_TOKENS;
        for message in messages {
            total += TOKENS_PER_MESSAGE
                + counter.count(model, &message.role)?
                + counter.count(model, &message.content)?;
            if let Some(name) = &message.name {
                total += TOKENS_PER_NAME + counter.count(model, name)?;
            }
        }

        tracing::trace!(
            "Counted {} chat messages for {}: {} tokens",
            messages.len(),
            model,
            total
        );
        Ok(total)
    }

    /// Well-known model names for every family that has a counter
    pub fn supported_models(&self) -> Vec<(ModelFamily, &'static [&'static str])> {
        self.supported_families()
            .into_iter()
            .map(|family| (family, family.known_models()))
            .collect()
    }

    /// Families that currently have a counter, in detection order
    pub fn supported_families(&self) -> Vec<ModelFamily> {
        ModelFamily::ALL
            .into_iter()
            .filter(|family| self.counters.contains_key(family))
            .collect()
    }

    /// Whether counts for this model come from its real tokenizer
    pub fn is_exact_for(&self, model: &str) -> bool {
        self.select(model).map(|c| c.is_exact()).unwrap_or(false)
    }
}

impl TokenCounter for TokenCounterRegistry {
    fn count(&self, model: &str, text: &str) -> Result<usize> {
        self.select(model)?.count(model, text)
    }

    fn counter_name(&self) -> &str {
        "registry"
    }
}

/// Shared registry with default settings, built on first use
static DEFAULT_REGISTRY: OnceLock<TokenCounterRegistry> = OnceLock::new();

/// Get the process-wide default registry
pub fn default_registry() -> &'static TokenCounterRegistry {
    DEFAULT_REGISTRY.get_or_init(|| TokenCounterRegistry {
        counters: build_counters(ApproximateCounter::default(), true),
    })
}

fn build_counters(
    approximate: ApproximateCounter,
    exact_openai: bool,
) -> FnvHashMap<ModelFamily, Arc<dyn TokenCounter>> {
    let approximate: Arc<dyn TokenCounter> = Arc::new(approximate);
    let mut counters = FnvHashMap::default();
    for family in ModelFamily::ALL {
        counters.insert(family, Arc::clone(&approximate));
    }
    if exact_openai {
        counters.insert(ModelFamily::OpenAi, Arc::new(TiktokenCounter::new()));
    }
    counters
}

/// Count the tokens of `text` for `model` using the default registry.
///
/// # Examples
/// ```
/// use toksum_tokens::count_tokens;
///
/// let tokens = count_tokens("claude-3-opus-20240229", "Hello, world!").unwrap();
/// assert_eq!(tokens, 4);
/// assert!(count_tokens("unknown-model", "Hello").is_err());
/// ```
pub fn count_tokens(model: &str, text: &str) -> Result<usize> {
    default_registry().count(model, text)
}

/// Count the tokens of a chat conversation for `model` using the default registry.
pub fn count_messages(model: &str, messages: &[ChatMessage]) -> Result<usize> {
    default_registry().count_messages(model, messages)
}

/// Well-known model names per family, as supported by the default registry.
pub fn supported_models() -> Vec<(ModelFamily, &'static [&'static str])> {
    default_registry().supported_models()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approximate_registry() -> TokenCounterRegistry {
        TokenCounterRegistry::new(&CounterConfig::approximate_only()).unwrap()
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let registry = approximate_registry();
        let err = registry.count("mystery-model", "hello").unwrap_err();
        assert!(matches!(err, TokenError::UnsupportedModel { ref model } if model == "mystery-model"));
    }

    #[test]
    fn test_all_families_supported() {
        let registry = approximate_registry();
        assert_eq!(registry.supported_families(), ModelFamily::ALL.to_vec());
    }

    #[test]
    fn test_openai_uses_tiktoken_by_default() {
        let registry = TokenCounterRegistry::new(&CounterConfig::default()).unwrap();
        assert!(registry.is_exact_for("gpt-4"));
        assert!(!registry.is_exact_for("claude-3-sonnet-20240229"));
        assert!(!registry.is_exact_for("mystery-model"));
        assert_eq!(registry.select("gpt-4").unwrap().counter_name(), "tiktoken");
    }

    #[test]
    fn test_approximate_only_config() {
        let registry = approximate_registry();
        assert!(!registry.is_exact_for("gpt-4"));
        // 12 chars at 4 chars per token
        assert_eq!(registry.count("gpt-4", "Hello world!").unwrap(), 3);
    }

    #[test]
    fn test_register_overrides_family() {
        let mut registry = approximate_registry();
        registry.register(
            ModelFamily::Anthropic,
            |_model: &str, text: &str| -> Result<usize> { Ok(text.split_whitespace().count()) },
        );
        assert_eq!(registry.count("claude-3-haiku", "one two three").unwrap(), 3);
        // Other families keep their counter
        assert_eq!(registry.count("gemini-pro", "one two three").unwrap(), 4);
    }

    #[test]
    fn test_count_batch() {
        let registry = approximate_registry();
        let texts = vec!["a".to_string(), "abcde".to_string(), String::new()];
        assert_eq!(registry.count_batch("mistral-large", &texts).unwrap(), vec![1, 2, 0]);
        assert!(registry.count_batch("mystery", &texts).is_err());
    }

    #[test]
    fn test_count_messages_framing() {
        let registry = approximate_registry();
        let messages = vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("Hello, world!").with_name("alice"),
        ];
        // system: 3 + 2 + 3; user: 3 + 1 + 4 + (1 + 2); priming: 3
        assert_eq!(registry.count_messages("claude-3-opus", &messages).unwrap(), 22);
        assert_eq!(registry.count_messages("claude-3-opus", &[]).unwrap(), 0);
    }

    #[test]
    fn test_count_messages_exact_for_openai() {
        let messages = [ChatMessage::user("hello world")];
        // 3 framing + "user" (1) + "hello world" (2) + 3 priming
        assert_eq!(count_messages("gpt-4", &messages).unwrap(), 9);
        assert!(matches!(
            count_messages("mystery-model", &messages),
            Err(TokenError::UnsupportedModel { .. })
        ));
    }

    #[test]
    fn test_supported_models_follow_registered_families() {
        let mut registry = approximate_registry();
        registry.counters.remove(&ModelFamily::Cohere);

        let models = registry.supported_models();
        assert_eq!(models.len(), ModelFamily::ALL.len() - 1);
        assert!(models.iter().all(|(family, _)| *family != ModelFamily::Cohere));
        let (_, anthropic) = models
            .iter()
            .find(|(family, _)| *family == ModelFamily::Anthropic)
            .unwrap();
        assert!(anthropic.contains(&"claude-3-opus-20240229"));

        assert_eq!(supported_models().len(), ModelFamily::ALL.len());
    }

    #[test]
    fn test_exact_families_can_count_their_names() {
        let registry = TokenCounterRegistry::new(&CounterConfig::default()).unwrap();
        for model in ["text-davinci-edit-001", "chatgpt-4o-latest", "gpt-4"] {
            assert!(registry.is_exact_for(model), "Failed for {model}");
            assert!(registry.count(model, "hello world").is_ok(), "Failed for {model}");
        }
        for model in ModelFamily::OpenAi.known_models() {
            assert!(registry.count(model, "hello world").is_ok(), "Failed for {model}");
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CounterConfig {
            chars_per_token: 0.0,
            exact_openai: true,
        };
        assert!(TokenCounterRegistry::new(&config).is_err());
    }

    #[test]
    fn test_count_tokens_default_registry() {
        assert_eq!(count_tokens("gpt-4", "hello world").unwrap(), 2);
        assert_eq!(count_tokens("gemini-1.5-pro", "").unwrap(), 0);
        assert!(matches!(
            count_tokens("", "text"),
            Err(TokenError::UnsupportedModel { .. })
        ));
    }
}
