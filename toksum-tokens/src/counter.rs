//! Token counter implementations

use crate::error::{Result, TokenError};
use fnv::FnvHashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tiktoken_rs::CoreBPE;

/// Trait for anything that can count the tokens of a text for a named model.
///
/// Counts must be deterministic for a given model and text. Callers size
/// chunks against these numbers and treat them as ground truth, whether the
/// implementation is exact or an estimate.
///
/// Any `Fn(&str, &str) -> Result<usize>` closure taking `(model, text)` is a
/// counter too, which makes it easy to inject a custom strategy:
///
/// ```
/// use toksum_tokens::{Result, TokenCounter};
///
/// let words = |_model: &str, text: &str| -> Result<usize> { Ok(text.split_whitespace().count()) };
/// assert_eq!(words.count("any-model", "three little words").unwrap(), 3);
/// ```
pub trait TokenCounter: Send + Sync {
    /// Count the tokens `text` occupies for `model`
    fn count(&self, model: &str, text: &str) -> Result<usize>;

    /// Whether counts come from the model's real tokenizer
    fn is_exact(&self) -> bool {
        false
    }

    /// Get the name/identifier of this counter
    fn counter_name(&self) -> &str {
        "custom"
    }
}

impl<F> TokenCounter for F
where
    F: Fn(&str, &str) -> Result<usize> + Send + Sync,
{
    fn count(&self, model: &str, text: &str) -> Result<usize> {
        self(model, text)
    }
}

/// Estimates tokens from the character count of the text.
///
/// Uses `ceil(chars / chars_per_token)`, counting Unicode scalar values rather
/// than bytes so multi-byte text is not over-counted. Empty text is 0 tokens.
#[derive(Debug, Clone)]
pub struct ApproximateCounter {
    chars_per_token: f64,
}

impl ApproximateCounter {
    /// Create an approximate counter with the given characters-per-token ratio.
    pub fn new(chars_per_token: f64) -> Result<Self> {
        if !chars_per_token.is_finite() || chars_per_token <= 0.0 {
            return Err(TokenError::invalid_config(format!(
                "chars_per_token must be a positive number, got {chars_per_token}"
            )));
        }
        Ok(Self { chars_per_token })
    }

    /// Estimate tokens for a piece of text, independent of any model
    pub fn estimate(&self, text: &str) -> usize {
        let chars = text.chars().count();
        if chars == 0 {
            return 0;
        }
        (chars as f64 / self.chars_per_token).ceil() as usize
    }
}

impl Default for ApproximateCounter {
    fn default() -> Self {
        Self {
            chars_per_token: 4.0,
        }
    }
}

impl TokenCounter for ApproximateCounter {
    fn count(&self, _model: &str, text: &str) -> Result<usize> {
        Ok(self.estimate(text))
    }

    fn counter_name(&self) -> &str {
        "approximate"
    }
}

/// BPE encodings used by OpenAI models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// GPT-4o, GPT-4.1 and the o-series
    O200kBase,
    /// GPT-4, GPT-3.5 and the text-embedding models
    Cl100kBase,
    /// text-davinci-002/003 and Codex
    P50kBase,
    /// The edit models
    P50kEdit,
    /// GPT-3 base models
    R50kBase,
}

// Matched against the lowercased model name in order; the first prefix wins.
// Every OpenAI model name is defined by this table.
const OPENAI_PREFIXES: &[(&str, Encoding)] = &[
    ("gpt-4o", Encoding::O200kBase),
    ("gpt-4.1", Encoding::O200kBase),
    ("chatgpt-", Encoding::O200kBase),
    ("o1", Encoding::O200kBase),
    ("o3", Encoding::O200kBase),
    ("o4", Encoding::O200kBase),
    ("gpt-4", Encoding::Cl100kBase),
    ("gpt-3.5", Encoding::Cl100kBase),
    ("gpt-35", Encoding::Cl100kBase),
    ("text-embedding-", Encoding::Cl100kBase),
    ("text-davinci-edit-", Encoding::P50kEdit),
    ("code-davinci-edit-", Encoding::P50kEdit),
    ("text-davinci-001", Encoding::R50kBase),
    ("text-davinci-", Encoding::P50kBase),
    ("code-", Encoding::P50kBase),
    ("davinci", Encoding::R50kBase),
    ("curie", Encoding::R50kBase),
    ("babbage", Encoding::R50kBase),
    ("ada", Encoding::R50kBase),
    // Newer GPT releases share the latest encoding
    ("gpt-", Encoding::O200kBase),
];

impl Encoding {
    /// Pick the encoding an OpenAI model name uses, or `None` if it is not an OpenAI model.
    ///
    /// [`ModelFamily::detect`](crate::ModelFamily::detect) classifies a name as
    /// OpenAI exactly when this returns `Some`.
    pub fn for_model(model: &str) -> Option<Encoding> {
        let model = model.trim().to_lowercase();
        OPENAI_PREFIXES
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
            .map(|(_, encoding)| *encoding)
    }

    /// Name of the encoding as published by OpenAI
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::O200kBase => "o200k_base",
            Encoding::Cl100kBase => "cl100k_base",
            Encoding::P50kBase => "p50k_base",
            Encoding::P50kEdit => "p50k_edit",
            Encoding::R50kBase => "r50k_base",
        }
    }

    fn load(&self) -> Result<CoreBPE> {
        let loaded = match self {
            Encoding::O200kBase => tiktoken_rs::o200k_base(),
            Encoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            Encoding::P50kBase => tiktoken_rs::p50k_base(),
            Encoding::P50kEdit => tiktoken_rs::p50k_edit(),
            Encoding::R50kBase => tiktoken_rs::r50k_base(),
        };
        loaded.map_err(|e| TokenError::encoding(self.name(), e))
    }
}

/// Global cache for loaded encodings to avoid rebuilding BPE tables
static ENCODER_CACHE: OnceLock<Mutex<FnvHashMap<Encoding, Arc<CoreBPE>>>> = OnceLock::new();

/// Get the global encoder cache
fn get_encoder_cache() -> &'static Mutex<FnvHashMap<Encoding, Arc<CoreBPE>>> {
    ENCODER_CACHE.get_or_init(|| Mutex::new(FnvHashMap::default()))
}

/// Fetch an encoding from the cache, loading it on first use
fn encoder(encoding: Encoding) -> Result<Arc<CoreBPE>> {
    if let Some(bpe) = get_encoder_cache()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&encoding)
    {
        return Ok(Arc::clone(bpe));
    }

    // Load outside the lock; a concurrent loader just wins the insert race
    tracing::info!("Loading BPE encoding: {}", encoding.name());
    let bpe = Arc::new(encoding.load()?);

    let mut cache = get_encoder_cache()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(cache.entry(encoding).or_insert(bpe)))
}

/// Exact token counts for OpenAI models using their BPE encodings.
#[derive(Debug, Clone, Default)]
pub struct TiktokenCounter;

impl TiktokenCounter {
    pub fn new() -> Self {
        Self
    }

    /// Count tokens of `text` under a specific encoding
    pub fn count_with(&self, encoding: Encoding, text: &str) -> Result<usize> {
        if text.is_empty() {
            return Ok(0);
        }
        let bpe = encoder(encoding)?;
        Ok(bpe.encode_with_special_tokens(text).len())
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, model: &str, text: &str) -> Result<usize> {
        let encoding =
            Encoding::for_model(model).ok_or_else(|| TokenError::unsupported_model(model))?;
        self.count_with(encoding, text)
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn counter_name(&self) -> &str {
        "tiktoken"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_estimates() {
        let counter = ApproximateCounter::default();
        assert_eq!(counter.estimate(""), 0);
        assert_eq!(counter.estimate("test"), 1);
        assert_eq!(counter.estimate("test test"), 3); // 9 chars, rounded up
        assert_eq!(counter.estimate(&"x".repeat(8000)), 2000);
    }

    #[test]
    fn test_approximate_counts_chars_not_bytes() {
        let counter = ApproximateCounter::default();
        // 8 chars, 24 bytes
        assert_eq!(counter.estimate("世界世界世界世界"), 2);
    }

    #[test]
    fn test_approximate_rejects_bad_ratio() {
        assert!(ApproximateCounter::new(0.0).is_err());
        assert!(ApproximateCounter::new(-2.0).is_err());
        assert!(ApproximateCounter::new(3.0).is_ok());
    }

    #[test]
    fn test_closure_counter() {
        let counter = |model: &str, text: &str| {
            if model == "broken" {
                Err(TokenError::unsupported_model(model))
            } else {
                Ok(text.len())
            }
        };
        assert_eq!(counter.count("m", "abc").unwrap(), 3);
        assert!(counter.count("broken", "abc").is_err());
        assert!(!counter.is_exact());
    }

    #[test]
    fn test_encoding_for_model() {
        let test_cases = vec![
            ("gpt-4", Some(Encoding::Cl100kBase)),
            ("gpt-4-turbo", Some(Encoding::Cl100kBase)),
            ("gpt-3.5-turbo", Some(Encoding::Cl100kBase)),
            ("text-embedding-ada-002", Some(Encoding::Cl100kBase)),
            ("gpt-4o", Some(Encoding::O200kBase)),
            ("gpt-4o-mini", Some(Encoding::O200kBase)),
            ("o1-mini", Some(Encoding::O200kBase)),
            ("text-davinci-003", Some(Encoding::P50kBase)),
            ("code-davinci-002", Some(Encoding::P50kBase)),
            ("text-davinci-001", Some(Encoding::R50kBase)),
            ("text-davinci-edit-001", Some(Encoding::P50kEdit)),
            ("chatgpt-4o-latest", Some(Encoding::O200kBase)),
            ("davinci", Some(Encoding::R50kBase)),
            ("gpt-5", Some(Encoding::O200kBase)),
            ("claude-3-haiku", None),
        ];

        for (model, expected) in test_cases {
            assert_eq!(Encoding::for_model(model), expected, "Failed for {model}");
        }
    }

    #[test]
    fn test_tiktoken_counts() {
        let counter = TiktokenCounter::new();
        assert_eq!(counter.count("gpt-4", "").unwrap(), 0);
        assert_eq!(counter.count("gpt-4", "hello world").unwrap(), 2);
        assert!(counter.is_exact());
    }

    #[test]
    fn test_tiktoken_is_deterministic() {
        let counter = TiktokenCounter::new();
        let text = "Natural language processing is a subfield of linguistics.";
        let first = counter.count("gpt-3.5-turbo", text).unwrap();
        let second = counter.count("gpt-3.5-turbo", text).unwrap();
        assert_eq!(first, second);
        assert!(first > 0);
    }

    #[test]
    fn test_tiktoken_counts_every_openai_name() {
        let counter = TiktokenCounter::new();
        for model in ["text-davinci-edit-001", "code-davinci-edit-001", "chatgpt-4o-latest", "ada"] {
            assert!(counter.count(model, "hello world").unwrap() > 0, "Failed for {model}");
        }
    }

    #[test]
    fn test_tiktoken_rejects_other_families() {
        let counter = TiktokenCounter::new();
        let err = counter.count("claude-3-opus", "hello").unwrap_err();
        assert!(matches!(err, TokenError::UnsupportedModel { .. }));
    }
}
