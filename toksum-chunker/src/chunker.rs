//! The token-aware chunker and its sentence, paragraph and code modes.

use crate::assembler::Assembler;
use crate::chunk::{Chunk, UnitKind};
use crate::config::ChunkerConfig;
use crate::error::{ChunkError, Result};
use crate::text;
use std::sync::Arc;
use toksum_tokens::{CounterConfig, TokenCounter, TokenCounterRegistry};

/// Splits text into chunks that fit a model's token budget, breaking only at
/// semantic boundaries.
///
/// Each call is independent: the chunker holds only its configuration and a
/// shared token counter, so one instance can serve many threads.
///
/// # Examples
///
/// ```
/// use toksum_chunker::SmartChunker;
///
/// let chunker = SmartChunker::new("gpt-4", 50).unwrap();
///
/// let text = "First paragraph here.\n\nSecond paragraph here.\n\nThird paragraph here.";
/// let chunks = chunker.chunk_by_paragraphs(text).unwrap();
/// assert_eq!(chunks.len(), 1);
/// assert!(chunks[0].token_count <= 50);
///
/// // No declaration rule for Ruby, so the code is chunked by paragraphs
/// let ruby = "def hello\n  puts 'hi'\nend\n\nhello";
/// assert_eq!(
///     chunker.chunk_code(ruby, "ruby").unwrap(),
///     chunker.chunk_by_paragraphs(ruby).unwrap()
/// );
///
/// assert!(SmartChunker::new("gpt-4", 0).is_err());
/// ```
#[derive(Clone)]
pub struct SmartChunker {
    config: ChunkerConfig,
    counter: Arc<dyn TokenCounter>,
}

impl std::fmt::Debug for SmartChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartChunker")
            .field("config", &self.config)
            .field("counter", &self.counter.counter_name())
            .finish()
    }
}

impl SmartChunker {
    /// Create a chunker for `model` with the default token counter registry.
    ///
    /// Fails with [`ChunkError::InvalidConfiguration`] if `max_tokens` is zero.
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Result<Self> {
        Self::from_config(ChunkerConfig::new(model, max_tokens)?)
    }

    /// Create a chunker from a configuration, counting with the default registry.
    pub fn from_config(config: ChunkerConfig) -> Result<Self> {
        let registry = TokenCounterRegistry::new(&CounterConfig::default())?;
        Self::with_counter(config, registry)
    }

    /// Create a chunker that sizes chunks with a custom token counter.
    pub fn with_counter(config: ChunkerConfig, counter: impl TokenCounter + 'static) -> Result<Self> {
        Self::with_shared_counter(config, Arc::new(counter))
    }

    /// Create a chunker around a counter that is shared with other components.
    pub fn with_shared_counter(
        config: ChunkerConfig,
        counter: Arc<dyn TokenCounter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, counter })
    }

    /// The model whose counter sizes the chunks
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Maximum tokens per chunk
    pub fn max_tokens(&self) -> usize {
        self.config.max_tokens
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk text at sentence boundaries.
    ///
    /// Sentences are packed greedily, joined by single spaces. A sentence that
    /// alone exceeds the budget is returned as its own (oversized) chunk.
    /// Empty input yields no chunks and never calls the counter.
    pub fn chunk_by_sentences(&self, text: &str) -> Result<Vec<Chunk>> {
        let sentences = text::split_sentences(text);
        self.assemble(sentences, UnitKind::Sentence)
    }

    /// Chunk text at paragraph (blank line) boundaries.
    ///
    /// Paragraphs are packed greedily, joined by a blank line; no paragraph is
    /// ever split across chunks.
    pub fn chunk_by_paragraphs(&self, text: &str) -> Result<Vec<Chunk>> {
        let paragraphs = text::split_paragraphs(text);
        self.assemble(paragraphs, UnitKind::Paragraph)
    }

    /// Chunk source code at top-level declaration boundaries.
    ///
    /// Languages without a declaration rule are chunked exactly like
    /// [`SmartChunker::chunk_by_paragraphs`]; an unsupported language is never
    /// reported as an error.
    pub fn chunk_code(&self, code: &str, language: &str) -> Result<Vec<Chunk>> {
        if code.trim().is_empty() {
            return Ok(Vec::new());
        }

        match text::split_code_blocks(language, code) {
            Ok(blocks) => self.assemble(blocks, UnitKind::Code),
            Err(ChunkError::UnsupportedLanguage { language }) => {
                tracing::debug!(
                    "No declaration rule for language '{}', falling back to paragraph chunking",
                    language
                );
                self.chunk_by_paragraphs(code)
            }
            Err(e) => Err(e),
        }
    }

    /// Chunk text at word boundaries
    pub(crate) fn chunk_by_words(&self, text: &str) -> Result<Vec<Chunk>> {
        let words = text::split_words(text);
        self.assemble(words, UnitKind::Word)
    }

    fn assemble(&self, units: Vec<String>, kind: UnitKind) -> Result<Vec<Chunk>> {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let unit_count = units.len();
        let assembler = Assembler::new(&*self.counter, &self.config.model, self.config.max_tokens);
        let chunks = assembler.assemble(units, kind)?;

        tracing::debug!(
            "Chunked {} {:?} units into {} chunks (model: {}, max tokens: {})",
            unit_count,
            kind,
            chunks.len(),
            self.config.model,
            self.config.max_tokens
        );

        Ok(chunks)
    }
}
