//! Word-level chunking for text without useful sentence structure.

use crate::chunk::Chunk;
use crate::chunker::SmartChunker;
use crate::config::ChunkerConfig;
use crate::error::Result;
use toksum_tokens::TokenCounter;

/// Chunks text at word boundaries only.
///
/// Useful for token-dense text (lists of identifiers, keyword dumps) where
/// sentence or paragraph units would come out oversized. Words are joined by
/// single spaces, so the original whitespace is not preserved.
///
/// ```
/// use toksum_chunker::SimpleChunker;
///
/// let chunker = SimpleChunker::new("claude-3-haiku-20240307", 5).unwrap();
/// let chunks = chunker.chunk_text("alpha beta gamma delta epsilon zeta").unwrap();
/// assert!(chunks.len() > 1);
/// assert!(chunks.iter().all(|c| c.token_count <= 5));
/// ```
#[derive(Debug, Clone)]
pub struct SimpleChunker {
    inner: SmartChunker,
}

impl SimpleChunker {
    pub fn new(model: impl Into<String>, max_tokens: usize) -> Result<Self> {
        Ok(Self {
            inner: SmartChunker::new(model, max_tokens)?,
        })
    }

    pub fn with_counter(config: ChunkerConfig, counter: impl TokenCounter + 'static) -> Result<Self> {
        Ok(Self {
            inner: SmartChunker::with_counter(config, counter)?,
        })
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub fn max_tokens(&self) -> usize {
        self.inner.max_tokens()
    }

    /// Greedily pack whitespace-separated words into chunks within the budget.
    /// A single word over the budget becomes its own oversized chunk.
    pub fn chunk_text(&self, text: &str) -> Result<Vec<Chunk>> {
        self.inner.chunk_by_words(text)
    }
}
