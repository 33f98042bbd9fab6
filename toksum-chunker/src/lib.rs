//! # toksum-chunker
//!
//! Splits text into pieces that fit a language model's token budget without
//! breaking sentences, paragraphs or code declarations in the middle.
//!
//! ## Quick Start
//!
//! ```
//! use toksum_chunker::SmartChunker;
//!
//! let chunker = SmartChunker::new("claude-3-haiku-20240307", 8).unwrap();
//! let chunks = chunker
//!     .chunk_by_sentences("Chunking keeps sentences whole. Each chunk fits the budget. Order is preserved.")
//!     .unwrap();
//!
//! assert_eq!(chunks.len(), 3);
//! assert_eq!(chunks[0].text, "Chunking keeps sentences whole.");
//! assert!(chunks.iter().all(|c| c.token_count <= 8));
//! ```
//!
//! ## Architecture
//!
//! - [`text`]: Boundary splitting into sentences, paragraphs, words and code declarations
//! - [`chunker`]: [`SmartChunker`], greedy packing of units under a token budget
//! - [`simple`]: [`SimpleChunker`], word-level chunking
//! - [`chunk`]: The [`Chunk`] output type
//! - [`config`]: Chunker settings, loadable from TOML
//! - [`error`]: Error types and result handling
//!
//! Token counts come from [`toksum_tokens`]; any [`TokenCounter`] can be
//! plugged in with [`SmartChunker::with_counter`].

mod assembler;
pub mod chunk;
pub mod chunker;
pub mod config;
pub mod error;
pub mod simple;
pub mod text;

// Re-export main types for easy access
pub use chunk::{Chunk, UnitKind};
pub use chunker::SmartChunker;
pub use config::{ChunkerConfig, ChunkerConfigBuilder, DEFAULT_MODEL};
pub use error::{ChunkError, Result};
pub use simple::SimpleChunker;
pub use text::CodeLanguage;
pub use toksum_tokens::{TokenCounter, count_tokens};
