use serde::Serialize;

/// The kind of boundary unit a chunk was assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Sentence,
    Paragraph,
    Code,
    Word,
}

impl UnitKind {
    /// Separator placed between consecutive units inside one chunk.
    pub fn separator(&self) -> &'static str {
        match self {
            UnitKind::Sentence | UnitKind::Word => " ",
            UnitKind::Paragraph => "\n\n",
            UnitKind::Code => "\n",
        }
    }
}

/// A piece of text sized to fit a token budget.
///
/// Chunks are returned in original text order. `token_count` is what the
/// chunker's counter measured for exactly this text, so it is only as exact as
/// that counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// The text content of this chunk.
    pub text: String,
    /// Tokens measured for `text` by the model's counter.
    pub token_count: usize,
    /// The sequence number of this chunk within its input (0-indexed).
    pub sequence: usize,
    /// Number of boundary units merged into this chunk.
    pub unit_count: usize,
    /// The kind of boundary unit this chunk is made of.
    pub kind: UnitKind,
    /// A single unit that exceeds the budget on its own.
    pub oversized: bool,
}

impl Chunk {
    /// Whether the chunk is over the given budget
    pub fn exceeds(&self, max_tokens: usize) -> bool {
        self.token_count > max_tokens
    }
}
