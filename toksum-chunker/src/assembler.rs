//! Greedy packing of boundary units into token-bounded chunks.
//!
//! Units are appended to a pending chunk for as long as the counter says the
//! joined text still fits. The first unit that does not fit closes the pending
//! chunk and starts the next one. A unit that does not fit even on its own is
//! emitted alone and flagged as oversized; it is never truncated or dropped.

use crate::chunk::{Chunk, UnitKind};
use crate::error::Result;
use toksum_tokens::TokenCounter;

/// Packs units into chunks for one model and budget.
pub(crate) struct Assembler<'a> {
    counter: &'a dyn TokenCounter,
    model: &'a str,
    max_tokens: usize,
}

/// Chunk under construction
#[derive(Default)]
struct Pending {
    text: String,
    token_count: usize,
    unit_count: usize,
}

impl Pending {
    fn is_empty(&self) -> bool {
        self.unit_count == 0
    }
}

impl<'a> Assembler<'a> {
    pub(crate) fn new(counter: &'a dyn TokenCounter, model: &'a str, max_tokens: usize) -> Self {
        Self {
            counter,
            model,
            max_tokens,
        }
    }

    /// Assemble `units` (in order) into chunks, joining units with the kind's separator.
    pub(crate) fn assemble(&self, units: Vec<String>, kind: UnitKind) -> Result<Vec<Chunk>> {
        let separator = kind.separator();
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut pending = Pending::default();

        for unit in units {
            if pending.is_empty() {
                pending = self.start(unit, kind, &mut chunks)?;
                continue;
            }

            let candidate = format!("{}{}{}", pending.text, separator, unit);
            let token_count = self.counter.count(self.model, &candidate)?;
            if token_count <= self.max_tokens {
                tracing::trace!(
                    "Unit fits into chunk {} ({} tokens)",
                    chunks.len(),
                    token_count
                );
                pending = Pending {
                    text: candidate,
                    token_count,
                    unit_count: pending.unit_count + 1,
                };
                continue;
            }

            tracing::trace!(
                "Closing chunk {} at {} tokens; next unit would reach {}",
                chunks.len(),
                pending.token_count,
                token_count
            );
            let full = std::mem::take(&mut pending);
            push_chunk(&mut chunks, full, kind, false);
            pending = self.start(unit, kind, &mut chunks)?;
        }

        if !pending.is_empty() {
            push_chunk(&mut chunks, pending, kind, false);
        }

        Ok(chunks)
    }

    /// Measure a unit on its own and either open a new pending chunk with it or,
    /// if it is over budget by itself, emit it as an oversized chunk.
    fn start(&self, unit: String, kind: UnitKind, chunks: &mut Vec<Chunk>) -> Result<Pending> {
        let token_count = self.counter.count(self.model, &unit)?;
        let pending = Pending {
            text: unit,
            token_count,
            unit_count: 1,
        };

        if token_count <= self.max_tokens {
            return Ok(pending);
        }

        tracing::warn!(
            "Single {:?} unit needs {} tokens, over the budget of {}; emitting it as its own chunk",
            kind,
            token_count,
            self.max_tokens
        );
        push_chunk(chunks, pending, kind, true);
        Ok(Pending::default())
    }
}

fn push_chunk(chunks: &mut Vec<Chunk>, pending: Pending, kind: UnitKind, oversized: bool) {
    chunks.push(Chunk {
        text: pending.text,
        token_count: pending.token_count,
        sequence: chunks.len(),
        unit_count: pending.unit_count,
        kind,
        oversized,
    });
}
