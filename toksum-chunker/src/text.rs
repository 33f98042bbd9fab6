//! Boundary splitting: turning raw text into the units chunks are built from.
//!
//! Every splitter returns owned units in original order. Units never span a
//! boundary of their kind, so a chunk assembled from them never splits a
//! sentence, paragraph or declaration in the middle.
//!
//! # Boundary Rules
//!
//! *   **Sentences** end at `.`, `!` or `?` followed by whitespace. A run of
//!     terminal punctuation (`?!`, `...`) stays with its sentence. Decimals
//!     such as `3.14` never split, while abbreviations such as `Dr.` followed by
//!     a space do.
//! *   **Paragraphs** are separated by one or more blank (whitespace-only) lines.
//! *   **Code declarations** start at column 0 with a language-specific keyword
//!     and run through every following blank or indented line, plus column-0
//!     closing delimiters (`}`, `)`, `]`). In Rust and JavaScript/TypeScript a
//!     column-0 opening `{` (and a Rust `where` clause) also continues the
//!     declaration. Decorators, attributes and comments
//!     directly above a declaration belong to it. Top-level code between
//!     declarations forms its own unit.
//!
//! ```
//! use toksum_chunker::text::{split_code_blocks, split_paragraphs, split_sentences};
//!
//! let sentences = split_sentences("Hello world. Is pi 3.14? Yes!");
//! assert_eq!(sentences, vec!["Hello world.", "Is pi 3.14?", "Yes!"]);
//!
//! let paragraphs = split_paragraphs("Para 1.\n\n  \nPara 2.");
//! assert_eq!(paragraphs, vec!["Para 1.", "Para 2."]);
//!
//! let code = "import os\n\ndef hello():\n    print('hi')\n\nclass A:\n    pass\n";
//! let blocks = split_code_blocks("python", code).unwrap();
//! assert_eq!(blocks, vec!["import os", "def hello():\n    print('hi')", "class A:\n    pass"]);
//!
//! assert!(split_code_blocks("ruby", code).is_err());
//! ```
use crate::error::{ChunkError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Terminal punctuation followed by whitespace. The punctuation itself ends the sentence.
pub const SENTENCE_BOUNDARY: &str = r"[.!?]\s+";

/// A newline, any whitespace-only lines, and another newline.
pub const PARAGRAPH_BREAK: &str = r"\n\s*\n";

/// Column-0 lines that close a declaration body in brace or paren languages.
const BODY_CLOSER: &str = r"^[}\])]";
/// Rust also continues through column-0 `where` clauses and opening braces, as rustfmt lays out generic items.
const RUST_CONTINUATION: &str = r"^([}\])]|where\b|\{)";
/// Allman-style braces open the body on their own column-0 line.
const JS_CONTINUATION: &str = r"^([}\])]|\{)";

const PYTHON_DECLARATION: &str = r"^(async\s+def|def|class)\s";
const PYTHON_ATTACHMENT: &str = r"^@";

const RUST_DECLARATION: &str = r#"^(pub(\([^)]*\))?\s+)?((async|const|unsafe|extern(\s+"[^"]*")?)\s+)*((fn|struct|enum|trait|impl|mod|type|union|static|const)\b|macro_rules!)"#;
const RUST_ATTACHMENT: &str = r"^(#\[|///)";

const JS_DECLARATION: &str = r"^(export\s+)?(default\s+)?(declare\s+)?(abstract\s+)?(async\s+)?(function\b\*?|(class|interface|enum|type|namespace)\b|(const|let|var)\s+[\w$]+\s*=\s*(async\s+)?(function\b|\([^)]*\)\s*=>|[\w$]+\s*=>))";
const JS_ATTACHMENT: &str = r"^(@|//)";

const GO_DECLARATION: &str = r"^(func|type)\b";
const GO_ATTACHMENT: &str = r"^//";

static SENTENCE_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| compile(SENTENCE_BOUNDARY));
static PARAGRAPH_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| compile(PARAGRAPH_BREAK));

static PYTHON_RULES: LazyLock<DeclarationRules> =
    LazyLock::new(|| DeclarationRules::new(PYTHON_DECLARATION, PYTHON_ATTACHMENT, BODY_CLOSER));
static RUST_RULES: LazyLock<DeclarationRules> =
    LazyLock::new(|| DeclarationRules::new(RUST_DECLARATION, RUST_ATTACHMENT, RUST_CONTINUATION));
static JS_RULES: LazyLock<DeclarationRules> =
    LazyLock::new(|| DeclarationRules::new(JS_DECLARATION, JS_ATTACHMENT, JS_CONTINUATION));
static GO_RULES: LazyLock<DeclarationRules> =
    LazyLock::new(|| DeclarationRules::new(GO_DECLARATION, GO_ATTACHMENT, BODY_CLOSER));

// The patterns are compile-time constants covered by tests
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Split text into sentences, keeping terminal punctuation with each sentence.
///
/// The input is trimmed first; empty or whitespace-only input yields no sentences.
/// Text without any sentence boundary comes back as a single unit.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut sentences = Vec::new();
    let mut start = 0;
    for mat in SENTENCE_BOUNDARY_RE.find_iter(text) {
        // The punctuation is a single ASCII byte at the start of the match
        sentences.push(text[start..mat.start() + 1].to_string());
        start = mat.end();
    }
    if start < text.len() {
        sentences.push(text[start..].to_string());
    }
    sentences
}

/// Split text into paragraphs at blank lines, trimming each paragraph and
/// dropping empty ones.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK_RE
        .split(text.trim())
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split text into whitespace-separated words.
pub fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Split source code into top-level declarations for a supported language.
///
/// # Errors
///
/// Returns [`ChunkError::UnsupportedLanguage`] when `language` has no
/// declaration rule. Callers that want plain-text handling instead should fall
/// back to [`split_paragraphs`].
pub fn split_code_blocks(language: &str, code: &str) -> Result<Vec<String>> {
    let language =
        CodeLanguage::from_name(language).ok_or_else(|| ChunkError::unsupported_language(language))?;
    Ok(language.rules().split(code))
}

/// Languages with a top-level declaration rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeLanguage {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Go,
}

impl CodeLanguage {
    /// All languages with declaration rules
    pub const ALL: [CodeLanguage; 5] = [
        CodeLanguage::Python,
        CodeLanguage::Rust,
        CodeLanguage::JavaScript,
        CodeLanguage::TypeScript,
        CodeLanguage::Go,
    ];

    /// Look up a language by name or common alias, case-insensitively
    pub fn from_name(name: &str) -> Option<CodeLanguage> {
        match name.trim().to_lowercase().as_str() {
            "python" | "py" => Some(CodeLanguage::Python),
            "rust" | "rs" => Some(CodeLanguage::Rust),
            "javascript" | "js" | "jsx" => Some(CodeLanguage::JavaScript),
            "typescript" | "ts" | "tsx" => Some(CodeLanguage::TypeScript),
            "go" | "golang" => Some(CodeLanguage::Go),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            CodeLanguage::Python => "python",
            CodeLanguage::Rust => "rust",
            CodeLanguage::JavaScript => "javascript",
            CodeLanguage::TypeScript => "typescript",
            CodeLanguage::Go => "go",
        }
    }

    fn rules(&self) -> &'static DeclarationRules {
        match self {
            CodeLanguage::Python => &*PYTHON_RULES,
            CodeLanguage::Rust => &*RUST_RULES,
            CodeLanguage::JavaScript | CodeLanguage::TypeScript => &*JS_RULES,
            CodeLanguage::Go => &*GO_RULES,
        }
    }
}

/// Line classifiers for one language
struct DeclarationRules {
    declaration: Regex,
    attachment: Regex,
    /// Column-0 lines that still belong to the declaration above them
    continuation: Regex,
}

impl DeclarationRules {
    fn new(declaration: &str, attachment: &str, continuation: &str) -> Self {
        Self {
            declaration: compile(declaration),
            attachment: compile(attachment),
            continuation: compile(continuation),
        }
    }

    /// A line inside a declaration: blank, indented, or a column-0 continuation
    fn continues_body(&self, line: &str) -> bool {
        line.trim().is_empty()
            || line.starts_with(char::is_whitespace)
            || self.continuation.is_match(line)
    }

    fn split(&self, code: &str) -> Vec<String> {
        let lines: Vec<&str> = code.lines().collect();
        let mut blocks = Vec::new();
        // Top-level lines outside any declaration
        let mut loose: Vec<&str> = Vec::new();
        // Decorators, attributes and comments waiting for the next declaration
        let mut attached: Vec<&str> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            i += 1;

            if self.declaration.is_match(line) {
                push_block(&mut blocks, &loose);
                loose.clear();

                let mut declaration = std::mem::take(&mut attached);
                declaration.push(line);
                while i < lines.len() && self.continues_body(lines[i]) {
                    declaration.push(lines[i]);
                    i += 1;
                }
                push_block(&mut blocks, &declaration);
            } else if self.attachment.is_match(line) {
                attached.push(line);
            } else {
                loose.append(&mut attached);
                loose.push(line);
            }
        }

        loose.append(&mut attached);
        push_block(&mut blocks, &loose);
        blocks
    }
}

fn push_block(blocks: &mut Vec<String>, lines: &[&str]) {
    let block = lines.join("\n");
    let block = block.trim();
    if !block.is_empty() {
        blocks.push(block.to_string());
    }
}
