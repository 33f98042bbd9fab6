//! Model family detection

use crate::counter::Encoding;
use serde::Serialize;
use std::fmt;

/// Provider family a model name belongs to.
///
/// The family decides which counting strategy a registry uses for a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// GPT, o-series, embedding and legacy completion models
    OpenAi,
    /// Claude models
    Anthropic,
    /// Gemini, PaLM and Gemma models
    Google,
    /// Llama models
    Meta,
    /// Mistral, Mixtral and Codestral models
    Mistral,
    /// Command models
    Cohere,
}

// Prefixes are matched against the lowercased model name. OpenAI names come
// from the encoding table instead, so detection and exact counting agree.
const FAMILY_PREFIXES: &[(ModelFamily, &[&str])] = &[
    (ModelFamily::Anthropic, &["claude-", "claude"]),
    (ModelFamily::Google, &["gemini-", "palm-", "gemma-", "text-bison", "chat-bison"]),
    (ModelFamily::Meta, &["llama-", "llama2", "llama3", "meta-llama"]),
    (ModelFamily::Mistral, &["mistral-", "mixtral-", "codestral-", "open-mistral"]),
    (ModelFamily::Cohere, &["command-", "command"]),
];

impl ModelFamily {
    /// All known families, in detection order
    pub const ALL: [ModelFamily; 6] = [
        ModelFamily::OpenAi,
        ModelFamily::Anthropic,
        ModelFamily::Google,
        ModelFamily::Meta,
        ModelFamily::Mistral,
        ModelFamily::Cohere,
    ];

    /// Detect the family of a model name, or `None` for names no family claims.
    ///
    /// # Examples
    /// ```
    /// use toksum_tokens::ModelFamily;
    ///
    /// assert_eq!(ModelFamily::detect("gpt-4"), Some(ModelFamily::OpenAi));
    /// assert_eq!(ModelFamily::detect("Claude-3-Opus-20240229"), Some(ModelFamily::Anthropic));
    /// assert_eq!(ModelFamily::detect("mystery-model"), None);
    /// ```
    pub fn detect(model: &str) -> Option<ModelFamily> {
        let model = model.trim().to_lowercase();
        if model.is_empty() {
            return None;
        }
        if Encoding::for_model(&model).is_some() {
            return Some(ModelFamily::OpenAi);
        }
        FAMILY_PREFIXES
            .iter()
            .find(|(_, prefixes)| prefixes.iter().any(|p| model.starts_with(p)))
            .map(|(family, _)| *family)
    }

    /// Well-known model names of this family.
    ///
    /// Detection is prefix based, so any dated or suffixed variant of these
    /// (and many unlisted names) is accepted too; this is a reference listing,
    /// not an allow-list.
    pub fn known_models(&self) -> &'static [&'static str] {
        match self {
            ModelFamily::OpenAi => &[
                "gpt-4o",
                "gpt-4o-mini",
                "gpt-4.1",
                "gpt-4-turbo",
                "gpt-4",
                "gpt-3.5-turbo",
                "o1",
                "o1-mini",
                "o3-mini",
                "chatgpt-4o-latest",
                "text-embedding-3-small",
                "text-embedding-3-large",
                "text-embedding-ada-002",
                "text-davinci-003",
                "text-davinci-edit-001",
                "code-davinci-002",
                "davinci",
            ],
            ModelFamily::Anthropic => &[
                "claude-3-5-sonnet-20241022",
                "claude-3-5-haiku-20241022",
                "claude-3-opus-20240229",
                "claude-3-sonnet-20240229",
                "claude-3-haiku-20240307",
                "claude-2.1",
                "claude-instant-1.2",
            ],
            ModelFamily::Google => &[
                "gemini-1.5-pro",
                "gemini-1.5-flash",
                "gemini-2.0-flash",
                "gemini-pro",
                "gemma-7b",
                "text-bison-001",
            ],
            ModelFamily::Meta => &["llama-2-70b", "llama-3-8b", "llama-3-70b", "llama-3.1-405b"],
            ModelFamily::Mistral => &[
                "mistral-large",
                "mistral-small",
                "mixtral-8x7b",
                "codestral-latest",
                "open-mistral-7b",
            ],
            ModelFamily::Cohere => &["command-r", "command-r-plus", "command-light"],
        }
    }

    /// Short lowercase identifier, as used in logs and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFamily::OpenAi => "openai",
            ModelFamily::Anthropic => "anthropic",
            ModelFamily::Google => "google",
            ModelFamily::Meta => "meta",
            ModelFamily::Mistral => "mistral",
            ModelFamily::Cohere => "cohere",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_families() {
        let test_cases = vec![
            ("gpt-4", Some(ModelFamily::OpenAi)),
            ("gpt-3.5-turbo", Some(ModelFamily::OpenAi)),
            ("gpt-4o-mini", Some(ModelFamily::OpenAi)),
            ("o1-preview", Some(ModelFamily::OpenAi)),
            ("text-embedding-3-small", Some(ModelFamily::OpenAi)),
            ("davinci", Some(ModelFamily::OpenAi)),
            ("text-davinci-edit-001", Some(ModelFamily::OpenAi)),
            ("chatgpt-4o-latest", Some(ModelFamily::OpenAi)),
            ("claude-3-opus-20240229", Some(ModelFamily::Anthropic)),
            ("claude-instant-1", Some(ModelFamily::Anthropic)),
            ("gemini-1.5-pro", Some(ModelFamily::Google)),
            ("gemini-2.0-flash-exp", Some(ModelFamily::Google)),
            ("llama-3-70b", Some(ModelFamily::Meta)),
            ("mistral-large", Some(ModelFamily::Mistral)),
            ("mixtral-8x7b", Some(ModelFamily::Mistral)),
            ("command-r-plus", Some(ModelFamily::Cohere)),
            ("bert-base", None),
            ("", None),
        ];

        for (model, expected) in test_cases {
            assert_eq!(ModelFamily::detect(model), expected, "Failed for {model}");
        }
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(ModelFamily::detect("GPT-4"), Some(ModelFamily::OpenAi));
        assert_eq!(ModelFamily::detect("  Gemini-Pro "), Some(ModelFamily::Google));
    }

    #[test]
    fn test_openai_detection_agrees_with_encodings() {
        let names = [
            "text-davinci-edit-001",
            "code-davinci-edit-001",
            "chatgpt-4o-latest",
            "chatgpt-5",
            "gpt-5-preview",
            "o4-mini",
            "ada",
            "claude-3-opus",
            "codestral-latest",
            "command-r",
        ];
        for model in names {
            assert_eq!(
                ModelFamily::detect(model) == Some(ModelFamily::OpenAi),
                Encoding::for_model(model).is_some(),
                "Failed for {model}"
            );
        }
    }

    #[test]
    fn test_known_models_detect_to_their_family() {
        for family in ModelFamily::ALL {
            assert!(!family.known_models().is_empty());
            for model in family.known_models() {
                assert_eq!(ModelFamily::detect(model), Some(family), "Failed for {model}");
            }
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        for family in ModelFamily::ALL {
            assert_eq!(family.to_string(), family.as_str());
        }
    }
}
