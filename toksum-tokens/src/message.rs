//! Token accounting for chat conversations

use serde::{Deserialize, Serialize};

/// Fixed tokens each message adds for its role and delimiters
pub const TOKENS_PER_MESSAGE: usize = 3;

/// Extra tokens when a message carries a participant name
pub const TOKENS_PER_NAME: usize = 1;

/// Tokens that prime the assistant's reply after the last message
pub const REPLY_PRIMING_TOKENS: usize = 3;

/// One message of a chat conversation.
///
/// Deserializes from the usual `{"role": ..., "content": ...}` shape, with an
/// optional `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Attach a participant name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_without_name() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"role": "user", "content": "Hi there"}"#).unwrap();
        assert_eq!(message, ChatMessage::user("Hi there"));
    }

    #[test]
    fn test_serialize_skips_missing_name() {
        let json = serde_json::to_string(&ChatMessage::system("Be brief.")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"Be brief."}"#);

        let named = ChatMessage::user("hello").with_name("alice");
        let json = serde_json::to_string(&named).unwrap();
        assert!(json.contains(r#""name":"alice""#));
    }
}
