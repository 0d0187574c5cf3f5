//! Chat history entity
//!
//! The frontend sends the whole conversation on every request, one
//! `ChatTurn` per message, in the `{role, parts: [{text}]}` shape.

use serde::{Deserialize, Serialize};

/// Role of the turn's author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Message typed by the user
    User,
    /// Message produced by the model
    Model,
}

impl TurnRole {
    /// Role name in the OpenAI chat-completions vocabulary
    pub const fn as_openai_role(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "assistant",
        }
    }

    /// Role name in the Gemini `contents` vocabulary
    pub const fn as_gemini_role(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One text fragment of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPart {
    /// Fragment text
    #[serde(default)]
    pub text: String,
}

/// A single message of the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Author of the turn
    pub role: TurnRole,
    /// Text fragments, in order
    #[serde(default)]
    pub parts: Vec<TurnPart>,
}

impl ChatTurn {
    /// Create a user turn with a single text part
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            parts: vec![TurnPart { text: text.into() }],
        }
    }

    /// Create a model turn with a single text part
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![TurnPart { text: text.into() }],
        }
    }

    /// Full text of the turn, parts concatenated in order
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_has_correct_role() {
        let turn = ChatTurn::user("Hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text(), "Hello");
    }

    #[test]
    fn model_turn_has_correct_role() {
        let turn = ChatTurn::model("Hi there!");
        assert_eq!(turn.role, TurnRole::Model);
    }

    #[test]
    fn model_role_maps_to_openai_assistant() {
        assert_eq!(TurnRole::Model.as_openai_role(), "assistant");
        assert_eq!(TurnRole::User.as_openai_role(), "user");
    }

    #[test]
    fn model_role_keeps_gemini_name() {
        assert_eq!(TurnRole::Model.as_gemini_role(), "model");
    }

    #[test]
    fn text_concatenates_parts() {
        let turn = ChatTurn {
            role: TurnRole::User,
            parts: vec![
                TurnPart {
                    text: "Hello, ".to_string(),
                },
                TurnPart {
                    text: "world".to_string(),
                },
            ],
        };
        assert_eq!(turn.text(), "Hello, world");
    }

    #[test]
    fn text_of_turn_without_parts_is_empty() {
        let turn = ChatTurn {
            role: TurnRole::Model,
            parts: Vec::new(),
        };
        assert!(turn.text().is_empty());
    }

    #[test]
    fn deserializes_frontend_shape() {
        let json = r#"{"role":"model","parts":[{"text":"Sure!"}]}"#;
        let turn: ChatTurn = serde_json::from_str(json).unwrap();
        assert_eq!(turn, ChatTurn::model("Sure!"));
    }

    #[test]
    fn rejects_unknown_role() {
        let json = r#"{"role":"system","parts":[{"text":"x"}]}"#;
        assert!(serde_json::from_str::<ChatTurn>(json).is_err());
    }

    #[test]
    fn missing_parts_default_to_empty() {
        let json = r#"{"role":"user"}"#;
        let turn: ChatTurn = serde_json::from_str(json).unwrap();
        assert!(turn.parts.is_empty());
    }
}
