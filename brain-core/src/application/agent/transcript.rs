//! Mapping of stored conversation turns onto model messages.

use crate::types::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TurnRole {
    User,
    Assistant,
    System,
    Unrecognized(String),
}

impl TurnRole {
    pub fn as_str(&self) -> &str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::System => "system",
            TurnRole::Unrecognized(role) => role.as_str(),
        }
    }
}

impl From<String> for TurnRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => TurnRole::User,
            "assistant" => TurnRole::Assistant,
            "system" => TurnRole::System,
            _ => TurnRole::Unrecognized(value),
        }
    }
}

impl From<TurnRole> for String {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::Unrecognized(role) => role,
            known => known.as_str().to_string(),
        }
    }
}

/// One stored `{role, content}` entry of a session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::from(role.into()),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Order-preserving. System turns stay inline; unrecognized roles are
/// skipped with a warning.
pub fn map_history(turns: &[ConversationTurn]) -> Vec<ChatMessage> {
    turns
        .iter()
        .filter_map(|turn| match &turn.role {
            TurnRole::User => Some(ChatMessage::user(turn.content.clone())),
            TurnRole::Assistant => Some(ChatMessage::assistant(turn.content.clone())),
            TurnRole::System => Some(ChatMessage::system(turn.content.clone())),
            TurnRole::Unrecognized(role) => {
                warn!(role = role.as_str(), "Skipping history entry with unrecognized role");
                None
            }
        })
        .collect()
}
