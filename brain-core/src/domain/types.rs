use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// One entry of the message sequence sent to the model.
///
/// Assistant messages may carry `tool_calls`; tool messages carry the
/// `tool_call_id` of the request they answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    pub fn assistant_with_tools(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::assistant(content)
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::new(MessageRole::Tool, content)
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Front-end the message arrived through.
///
/// Unknown values are kept verbatim so they can be logged and labelled, but
/// they contribute no prompt clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Interface {
    Voice,
    Telegram,
    #[default]
    Api,
    Other(String),
}

impl Interface {
    pub fn parse(value: &str) -> Self {
        match value {
            "voice" => Interface::Voice,
            "telegram" => Interface::Telegram,
            "api" => Interface::Api,
            other => Interface::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Interface::Voice => "voice",
            Interface::Telegram => "telegram",
            Interface::Api => "api",
            Interface::Other(value) => value.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Language {
    Polish,
    #[default]
    English,
    Other(String),
}

impl Language {
    pub fn parse(value: &str) -> Self {
        match value {
            "pl" => Language::Polish,
            "en" => Language::English,
            other => Language::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Language::Polish => "pl",
            Language::English => "en",
            Language::Other(value) => value.as_str(),
        }
    }
}
