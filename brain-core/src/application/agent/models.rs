use super::transcript::ConversationTurn;
use crate::application::retry::RetryPolicy;
use crate::types::{ChatMessage, Interface, Language};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    /// Upper bound on model turns that request tools within one chat.
    pub max_iterations: usize,
    pub retry: RetryPolicy,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            retry: RetryPolicy::model_api(),
        }
    }
}

/// Everything one `Agent::chat` call needs.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: String,
    pub history: Vec<ConversationTurn>,
    pub user_id: String,
    pub session_id: String,
    pub interface: Interface,
    pub language: Language,
}

impl ChatInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_history(mut self, history: Vec<ConversationTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_session(mut self, user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.session_id = session_id.into();
        self
    }

    pub fn with_interface(mut self, interface: Interface) -> Self {
        self.interface = interface;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

/// Per-invocation working state. Only ever appended to.
#[derive(Debug)]
pub(crate) struct AgentState {
    pub messages: Vec<ChatMessage>,
    pub user_id: String,
    pub session_id: String,
    pub interface: Interface,
    pub language: Language,
}
