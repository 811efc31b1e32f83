mod errors;
mod models;
mod prompt;
mod runner;
mod transcript;

#[cfg(test)]
mod tests;

pub use errors::AgentError;
pub use models::{AgentOptions, ChatInput, DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL};
pub use prompt::{apology, empty_response, system_prompt};
pub use runner::Agent;
pub use transcript::{ConversationTurn, TurnRole, map_history};
