use super::prompt;
use crate::infrastructure::model::ModelError;
use crate::types::Language;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("agent exceeded the limit of {limit} tool iterations")]
    IterationLimit { limit: usize },
}

impl AgentError {
    /// Label for the `error_type` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Model(err) => err.kind(),
            AgentError::IterationLimit { .. } => "iteration_limit",
        }
    }

    pub fn user_message(&self, language: &Language) -> String {
        prompt::apology(language).to_string()
    }
}
