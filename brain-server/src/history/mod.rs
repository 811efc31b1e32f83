//! Per-session conversation history.

mod memory;
mod redis_store;

pub use memory::MemoryHistoryStore;
pub use redis_store::RedisHistoryStore;

use async_trait::async_trait;
use brain_core::agent::ConversationTurn;
use brain_core::retry::Retryable;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Retryable for HistoryError {
    fn is_retryable(&self) -> bool {
        match self {
            HistoryError::Redis(err) => {
                err.is_io_error()
                    || err.is_timeout()
                    || err.is_connection_refusal()
                    || err.is_connection_dropped()
            }
            HistoryError::Json(_) => false,
        }
    }
}

/// Ordered, length-capped transcript per session.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Oldest first.
    async fn get(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HistoryError>;

    /// Appends and trims to the most recent entries.
    async fn append(&self, session_id: &str, turn: ConversationTurn) -> Result<(), HistoryError>;

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError>;

    async fn ping(&self) -> Result<(), HistoryError>;
}

pub(crate) fn session_key(session_id: &str) -> String {
    format!("session:{session_id}:messages")
}
