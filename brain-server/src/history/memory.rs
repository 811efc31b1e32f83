use super::{HistoryError, HistoryStore};
use async_trait::async_trait;
use brain_core::agent::ConversationTurn;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// In-process store with the same capping rules as the Redis one.
pub struct MemoryHistoryStore {
    max_messages: usize,
    sessions: RwLock<HashMap<String, VecDeque<ConversationTurn>>>,
}

impl MemoryHistoryStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new(50)
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn get(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HistoryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turn: ConversationTurn) -> Result<(), HistoryError> {
        let mut sessions = self.sessions.write().await;
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push_back(turn);
        while turns.len() > self.max_messages {
            turns.pop_front();
        }
        Ok(())
    }

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), HistoryError> {
        Ok(())
    }
}
