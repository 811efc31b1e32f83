use super::{HistoryError, HistoryStore, session_key};
use async_trait::async_trait;
use brain_core::agent::ConversationTurn;
use brain_core::metrics::Metrics;
use brain_core::retry::RetryPolicy;
use redis::AsyncCommands;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Redis list per session, trimmed on every write.
#[derive(Clone)]
pub struct RedisHistoryStore {
    client: redis::Client,
    max_messages: usize,
    retry: RetryPolicy,
    metrics: Arc<Metrics>,
}

impl RedisHistoryStore {
    pub fn new(
        url: impl AsRef<str>,
        max_messages: usize,
        metrics: Arc<Metrics>,
    ) -> Result<Self, HistoryError> {
        Ok(Self {
            client: redis::Client::open(url.as_ref())?,
            max_messages: max_messages.max(1),
            retry: RetryPolicy::history_store(),
            metrics,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn tracked<T, F, Fut>(&self, operation: &'static str, f: F) -> Result<T, HistoryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, HistoryError>>,
    {
        let result = self.retry.run(operation, f).await;
        let status = if result.is_ok() { "success" } else { "error" };
        self.metrics.record_redis_operation(operation, status);
        result
    }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn get(&self, session_id: &str) -> Result<Vec<ConversationTurn>, HistoryError> {
        let key = session_key(session_id);
        let key = key.as_str();
        let entries: Vec<String> = self
            .tracked("get_history", move || async move {
                let mut conn = self.connection().await?;
                let entries: Vec<String> = conn.lrange(key, 0, -1).await?;
                Ok::<_, HistoryError>(entries)
            })
            .await?;

        let mut turns = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_str::<ConversationTurn>(&entry) {
                Ok(turn) => turns.push(turn),
                Err(err) => {
                    warn!(session_id, error = %err, "Skipping malformed history entry")
                }
            }
        }
        Ok(turns)
    }

    async fn append(&self, session_id: &str, turn: ConversationTurn) -> Result<(), HistoryError> {
        let key = session_key(session_id);
        let key = key.as_str();
        let payload = serde_json::to_string(&turn)?;
        let payload = payload.as_str();
        let keep = self.max_messages as isize;
        self.tracked("add_message", move || async move {
            let mut conn = self.connection().await?;
            let mut pipe = redis::pipe();
            pipe.atomic()
                .rpush(key, payload)
                .ignore()
                .ltrim(key, -keep, -1)
                .ignore();
            let _: () = pipe.query_async(&mut conn).await?;
            Ok::<_, HistoryError>(())
        })
        .await
    }

    async fn clear(&self, session_id: &str) -> Result<(), HistoryError> {
        let key = session_key(session_id);
        let key = key.as_str();
        self.tracked("clear_history", move || async move {
            let mut conn = self.connection().await?;
            let _: () = conn.del(key).await?;
            Ok::<_, HistoryError>(())
        })
        .await
    }

    async fn ping(&self) -> Result<(), HistoryError> {
        self.tracked("ping", move || async move {
            let mut conn = self.connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, HistoryError>(())
        })
        .await
    }
}
