use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::HistoryEntry;
use crate::redis::RedisManager;

/// Write-only sink for answered questions. The core never reads it back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn append(&self, user_id: &str, entry: &HistoryEntry) -> Result<()>;
}

/// Redis implementation of HistoryRepository
pub struct RedisHistoryRepository {
    redis: Arc<RedisManager>,
    max_entries: usize,
}

impl RedisHistoryRepository {
    pub fn new(redis: Arc<RedisManager>, max_entries: usize) -> Self {
        Self { redis, max_entries }
    }

    pub(crate) fn history_key(user_id: &str) -> String {
        format!("math_history:{user_id}")
    }
}

#[async_trait]
impl HistoryRepository for RedisHistoryRepository {
    async fn append(&self, user_id: &str, entry: &HistoryEntry) -> Result<()> {
        let key = Self::history_key(user_id);
        let json = serde_json::to_string(entry)?;
        self.redis
            .push_capped(&key, &json, self.max_entries)
            .await?;
        tracing::debug!(%key, id = %entry.id, "Saved math history entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_key_is_per_user() {
        assert_eq!(
            RedisHistoryRepository::history_key("6f1c"),
            "math_history:6f1c"
        );
    }
}
