//! Durable status store keyed by job id.
//!
//! Records are full-JSON string values under `{namespace}:<job_id>`. Every
//! write replaces the whole record, so a duplicate delivery that rewrites a
//! record cannot partially corrupt it.

use redis::AsyncCommands;
use uuid::Uuid;

use crate::models::job::JobRecord;

const KEY_NAMESPACE: &str = "article_analysis:status";

/// Redis-backed key-value store of job status records.
pub struct StatusStore {
    client: redis::Client,
}

impl StatusStore {
    pub fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url).map_err(StoreError::Redis)?;
        Ok(Self { client })
    }

    fn key(job_id: Uuid) -> String {
        format!("{KEY_NAMESPACE}:{job_id}")
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(StoreError::Redis)
    }

    /// Write a full record for `job_id`, replacing any existing value.
    pub async fn put(&self, job_id: Uuid, record: &JobRecord) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let value = serde_json::to_string(record).map_err(StoreError::Serialize)?;
        conn.set::<_, _, ()>(Self::key(job_id), value)
            .await
            .map_err(StoreError::Redis)?;
        Ok(())
    }

    /// Read the record for `job_id`, or `None` if no record exists.
    pub async fn get(&self, job_id: Uuid) -> Result<Option<JobRecord>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(Self::key(job_id))
            .await
            .map_err(StoreError::Redis)?;

        match value {
            Some(v) => {
                let record: JobRecord =
                    serde_json::from_str(&v).map_err(StoreError::Serialize)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Delete the record for `job_id`. Used to roll back a pending record
    /// when the enqueue that follows it fails.
    pub async fn remove(&self, job_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(Self::key(job_id))
            .await
            .map_err(StoreError::Redis)?;
        Ok(())
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(StoreError::Redis)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
