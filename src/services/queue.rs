//! Redis-backed job queue with reliable dequeue.
//!
//! Three Redis lists per queue name:
//!
//! - `{name}`: main queue, LPUSH on enqueue
//! - `{name}:processing`: in-flight deliveries, filled by BRPOPLPUSH
//! - `{name}:poison`: quarantined payloads that could not be parsed
//!
//! A delivery stays on the processing list until it is acknowledged, so a
//! worker crash leaves it recoverable rather than lost. Durability across
//! broker restarts is Redis persistence (AOF/RDB); the queue itself never
//! re-creates messages.

use chrono::Utc;
use redis::AsyncCommands;
use std::time::Duration;

use crate::models::job::JobMessage;

/// One message pulled off the queue. Holds the raw payload so that
/// unparseable (poison) deliveries can still be acknowledged or
/// quarantined by exact value.
#[derive(Debug, Clone)]
pub struct Delivery {
    payload: String,
}

impl Delivery {
    pub fn message(&self) -> Result<JobMessage, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    #[cfg(test)]
    pub fn from_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Redis-backed async job queue with explicit acknowledgment.
pub struct JobQueue {
    client: redis::Client,
    queue_key: String,
    processing_key: String,
    poison_key: String,
}

impl JobQueue {
    pub fn new(redis_url: &str, queue_name: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(redis_url).map_err(QueueError::Redis)?;
        Ok(Self {
            client,
            queue_key: queue_name.to_string(),
            processing_key: format!("{queue_name}:processing"),
            poison_key: format!("{queue_name}:poison"),
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, QueueError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(QueueError::Redis)
    }

    /// Enqueue an analysis job. Returns only after Redis has accepted the
    /// push, so a successful call means the message is on the queue.
    pub async fn enqueue(&self, message: &JobMessage) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        let payload = serde_json::to_string(message).map_err(QueueError::Serialize)?;
        conn.lpush::<_, _, ()>(&self.queue_key, &payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Dequeue the next delivery, blocking up to `timeout`.
    ///
    /// BRPOPLPUSH atomically moves the payload onto the processing list,
    /// where it remains until `ack`, `requeue`, or `quarantine`.
    pub async fn dequeue(&self, timeout: Duration) -> Result<Option<Delivery>, QueueError> {
        let mut conn = self.connection().await?;
        let timeout_secs = timeout.as_secs().max(1);
        let result: Option<String> = redis::cmd("BRPOPLPUSH")
            .arg(&self.queue_key)
            .arg(&self.processing_key)
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await
            .map_err(QueueError::Redis)?;

        Ok(result.map(|payload| Delivery { payload }))
    }

    /// Acknowledge a delivery, permanently removing it from the queue.
    /// Callers must only do this after the job's terminal state is durable.
    pub async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        conn.lrem::<_, _, ()>(&self.processing_key, 1, &delivery.payload)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Return an in-flight delivery to the main queue for redelivery.
    pub async fn requeue(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        redis::pipe()
            .atomic()
            .lrem(&self.processing_key, 1, &delivery.payload)
            .rpush(&self.queue_key, &delivery.payload)
            .query_async::<()>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Move an unparseable delivery to the poison list. The envelope keeps
    /// the raw payload so operators can inspect what arrived.
    pub async fn quarantine(&self, delivery: &Delivery, error: &str) -> Result<(), QueueError> {
        let envelope = serde_json::json!({
            "payload": delivery.payload,
            "error": error,
            "quarantined_at": Utc::now().to_rfc3339(),
        });
        let serialized = serde_json::to_string(&envelope).map_err(QueueError::Serialize)?;

        let mut conn = self.connection().await?;
        redis::pipe()
            .atomic()
            .lrem(&self.processing_key, 1, &delivery.payload)
            .lpush(&self.poison_key, &serialized)
            .query_async::<()>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Push deliveries orphaned on the processing list back onto the main
    /// queue. Run at worker startup; redelivery of an already-finished job
    /// is handled by the worker's terminal-state check.
    pub async fn recover_processing(&self) -> Result<usize, QueueError> {
        let mut conn = self.connection().await?;
        let orphans: Vec<String> = conn
            .lrange(&self.processing_key, 0, -1)
            .await
            .map_err(QueueError::Redis)?;

        let mut recovered = 0;
        for payload in orphans {
            redis::pipe()
                .atomic()
                .lrem(&self.processing_key, 1, &payload)
                .rpush(&self.queue_key, &payload)
                .query_async::<()>(&mut conn)
                .await
                .map_err(QueueError::Redis)?;
            recovered += 1;
        }
        Ok(recovered)
    }

    /// Check Redis connectivity (for health checks).
    pub async fn health_check(&self) -> Result<(), QueueError> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(QueueError::Redis)?;
        Ok(())
    }

    /// Number of messages waiting on the main queue.
    pub async fn depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.connection().await?;
        let depth: u64 = conn
            .llen(&self.queue_key)
            .await
            .map_err(QueueError::Redis)?;
        Ok(depth)
    }

    /// Number of deliveries currently in flight.
    pub async fn processing_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.connection().await?;
        let depth: u64 = conn
            .llen(&self.processing_key)
            .await
            .map_err(QueueError::Redis)?;
        Ok(depth)
    }

    /// Number of quarantined poison payloads.
    pub async fn poison_depth(&self) -> Result<u64, QueueError> {
        let mut conn = self.connection().await?;
        let depth: u64 = conn
            .llen(&self.poison_key)
            .await
            .map_err(QueueError::Redis)?;
        Ok(depth)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
