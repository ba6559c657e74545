//! Queue consumer driving the job state machine.
//!
//! Per delivery: parse, claim with a `processing` write, analyze, write the
//! terminal record, then acknowledge. The acknowledgment always comes last,
//! after the terminal write is confirmed. A crash anywhere before it leaves
//! the delivery on the processing list, where startup recovery returns it
//! to the main queue; the terminal-state check below makes that redelivery
//! a no-op overwrite rather than a regression.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

use crate::models::job::{JobMessage, JobRecord};
use crate::services::analyzer::ArticleAnalyzer;
use crate::services::queue::{Delivery, JobQueue, QueueError};
use crate::services::store::{StatusStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("status store error: {0}")]
    Store(#[from] StoreError),
}

/// Sequential consume loop. Scale by running more worker processes; the
/// queue arbitrates which one receives a given message.
pub struct Worker {
    queue: Arc<JobQueue>,
    store: Arc<StatusStore>,
    analyzer: ArticleAnalyzer,
    poll_timeout: Duration,
    retry_backoff: Duration,
}

impl Worker {
    pub fn new(
        queue: Arc<JobQueue>,
        store: Arc<StatusStore>,
        analyzer: ArticleAnalyzer,
        poll_timeout: Duration,
        retry_backoff: Duration,
    ) -> Self {
        Self {
            queue,
            store,
            analyzer,
            poll_timeout,
            retry_backoff,
        }
    }

    /// Run the consume loop forever. Infrastructure errors back off before
    /// the next iteration instead of hot-looping against a down dependency.
    pub async fn run(&self) {
        loop {
            match self.process_next().await {
                Ok(true) => {
                    tracing::debug!("Job processed, checking for next job");
                }
                Ok(false) => {
                    tracing::trace!("No jobs available");
                    if let Ok(depth) = self.queue.depth().await {
                        metrics::gauge!("article_queue_depth").set(depth as f64);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Error processing job, backing off");
                    sleep(self.retry_backoff).await;
                }
            }
        }
    }

    /// Process the next delivery from the queue.
    /// Returns Ok(true) if a delivery was handled, Ok(false) on idle timeout.
    pub async fn process_next(&self) -> Result<bool, WorkerError> {
        let delivery = match self.queue.dequeue(self.poll_timeout).await? {
            Some(d) => d,
            None => return Ok(false),
        };

        // Poison check: a payload that cannot self-correct must not be
        // redelivered, and must never touch the status store.
        let message = match delivery.message() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(
                    payload = delivery.payload(),
                    error = %e,
                    "Quarantining malformed queue message"
                );
                self.queue.quarantine(&delivery, &e.to_string()).await?;
                metrics::counter!("article_jobs_poisoned").increment(1);
                return Ok(true);
            }
        };

        // Terminal-state check: at-least-once delivery means a finished job
        // can come around again (crash between terminal write and ack, or
        // startup recovery). Its outcome is already durable, so just ack.
        match self.store.get(message.job_id).await {
            Ok(Some(record)) if record.is_terminal() => {
                tracing::info!(
                    job_id = %message.job_id,
                    status = %record.status,
                    "Duplicate delivery of finished job, acknowledging"
                );
                self.queue.ack(&delivery).await?;
                return Ok(true);
            }
            Ok(_) => {}
            Err(e) => {
                self.return_to_queue(&delivery).await;
                return Err(e.into());
            }
        }

        tracing::info!(job_id = %message.job_id, url = %message.url, "Processing job");

        // Claim before analyzing, so pollers see "processing" while the
        // fetch is in flight.
        let processing = JobRecord::processing(&message.url);
        if let Err(e) = self.store.put(message.job_id, &processing).await {
            self.return_to_queue(&delivery).await;
            return Err(e.into());
        }

        let start = Instant::now();
        let record = self.analyze_to_record(&message).await;
        metrics::histogram!("article_processing_seconds").record(start.elapsed().as_secs_f64());

        // The terminal write must be durable before the ack; failing here
        // means no ack, so the queue will redeliver.
        if let Err(e) = self.store.put(message.job_id, &record).await {
            self.return_to_queue(&delivery).await;
            return Err(e.into());
        }

        self.queue.ack(&delivery).await?;

        tracing::info!(
            job_id = %message.job_id,
            status = %record.status,
            duration_ms = start.elapsed().as_millis(),
            "Job finished"
        );

        Ok(true)
    }

    /// Run the analysis and map its outcome to a terminal record. A
    /// collaborator failure is a domain outcome, recorded rather than
    /// retried.
    async fn analyze_to_record(&self, message: &JobMessage) -> JobRecord {
        match self.analyzer.analyze(&message.url).await {
            Ok(report) => {
                metrics::counter!("article_jobs_completed").increment(1);
                JobRecord::completed(&message.url, report)
            }
            Err(e) => {
                tracing::warn!(job_id = %message.job_id, error = %e, "Analysis failed");
                metrics::counter!("article_jobs_failed").increment(1);
                JobRecord::failed(&message.url, e.to_string())
            }
        }
    }

    /// Best-effort return of an in-flight delivery to the main queue after
    /// a transient store failure. If the requeue itself fails the delivery
    /// stays on the processing list and startup recovery will reclaim it.
    async fn return_to_queue(&self, delivery: &Delivery) {
        if let Err(e) = self.queue.requeue(delivery).await {
            tracing::warn!(error = %e, "Failed to requeue delivery, leaving it in flight");
        }
    }
}
