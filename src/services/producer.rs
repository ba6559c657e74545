//! Submission side of the job lifecycle.
//!
//! `submit` validates the URL, writes the initial `pending` record, then
//! enqueues the job message. The pending write comes first: if the worker
//! could dequeue before it landed, the producer's write would clobber a
//! later record and break the status ordering contract. Only after the
//! enqueue round-trip is acknowledged does the caller get a job id.

use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::models::article::ProcessingResult;
use crate::models::job::{JobMessage, JobRecord};
use crate::services::queue::{JobQueue, QueueError};
use crate::services::store::{StatusStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid article URL: {0}")]
    InvalidUrl(String),

    #[error("failed to enqueue job: {0}")]
    Enqueue(#[from] QueueError),

    #[error("failed to record job status: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("no job found for id {0}")]
    NotFound(Uuid),

    #[error("failed to read job status: {0}")]
    Store(#[from] StoreError),
}

/// Accepts submissions and answers status polls.
pub struct Producer {
    queue: Arc<JobQueue>,
    store: Arc<StatusStore>,
}

impl Producer {
    pub fn new(queue: Arc<JobQueue>, store: Arc<StatusStore>) -> Self {
        Self { queue, store }
    }

    /// Submit a URL for analysis, returning the job id to poll.
    pub async fn submit(&self, url: &str) -> Result<Uuid, SubmitError> {
        let url = validate_url(url)?;
        let job_id = Uuid::new_v4();

        self.store
            .put(job_id, &JobRecord::pending(url.as_str()))
            .await?;

        let message = JobMessage {
            job_id,
            url: url.into(),
        };
        if let Err(e) = self.queue.enqueue(&message).await {
            // Roll back the pending record so a failed submission leaves no
            // trace. If the cleanup fails too, the orphan record is harmless
            // because its id is never returned.
            if let Err(cleanup) = self.store.remove(job_id).await {
                tracing::warn!(
                    job_id = %job_id,
                    error = %cleanup,
                    "Failed to remove pending record after enqueue failure"
                );
            }
            return Err(SubmitError::Enqueue(e));
        }

        metrics::counter!("article_jobs_submitted").increment(1);
        tracing::info!(job_id = %job_id, url = %message.url, "Job accepted and enqueued");

        Ok(job_id)
    }

    /// Look up the current status of a job.
    pub async fn status(&self, job_id: Uuid) -> Result<ProcessingResult, LookupError> {
        let record = self
            .store
            .get(job_id)
            .await?
            .ok_or(LookupError::NotFound(job_id))?;

        Ok(ProcessingResult {
            job_id,
            status: record.status,
            url: record.url,
            analysis: record.analysis,
        })
    }
}

/// Require a syntactically valid absolute http/https URL with a host.
/// Returns the parsed, normalized form.
fn validate_url(raw: &str) -> Result<Url, SubmitError> {
    let url = Url::parse(raw).map_err(|e| SubmitError::InvalidUrl(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SubmitError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(SubmitError::InvalidUrl("URL has no host".to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("http://example.com/a").is_ok());
        assert!(validate_url("https://example.com/a?q=1#frag").is_ok());
    }

    #[test]
    fn test_rejects_relative_url() {
        assert!(matches!(
            validate_url("/articles/latest"),
            Err(SubmitError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            validate_url("ftp://example.com/file"),
            Err(SubmitError::InvalidUrl(_))
        ));
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(SubmitError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            validate_url("not a url"),
            Err(SubmitError::InvalidUrl(_))
        ));
        assert!(matches!(validate_url(""), Err(SubmitError::InvalidUrl(_))));
    }

    #[test]
    fn test_normalizes_parsed_form() {
        let url = validate_url("HTTPS://Example.COM/path").unwrap();
        assert_eq!(url.as_str(), "https://example.com/path");
    }
}
