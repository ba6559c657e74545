use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::job::{AnalysisOutcome, JobStatus};

/// Request to submit an article URL for analysis.
#[derive(Debug, Deserialize, Validate)]
pub struct ArticleSubmission {
    #[garde(length(min = 1, max = 2048))]
    pub url: String,
}

/// Response after accepting a submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub job_id: Uuid,
}

/// Response for querying job status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub url: String,
    pub analysis: Option<AnalysisOutcome>,
}
