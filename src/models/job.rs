use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of an article analysis job in the async queue.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states never transition to anything else.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Message carried on the job queue, created once at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobMessage {
    pub job_id: Uuid,
    pub url: String,
}

/// Counts produced by a successful analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisReport {
    pub word_count: u64,
    pub character_count: u64,
}

/// Outcome attached to a terminal record: either the report or the
/// collaborator's error message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(AnalysisReport),
    Failure { error: String },
}

/// Full status record stored per job. The `job_id` is the store key,
/// not part of the value. Every write is a whole-record replacement,
/// which is what makes duplicate queue delivery safe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobRecord {
    pub status: JobStatus,
    pub url: String,
    pub analysis: Option<AnalysisOutcome>,
}

impl JobRecord {
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Pending,
            url: url.into(),
            analysis: None,
        }
    }

    pub fn processing(url: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Processing,
            url: url.into(),
            analysis: None,
        }
    }

    pub fn completed(url: impl Into<String>, report: AnalysisReport) -> Self {
        Self {
            status: JobStatus::Completed,
            url: url.into(),
            analysis: Some(AnalysisOutcome::Report(report)),
        }
    }

    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            url: url.into(),
            analysis: Some(AnalysisOutcome::Failure {
                error: error.into(),
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&JobStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&JobStatus::Processing).unwrap(), "\"processing\"");
        assert_eq!(serde_json::to_string(&JobStatus::Completed).unwrap(), "\"completed\"");
        assert_eq!(serde_json::to_string(&JobStatus::Failed).unwrap(), "\"failed\"");
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_message_wire_shape() {
        let msg = JobMessage {
            job_id: "6f261a96-5f22-4cbc-9eab-5a7d80fdbdd0".parse().unwrap(),
            url: "https://example.com/a".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "job_id": "6f261a96-5f22-4cbc-9eab-5a7d80fdbdd0",
                "url": "https://example.com/a",
            })
        );
    }

    #[test]
    fn test_processing_record_wire_shape() {
        let record = JobRecord::processing("https://example.com/a");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "processing",
                "url": "https://example.com/a",
                "analysis": null,
            })
        );
    }

    #[test]
    fn test_completed_record_wire_shape() {
        let record = JobRecord::completed(
            "https://example.com/a",
            AnalysisReport {
                word_count: 42,
                character_count: 280,
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "completed",
                "url": "https://example.com/a",
                "analysis": { "word_count": 42, "character_count": 280 },
            })
        );
    }

    #[test]
    fn test_failed_record_wire_shape() {
        let record = JobRecord::failed("https://example.com/a", "connection timed out");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "status": "failed",
                "url": "https://example.com/a",
                "analysis": { "error": "connection timed out" },
            })
        );
    }

    #[test]
    fn test_record_round_trip_preserves_outcome() {
        let record = JobRecord::failed("https://example.com/a", "boom");
        let parsed: JobRecord =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(parsed, record);
        assert!(matches!(
            parsed.analysis,
            Some(AnalysisOutcome::Failure { ref error }) if error == "boom"
        ));
    }
}
