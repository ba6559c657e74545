//! Test helper utilities for E2E testing

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

/// Response from POST /articles
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub job_id: Uuid,
}

/// Response from GET /articles/{job_id}
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub job_id: Uuid,
    pub status: String,
    pub url: String,
    pub analysis: Option<serde_json::Value>,
}

/// Submit a URL to the articles endpoint
pub async fn submit_article(
    client: &reqwest::Client,
    base_url: &str,
    url: &str,
) -> Result<SubmissionAck, Box<dyn std::error::Error>> {
    let response = client
        .post(format!("{}/articles", base_url))
        .json(&serde_json::json!({ "url": url }))
        .send()
        .await?;

    let status = response.status();
    if status != reqwest::StatusCode::ACCEPTED {
        let error_text = response.text().await?;
        return Err(format!("Submission failed with status {}: {}", status, error_text).into());
    }

    let body = response.json::<SubmissionAck>().await?;
    Ok(body)
}

/// Poll job status until completed or failed (with timeout)
pub async fn poll_job_status(
    client: &reqwest::Client,
    base_url: &str,
    job_id: Uuid,
    timeout_secs: u64,
) -> Result<ProcessingResult, Box<dyn std::error::Error>> {
    let max_attempts = timeout_secs * 2; // Poll every 500ms

    for attempt in 0..max_attempts {
        let response = client
            .get(format!("{}/articles/{}", base_url, job_id))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(format!("Status check failed: {}", error_text).into());
        }

        let result = response.json::<ProcessingResult>().await?;

        match result.status.as_str() {
            "completed" | "failed" => return Ok(result),
            "pending" | "processing" => {
                if attempt % 10 == 0 && attempt > 0 {
                    println!("  ... still waiting (attempt {}/{})", attempt, max_attempts);
                }
                sleep(Duration::from_millis(500)).await;
            }
            other => {
                return Err(format!("Unknown job status: {}", other).into());
            }
        }
    }

    Err(format!("Job did not reach a terminal state within {} seconds", timeout_secs).into())
}
