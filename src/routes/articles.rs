use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use garde::Validate;
use serde_json::json;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::article::{ArticleSubmission, SubmissionAck};
use crate::services::producer::{LookupError, SubmitError};

/// POST /articles — submit an article URL for asynchronous analysis.
///
/// Returns 202 Accepted with the job id to poll; the analysis itself has
/// not started yet.
pub async fn submit_article(
    State(state): State<AppState>,
    Json(submission): Json<ArticleSubmission>,
) -> Response {
    if let Err(report) = submission.validate() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", report.to_string());
    }

    match state.producer.submit(&submission.url).await {
        Ok(job_id) => (StatusCode::ACCEPTED, Json(SubmissionAck { job_id })).into_response(),
        Err(e) => submit_error_response(e),
    }
}

/// GET /articles/{job_id} — poll the status of a submitted job.
pub async fn get_analysis_result(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Response {
    match state.producer.status(job_id).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(LookupError::NotFound(id)) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no job found for id {id}"),
        ),
        Err(e @ LookupError::Store(_)) => {
            tracing::error!(job_id = %job_id, error = %e, "Status lookup failed");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                e.to_string(),
            )
        }
    }
}

fn submit_error_response(err: SubmitError) -> Response {
    match err {
        SubmitError::InvalidUrl(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        SubmitError::Enqueue(e) => {
            tracing::error!(error = %e, "Enqueue failed");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "queue_unavailable",
                e.to_string(),
            )
        }
        SubmitError::Store(e) => {
            tracing::error!(error = %e, "Status store write failed");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                e.to_string(),
            )
        }
    }
}

fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_maps_to_400() {
        let resp = submit_error_response(SubmitError::InvalidUrl("bad scheme".to_string()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_enqueue_failure_maps_to_503() {
        let err = SubmitError::Enqueue(crate::services::queue::QueueError::Serialize(
            serde_json::from_str::<serde_json::Value>("").unwrap_err(),
        ));
        let resp = submit_error_response(err);
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_store_failure_maps_to_503() {
        let err = SubmitError::Store(crate::services::store::StoreError::Serialize(
            serde_json::from_str::<serde_json::Value>("").unwrap_err(),
        ));
        let resp = submit_error_response(err);
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
