//! Analysis job endpoints: submit an input for analysis, poll for the
//! finished report.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use visilens_core::InputType;
use visilens_rater::default_raters;
use visilens_store::JobStatus;

use crate::middleware::RequestId;
use crate::pipeline::{spawn_job, AnalysisRequest};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateAnalysisRequest {
    pub input: String,
    pub input_type: String,
    #[serde(default)]
    pub raters: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedAnalysis {
    job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub(super) struct JobStatusResponse {
    status: JobStatus,
    progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<AnalysisOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct AnalysisOutcome {
    report: serde_json::Value,
    metadata: OutcomeMetadata,
}

#[derive(Debug, Serialize)]
pub(super) struct OutcomeMetadata {
    analysis_date: DateTime<Utc>,
}

/// POST /api/v1/analyses — accept an analysis job and return its id.
pub(super) async fn create_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateAnalysisRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CreatedAnalysis>>), ApiError> {
    let rid = &req_id.0;

    let input = body.input.trim().to_owned();
    if input.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "input must not be empty",
        ));
    }
    let Some(input_type) = InputType::from_name(&body.input_type) else {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("input_type must be 'url' or 'brand', got '{}'", body.input_type),
        ));
    };
    let raters = normalize_raters(&body.raters);

    let job_id = state.store.create().await;
    let request = AnalysisRequest {
        input,
        input_type,
        raters,
    };
    tracing::info!(%job_id, kind = %input_type, "accepted analysis job");

    // Detach: the poll endpoint is the only result channel.
    drop(spawn_job(
        Arc::clone(&state.analyzer),
        state.store.clone(),
        job_id,
        request,
    ));

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: CreatedAnalysis { job_id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/analyses/{job_id} — current status, plus the report once
/// the job completes.
pub(super) async fn get_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ApiResponse<JobStatusResponse>>, ApiError> {
    let job = match state.store.get(job_id).await {
        Ok(job) => job,
        Err(e) => return Err(ApiError::new(req_id.0, "not_found", e.to_string())),
    };

    let result = match (job.status, job.report) {
        (JobStatus::Completed, Some(report)) => Some(AnalysisOutcome {
            report,
            metadata: OutcomeMetadata {
                analysis_date: job.created_at,
            },
        }),
        _ => None,
    };

    Ok(Json(ApiResponse {
        data: JobStatusResponse {
            status: job.status,
            progress: job.progress,
            result,
            error: job.error,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Trim, drop empties, and dedupe the requested rater ids, preserving
/// request order. An empty request falls back to the default rater set.
fn normalize_raters(requested: &[String]) -> Vec<String> {
    let mut raters: Vec<String> = Vec::new();
    for id in requested {
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        if !raters.iter().any(|existing| existing == id) {
            raters.push(id.to_owned());
        }
    }

    if raters.is_empty() {
        default_raters()
    } else {
        raters
    }
}
