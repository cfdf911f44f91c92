//! Analysis job pipeline: content fetch, rater fan-out, consolidation, and
//! report assembly, with progress checkpoints written to the job store.

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;
use visilens_analysis::{assemble_report, consolidate};
use visilens_core::{ContentDocument, InputType, Lexicons};
use visilens_rater::{query_raters, RaterClient};
use visilens_scraper::{ScrapeClient, ScrapeError};
use visilens_store::JobStore;

const PROGRESS_FETCHING: u8 = 10;
const PROGRESS_QUERYING: u8 = 30;
const PROGRESS_CONSOLIDATING: u8 = 60;
const PROGRESS_REPORTING: u8 = 80;

/// What polling clients see when a job fails. The underlying cause stays in
/// the server logs.
const GENERIC_FAILURE: &str = "Analysis failed";

/// Long-lived pipeline dependencies, shared across jobs.
pub struct Analyzer {
    pub scraper: ScrapeClient,
    pub rater: RaterClient,
    pub lexicons: Lexicons,
}

/// One accepted analysis request, as handed to the pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: String,
    pub input_type: InputType,
    pub raters: Vec<String>,
}

/// Run a job on the runtime and return its handle.
///
/// Callers that only need the poll endpoint as the result channel can drop
/// the handle; the task keeps running detached.
pub fn spawn_job(
    analyzer: Arc<Analyzer>,
    store: JobStore,
    job_id: Uuid,
    request: AnalysisRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        run_job(&analyzer, &store, job_id, request).await;
    })
}

/// Drive one job through every pipeline stage.
///
/// A content-fetch failure fails the job with a generic message; per-rater
/// failures are absorbed by the fan-out and the job still completes. Store
/// rejections (unknown or already-finished jobs) are logged and end the run.
async fn run_job(analyzer: &Analyzer, store: &JobStore, job_id: Uuid, request: AnalysisRequest) {
    if let Err(e) = store.set_processing(job_id, PROGRESS_FETCHING).await {
        tracing::error!(%job_id, error = %e, "job store rejected processing transition");
        return;
    }
    tracing::info!(%job_id, kind = %request.input_type, raters = request.raters.len(), "analysis job started");

    let content = match fetch_content(analyzer, &request).await {
        Ok(content) => content,
        Err(e) => {
            tracing::error!(%job_id, input = %request.input, error = %e, "content fetch failed");
            fail_job(store, job_id).await;
            return;
        }
    };
    advance(store, job_id, PROGRESS_QUERYING).await;

    let opinions = query_raters(&analyzer.rater, &content, &request.raters).await;
    advance(store, job_id, PROGRESS_CONSOLIDATING).await;

    let brand_name = match request.input_type {
        InputType::Brand => request.input.clone(),
        InputType::Url => content.title.clone(),
    };
    let result = consolidate(&opinions, &content, &brand_name, &analyzer.lexicons);
    advance(store, job_id, PROGRESS_REPORTING).await;

    let report = assemble_report(&result, &request.input, request.input_type, &analyzer.lexicons);
    match serde_json::to_value(&report) {
        Ok(value) => {
            if let Err(e) = store.complete(job_id, value).await {
                tracing::error!(%job_id, error = %e, "failed to store completed report");
            } else {
                tracing::info!(%job_id, report_id = %report.id, "analysis job completed");
            }
        }
        Err(e) => {
            tracing::error!(%job_id, error = %e, "failed to serialize report");
            fail_job(store, job_id).await;
        }
    }
}

async fn fetch_content(
    analyzer: &Analyzer,
    request: &AnalysisRequest,
) -> Result<ContentDocument, ScrapeError> {
    match request.input_type {
        InputType::Url => analyzer.scraper.fetch_url(&request.input).await,
        InputType::Brand => Ok(visilens_scraper::brand_document(&request.input)),
    }
}

async fn advance(store: &JobStore, job_id: Uuid, progress: u8) {
    if let Err(e) = store.advance_progress(job_id, progress).await {
        tracing::warn!(%job_id, error = %e, "progress update skipped");
    }
}

async fn fail_job(store: &JobStore, job_id: Uuid) {
    if let Err(e) = store.fail(job_id, GENERIC_FAILURE).await {
        tracing::error!(%job_id, error = %e, "failed to record job failure");
    }
}
