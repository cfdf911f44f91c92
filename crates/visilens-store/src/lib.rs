//! In-memory job store shared between HTTP handlers and pipeline tasks.
//!
//! Progress is monotonic and terminal states are sticky: late or out-of-order
//! writes from a finished pipeline are rejected with [`StoreError::Finished`]
//! instead of clobbering the record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One analysis job. The report is stored opaquely so the store stays
/// independent of report schema changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub report: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job not found: {0}")]
    NotFound(Uuid),

    #[error("job {id} already finished as {status}")]
    Finished { id: Uuid, status: JobStatus },
}

/// Shared handle to the job table. Clones are cheap and observe the same state.
#[derive(Debug, Clone, Default)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
}

impl JobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending job at progress 0 and return its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let record = JobRecord {
            id,
            status: JobStatus::Pending,
            progress: 0,
            report: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().await.insert(id, record);
        id
    }

    /// Snapshot of one job record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for unknown ids.
    pub async fn get(&self, id: Uuid) -> Result<JobRecord, StoreError> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// Move a job into `processing` at the given progress checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for unknown ids, `StoreError::Finished`
    /// if the job already reached a terminal state.
    pub async fn set_processing(&self, id: Uuid, progress: u8) -> Result<(), StoreError> {
        self.update(id, |job| {
            job.status = JobStatus::Processing;
            job.progress = job.progress.max(progress.min(100));
        })
        .await
    }

    /// Raise a job's progress. Values below the current progress are ignored,
    /// values above 100 are clamped.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for unknown ids, `StoreError::Finished`
    /// if the job already reached a terminal state.
    pub async fn advance_progress(&self, id: Uuid, progress: u8) -> Result<(), StoreError> {
        self.update(id, |job| job.progress = job.progress.max(progress.min(100)))
            .await
    }

    /// Attach the finished report and mark the job completed at progress 100.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for unknown ids, `StoreError::Finished`
    /// if the job already reached a terminal state.
    pub async fn complete(&self, id: Uuid, report: serde_json::Value) -> Result<(), StoreError> {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.progress = 100;
            job.report = Some(report);
        })
        .await
    }

    /// Mark the job failed with a user-facing message. Progress is forced to
    /// 100: the pipeline is over, nothing more will happen to this job.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` for unknown ids, `StoreError::Finished`
    /// if the job already reached a terminal state.
    pub async fn fail(&self, id: Uuid, message: &str) -> Result<(), StoreError> {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.progress = 100;
            job.error = Some(message.to_string());
        })
        .await
    }

    /// Drop finished jobs whose last update is older than `older_than`.
    /// Pending and processing jobs are never pruned. Returns the number of
    /// jobs removed.
    pub async fn prune_finished(&self, older_than: Duration) -> usize {
        let cutoff = Utc::now() - older_than;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !(job.status.is_terminal() && job.updated_at < cutoff));
        before - jobs.len()
    }

    /// Number of jobs currently held.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    async fn update(
        &self,
        id: Uuid,
        mutate: impl FnOnce(&mut JobRecord),
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if job.status.is_terminal() {
            return Err(StoreError::Finished {
                id,
                status: job.status,
            });
        }
        mutate(job);
        job.updated_at = Utc::now();
        Ok(())
    }
}
