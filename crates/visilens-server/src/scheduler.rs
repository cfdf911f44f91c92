//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring job-retention sweep.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use visilens_store::JobStore;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    store: JobStore,
    retention_hours: u64,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_retention_sweep(&scheduler, store, retention_hours).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register an hourly sweep that drops finished jobs older than the
/// configured retention window. Runs at the top of every hour.
async fn register_retention_sweep(
    scheduler: &JobScheduler,
    store: JobStore,
    retention_hours: u64,
) -> Result<(), JobSchedulerError> {
    // Absurdly large configured windows clamp to a year rather than overflow.
    let retention = i64::try_from(retention_hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .unwrap_or_else(|| chrono::Duration::hours(24 * 365));

    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let store = store.clone();

        Box::pin(async move {
            let pruned = store.prune_finished(retention).await;
            if pruned > 0 {
                tracing::info!(pruned, "scheduler: dropped finished jobs past retention");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
