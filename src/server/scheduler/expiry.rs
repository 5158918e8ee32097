use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{error::AppError, service::expiry::ExpiryService, state::AppState};

/// Every minute, on the minute.
const SWEEP_SCHEDULE: &str = "0 * * * * *";

/// Owns the cron scheduler running the ticket sweep so it can be stopped on shutdown.
pub struct ExpiryScheduler {
    scheduler: JobScheduler,
}

impl ExpiryScheduler {
    /// Starts the expiry scheduler
    ///
    /// Each run sweeps open tickets (reminders, auto-close, orphaned channels) and prunes
    /// resolved confirmation gates.
    ///
    /// # Arguments
    /// - `state`: Shared application state the job runs against
    pub async fn start(state: AppState) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _lock| {
            let state = state.clone();

            Box::pin(async move {
                run_sweep(&state).await;
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        tracing::info!("Ticket expiry scheduler started");

        Ok(Self { scheduler })
    }

    pub async fn shutdown(mut self) -> Result<(), AppError> {
        self.scheduler.shutdown().await?;
        tracing::info!("Ticket expiry scheduler stopped");

        Ok(())
    }
}

async fn run_sweep(state: &AppState) {
    match ExpiryService::new(state).sweep(Utc::now()).await {
        Ok(report) => {
            if !report.failed.is_empty() {
                tracing::warn!("Sweep failed for {:?}", report.failed);
            }
            tracing::debug!(
                "Sweep reminded {}, closed {}, orphaned {}",
                report.reminded.len(),
                report.closed.len(),
                report.orphaned.len()
            );
        }
        Err(e) => tracing::error!("Error sweeping tickets: {}", e),
    }

    let pruned = state.gates.prune().await;
    if pruned > 0 {
        tracing::debug!("Pruned {} confirmation gates", pruned);
    }
}
