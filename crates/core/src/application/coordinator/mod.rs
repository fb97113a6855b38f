// Job Coordinator - single-flight submission and job queries

pub mod submit;


pub use submit::{validate_request, SubmitOutcome, SubmitRequest};

use crate::application::pipeline::ScrapePipeline;
use crate::application::worker::UnitSpawner;
use crate::domain::{JobStatus, ListingId, ListingJob};
use crate::error::{AppError, Result};
use crate::port::{ListingRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Job counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub total: i64,
    pub pending: i64,
    pub complete: i64,
    pub failed: i64,
}

/// Owns the per-URL state machine
///
/// Single-flight is enforced by the repository's unique URL: only the caller whose
/// `create_pending` inserted the row launches a unit.
pub struct JobCoordinator {
    repo: Arc<dyn ListingRepository>,
    pipeline: Arc<ScrapePipeline>,
    spawner: UnitSpawner,
    time_provider: Arc<dyn TimeProvider>,
}

impl JobCoordinator {
    pub fn new(
        repo: Arc<dyn ListingRepository>,
        pipeline: Arc<ScrapePipeline>,
        spawner: UnitSpawner,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            pipeline,
            spawner,
            time_provider,
        }
    }

    /// Submit a URL
    ///
    /// Creates a Pending job and launches its unit without awaiting it, or returns
    /// the existing job's status with no side effect.
    pub async fn submit(&self, req: SubmitRequest) -> Result<SubmitOutcome> {
        let url = validate_request(&req)?;

        let scraped_at = self.time_provider.now_millis();
        if self.repo.create_pending(&url, scraped_at).await? {
            info!(url = %url, "Accepted new listing");
            let pipeline = Arc::clone(&self.pipeline);
            let unit_url = url.clone();
            self.spawner
                .spawn(url, async move { pipeline.run(&unit_url).await });
            return Ok(SubmitOutcome::Pending);
        }

        let job = self.repo.get_by_url(&url).await?.ok_or_else(|| {
            // Deleted between the insert attempt and this read
            AppError::InvalidState(format!("Listing {} was removed concurrently", url))
        })?;
        debug!(url = %url, status = %job.status, "Listing already known");
        Ok(SubmitOutcome::from_existing(job))
    }

    /// Current job for a URL (no side effects)
    pub async fn query(&self, url: &str) -> Result<Option<ListingJob>> {
        self.repo.get_by_url(url.trim()).await
    }

    /// All jobs, liked first, newest first
    pub async fn list(&self) -> Result<Vec<ListingJob>> {
        self.repo.list_all().await
    }

    pub async fn set_liked(&self, id: ListingId, liked: bool) -> Result<ListingJob> {
        let job = self.repo.set_liked(id, liked).await?;
        info!(job_id = id, liked, "Updated liked flag");
        Ok(job)
    }

    pub async fn set_done(&self, id: ListingId, done: bool) -> Result<ListingJob> {
        let job = self.repo.set_done(id, done).await?;
        info!(job_id = id, done, "Updated done flag");
        Ok(job)
    }

    pub async fn delete(&self, id: ListingId) -> Result<()> {
        self.repo.delete(id).await?;
        info!(job_id = id, "Deleted listing");
        Ok(())
    }

    pub async fn counts(&self) -> Result<JobCounts> {
        let pending = self.repo.count_by_status(JobStatus::Pending).await?;
        let complete = self.repo.count_by_status(JobStatus::Complete).await?;
        let failed = self.repo.count_by_status(JobStatus::Failed).await?;
        Ok(JobCounts {
            total: pending + complete + failed,
            pending,
            complete,
            failed,
        })
    }

    /// Units launched but not yet finished
    pub fn in_flight(&self) -> usize {
        self.spawner.in_flight()
    }
}
