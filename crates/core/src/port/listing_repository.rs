// Listing Repository Port (Persistence Gateway)

use crate::domain::{ExtractedListing, JobStatus, ListingId, ListingJob, TransportMetrics};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for listing job persistence
///
/// Every operation is atomic at the single-row level. The URL column is unique.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a Pending job for `url`
    ///
    /// # Returns
    /// `true` if a row was created, `false` if a job for this URL already exists
    async fn create_pending(&self, url: &str, scraped_at: i64) -> Result<bool>;

    /// Find job by source URL
    async fn get_by_url(&self, url: &str) -> Result<Option<ListingJob>>;

    /// Find job by ID
    async fn find_by_id(&self, id: ListingId) -> Result<Option<ListingJob>>;

    /// Pending -> Complete, storing the extracted listing
    ///
    /// # Errors
    /// - `AppError::NotFound` if no job exists for the URL
    /// - `AppError::InvalidState` if the job is already terminal
    async fn complete(&self, url: &str, listing: &ExtractedListing) -> Result<()>;

    /// Pending -> Failed
    async fn fail(&self, url: &str) -> Result<()>;

    /// Overwrite the persisted transport fields (durations + coordinates)
    async fn update_transport(&self, id: ListingId, metrics: &TransportMetrics) -> Result<()>;

    /// Jobs with at least one unknown travel duration
    async fn list_missing_transport(&self) -> Result<Vec<ListingJob>>;

    /// All jobs, liked first, newest first
    async fn list_all(&self) -> Result<Vec<ListingJob>>;

    async fn set_liked(&self, id: ListingId, liked: bool) -> Result<ListingJob>;

    async fn set_done(&self, id: ListingId, done: bool) -> Result<ListingJob>;

    async fn delete(&self, id: ListingId) -> Result<()>;

    async fn count_by_status(&self, status: JobStatus) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::DomainError;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory repository with the same transition rules as the SQLite adapter
    #[derive(Default)]
    pub struct InMemoryListingRepository {
        jobs: Mutex<Vec<ListingJob>>,
        fail_writes: AtomicBool,
    }

    impl InMemoryListingRepository {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent write fail with a database error
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        pub fn len(&self) -> usize {
            self.jobs.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn check_writable(&self) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(AppError::Database("injected write failure".to_string()));
            }
            Ok(())
        }

        fn with_url<T>(
            &self,
            url: &str,
            f: impl FnOnce(&mut ListingJob) -> Result<T>,
        ) -> Result<T> {
            self.check_writable()?;
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| j.url == url)
                .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", url)))?;
            f(job)
        }

        fn with_id<T>(
            &self,
            id: ListingId,
            f: impl FnOnce(&mut ListingJob) -> Result<T>,
        ) -> Result<T> {
            self.check_writable()?;
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .iter_mut()
                .find(|j| j.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", id)))?;
            f(job)
        }
    }

    fn terminal_error(job: &ListingJob, to: JobStatus) -> AppError {
        AppError::InvalidState(format!(
            "Cannot update listing {} from {} to {}",
            job.url, job.status, to
        ))
    }

    #[async_trait]
    impl ListingRepository for InMemoryListingRepository {
        async fn create_pending(&self, url: &str, scraped_at: i64) -> Result<bool> {
            self.check_writable()?;
            let mut jobs = self.jobs.lock().unwrap();
            if jobs.iter().any(|j| j.url == url) {
                return Ok(false);
            }
            let id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;
            jobs.push(ListingJob::pending(id, url, scraped_at));
            Ok(true)
        }

        async fn get_by_url(&self, url: &str) -> Result<Option<ListingJob>> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().find(|j| j.url == url).cloned())
        }

        async fn find_by_id(&self, id: ListingId) -> Result<Option<ListingJob>> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().find(|j| j.id == id).cloned())
        }

        async fn complete(&self, url: &str, listing: &ExtractedListing) -> Result<()> {
            if listing.is_empty() {
                return Err(DomainError::EmptyListing.into());
            }
            self.with_url(url, |job| {
                if job.status.is_terminal() {
                    return Err(terminal_error(job, JobStatus::Complete));
                }
                job.complete(listing.clone())?;
                Ok(())
            })
        }

        async fn fail(&self, url: &str) -> Result<()> {
            self.with_url(url, |job| {
                if job.status.is_terminal() {
                    return Err(terminal_error(job, JobStatus::Failed));
                }
                job.fail()?;
                Ok(())
            })
        }

        async fn update_transport(&self, id: ListingId, metrics: &TransportMetrics) -> Result<()> {
            self.with_id(id, |job| {
                job.transport = metrics.persisted();
                Ok(())
            })
        }

        async fn list_missing_transport(&self) -> Result<Vec<ListingJob>> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .iter()
                .filter(|j| j.transport.is_missing_durations())
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> Result<Vec<ListingJob>> {
            let mut jobs = self.jobs.lock().unwrap().clone();
            jobs.sort_by(|a, b| {
                b.liked
                    .cmp(&a.liked)
                    .then(b.scraped_at.cmp(&a.scraped_at))
                    .then(b.id.cmp(&a.id))
            });
            Ok(jobs)
        }

        async fn set_liked(&self, id: ListingId, liked: bool) -> Result<ListingJob> {
            self.with_id(id, |job| {
                job.liked = liked;
                Ok(job.clone())
            })
        }

        async fn set_done(&self, id: ListingId, done: bool) -> Result<ListingJob> {
            self.with_id(id, |job| {
                job.done = done;
                Ok(job.clone())
            })
        }

        async fn delete(&self, id: ListingId) -> Result<()> {
            self.check_writable()?;
            let mut jobs = self.jobs.lock().unwrap();
            let before = jobs.len();
            jobs.retain(|j| j.id != id);
            if jobs.len() == before {
                return Err(AppError::NotFound(format!("Listing {} not found", id)));
            }
            Ok(())
        }

        async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.iter().filter(|j| j.status == status).count() as i64)
        }
    }
}
