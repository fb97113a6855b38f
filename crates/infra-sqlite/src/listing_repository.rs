// SQLite ListingRepository Implementation

use async_trait::async_trait;
use flatscout_core::domain::{
    DomainError, ExtractedListing, JobStatus, ListingId, ListingJob, TransportMetrics,
};
use flatscout_core::error::{AppError, Result};
use flatscout_core::port::ListingRepository;
use sqlx::SqlitePool;
use tracing::debug;

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "275" => AppError::Database(format!(
                        "Check constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        // Connection, pool, protocol errors
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteListingRepository {
    pool: SqlitePool,
}

impl SqliteListingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Terminal transition guarded on `status = 'pending'`
    async fn finish(&self, url: &str, to: JobStatus, content: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE scraped_data
            SET status = ?, content = ?
            WHERE url = ? AND status = ?
            "#,
        )
        .bind(to.as_str())
        .bind(content)
        .bind(url)
        .bind(JobStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            debug!(url = %url, status = %to, "Listing finished");
            return Ok(());
        }

        // Job might not exist or already be terminal
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM scraped_data WHERE url = ?")
                .bind(url)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        match current {
            None => Err(AppError::NotFound(format!("Listing {} not found", url))),
            Some(current) => Err(AppError::InvalidState(format!(
                "Cannot update listing {} from {} to {}",
                url, current, to
            ))),
        }
    }

    async fn update_flag(&self, id: ListingId, column: Flag, value: bool) -> Result<ListingJob> {
        let sql = format!(
            "UPDATE scraped_data SET {} = ? WHERE id = ? RETURNING *",
            column.as_str()
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(value)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_job(),
            None => Err(AppError::NotFound(format!("Listing {} not found", id))),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Flag {
    Liked,
    Done,
}

impl Flag {
    fn as_str(self) -> &'static str {
        match self {
            Flag::Liked => "liked",
            Flag::Done => "done",
        }
    }
}

#[async_trait]
impl ListingRepository for SqliteListingRepository {
    async fn create_pending(&self, url: &str, scraped_at: i64) -> Result<bool> {
        // Single-flight: the unique URL decides which caller created the row
        let result = sqlx::query(
            r#"
            INSERT INTO scraped_data (url, content, scraped_at, status)
            VALUES (?, '{}', ?, ?)
            ON CONFLICT(url) DO NOTHING
            "#,
        )
        .bind(url)
        .bind(scraped_at)
        .bind(JobStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<ListingJob>> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT * FROM scraped_data WHERE url = ?")
            .bind(url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ListingRow::into_job).transpose()
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<ListingJob>> {
        let row = sqlx::query_as::<_, ListingRow>("SELECT * FROM scraped_data WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ListingRow::into_job).transpose()
    }

    async fn complete(&self, url: &str, listing: &ExtractedListing) -> Result<()> {
        if listing.is_empty() {
            return Err(DomainError::EmptyListing.into());
        }
        let content = listing.to_json()?;
        self.finish(url, JobStatus::Complete, &content).await
    }

    async fn fail(&self, url: &str) -> Result<()> {
        self.finish(url, JobStatus::Failed, "{}").await
    }

    async fn update_transport(&self, id: ListingId, metrics: &TransportMetrics) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE scraped_data
            SET walking_time = ?, transit_time = ?, cycling_time = ?,
                latitude = ?, longitude = ?
            WHERE id = ?
            "#,
        )
        .bind(&metrics.walking_time)
        .bind(&metrics.transit_time)
        .bind(&metrics.cycling_time)
        .bind(metrics.latitude)
        .bind(metrics.longitude)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Listing {} not found", id)));
        }
        Ok(())
    }

    async fn list_missing_transport(&self) -> Result<Vec<ListingJob>> {
        let rows: Vec<ListingRow> = sqlx::query_as(
            r#"
            SELECT * FROM scraped_data
            WHERE walking_time IS NULL OR transit_time IS NULL OR cycling_time IS NULL
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(ListingRow::into_job).collect()
    }

    async fn list_all(&self) -> Result<Vec<ListingJob>> {
        let rows: Vec<ListingRow> = sqlx::query_as(
            r#"
            SELECT * FROM scraped_data
            ORDER BY liked DESC, scraped_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(ListingRow::into_job).collect()
    }

    async fn set_liked(&self, id: ListingId, liked: bool) -> Result<ListingJob> {
        self.update_flag(id, Flag::Liked, liked).await
    }

    async fn set_done(&self, id: ListingId, done: bool) -> Result<ListingJob> {
        self.update_flag(id, Flag::Done, done).await
    }

    async fn delete(&self, id: ListingId) -> Result<()> {
        let result = sqlx::query("DELETE FROM scraped_data WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Listing {} not found", id)));
        }
        Ok(())
    }

    async fn count_by_status(&self, status: JobStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scraped_data WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    url: String,
    content: String,
    scraped_at: i64,
    liked: bool,
    status: String,
    done: bool,

    walking_time: Option<String>,
    transit_time: Option<String>,
    cycling_time: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl ListingRow {
    fn into_job(self) -> Result<ListingJob> {
        let status: JobStatus = self.status.parse().map_err(|e: DomainError| {
            AppError::Database(format!("Corrupt status for listing {}: {}", self.id, e))
        })?;

        // `{}` placeholder content is never exposed as a listing
        let listing = match status {
            JobStatus::Complete => Some(ExtractedListing::from_json(&self.content)?),
            JobStatus::Pending | JobStatus::Failed => None,
        };

        Ok(ListingJob {
            id: self.id,
            url: self.url,
            status,
            listing,
            scraped_at: self.scraped_at,
            liked: self.liked,
            done: self.done,
            transport: TransportMetrics {
                walking_time: self.walking_time,
                transit_time: self.transit_time,
                cycling_time: self.cycling_time,
                latitude: self.latitude,
                longitude: self.longitude,
                ..TransportMetrics::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use flatscout_core::domain::{Coordinates, TravelEstimate, TravelMode};
    use std::sync::Arc;

    const URL: &str = "https://www.wgzimmer.ch/wglink/de/1.html";

    async fn setup_repo() -> SqliteListingRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteListingRepository::new(pool)
    }

    fn listing() -> ExtractedListing {
        let mut listing: ExtractedListing = [
            ("miete_/_monat", "CHF 1200"),
            ("adresse", "Musterstrasse 5"),
            ("ort", "8001 Zürich"),
        ]
        .into_iter()
        .collect();
        listing.insert_absent("region");
        listing
    }

    #[tokio::test]
    async fn test_create_pending_is_single_flight() {
        let repo = setup_repo().await;

        assert!(repo.create_pending(URL, 1_000).await.unwrap());
        assert!(!repo.create_pending(URL, 2_000).await.unwrap());

        let job = repo.get_by_url(URL).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.scraped_at, 1_000);
        assert!(job.listing.is_none());
        assert_eq!(repo.count_by_status(JobStatus::Pending).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_create_pending_inserts_once() {
        let repo = Arc::new(setup_repo().await);

        let attempts = (0..8).map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move { repo.create_pending(URL, i).await.unwrap() })
        });
        let created: Vec<bool> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(created.iter().filter(|c| **c).count(), 1);
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_complete_round_trips_listing() {
        let repo = setup_repo().await;
        repo.create_pending(URL, 1_000).await.unwrap();

        repo.complete(URL, &listing()).await.unwrap();

        let job = repo.get_by_url(URL).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        // Absent values survive storage
        assert_eq!(job.listing, Some(listing()));
    }

    #[tokio::test]
    async fn test_terminal_rows_reject_transitions() {
        let repo = setup_repo().await;
        repo.create_pending(URL, 1_000).await.unwrap();
        repo.fail(URL).await.unwrap();

        assert!(matches!(
            repo.complete(URL, &listing()).await,
            Err(AppError::InvalidState(_))
        ));
        assert!(matches!(repo.fail(URL).await, Err(AppError::InvalidState(_))));
        assert!(matches!(
            repo.fail("https://missing").await,
            Err(AppError::NotFound(_))
        ));

        let job = repo.get_by_url(URL).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.listing.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing_is_rejected() {
        let repo = setup_repo().await;
        repo.create_pending(URL, 1_000).await.unwrap();

        let result = repo.complete(URL, &ExtractedListing::new()).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::EmptyListing))
        ));
    }

    #[tokio::test]
    async fn test_update_transport_and_missing_list() {
        let repo = setup_repo().await;
        repo.create_pending(URL, 1_000).await.unwrap();
        repo.complete(URL, &listing()).await.unwrap();
        let id = repo.get_by_url(URL).await.unwrap().unwrap().id;
        assert_eq!(repo.list_missing_transport().await.unwrap().len(), 1);

        let mut metrics = TransportMetrics::default();
        metrics.set_coordinates(Coordinates {
            lat: 47.37,
            lng: 8.54,
        });
        for mode in TravelMode::ALL {
            metrics.set_estimate(
                mode,
                TravelEstimate {
                    duration: Some("10 mins".to_string()),
                    distance: Some("1 km".to_string()),
                },
            );
        }
        repo.update_transport(id, &metrics).await.unwrap();

        let job = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(job.transport, metrics.persisted());
        assert!(repo.list_missing_transport().await.unwrap().is_empty());

        assert!(matches!(
            repo.update_transport(999, &metrics).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_flags_ordering_and_delete() {
        let repo = setup_repo().await;
        repo.create_pending("https://a", 1_000).await.unwrap();
        repo.create_pending("https://b", 2_000).await.unwrap();
        repo.create_pending("https://c", 3_000).await.unwrap();
        let a = repo.get_by_url("https://a").await.unwrap().unwrap().id;

        let liked = repo.set_liked(a, true).await.unwrap();
        assert!(liked.liked);
        let done = repo.set_done(a, true).await.unwrap();
        assert!(done.done && done.liked);

        let urls: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.url)
            .collect();
        assert_eq!(urls, vec!["https://a", "https://c", "https://b"]);

        repo.delete(a).await.unwrap();
        assert!(repo.find_by_id(a).await.unwrap().is_none());
        assert!(matches!(repo.delete(a).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.set_liked(a, false).await,
            Err(AppError::NotFound(_))
        ));
    }
}
