// Transport Recompute Service - re-run enrichment for stored jobs

use crate::application::address::build_complete_address;
use crate::application::enrichment::EnrichmentService;
use crate::domain::{Coordinates, Destination, ListingId, TransportMetrics};
use crate::error::{AppError, Result};
use crate::port::ListingRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Single recompute request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecomputeRequest {
    #[serde(alias = "jobId", alias = "houseId")]
    pub job_id: Option<ListingId>,
    #[serde(default)]
    pub address: String,
    #[serde(default, alias = "ort")]
    pub locality: Option<String>,
}

/// Result of one recompute
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    pub job_id: ListingId,
    pub address: String,
    pub metrics: TransportMetrics,
}

impl Recomputed {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.metrics.coordinates()
    }
}

/// Per-job entry of a bulk recompute
#[derive(Debug, Clone, PartialEq)]
pub enum RecomputeEntry {
    Done(Recomputed),
    Failed { job_id: ListingId, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkRecompute {
    pub processed: usize,
    pub results: Vec<RecomputeEntry>,
}

pub struct TransportService {
    repo: Arc<dyn ListingRepository>,
    enrichment: Option<Arc<EnrichmentService>>,
}

impl TransportService {
    pub fn new(
        repo: Arc<dyn ListingRepository>,
        enrichment: Option<Arc<EnrichmentService>>,
    ) -> Self {
        Self { repo, enrichment }
    }

    pub fn is_configured(&self) -> bool {
        self.enrichment.is_some()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.enrichment.as_deref().map(EnrichmentService::destination)
    }

    /// Recompute transport for one job from an explicit address
    ///
    /// # Errors
    /// - `AppError::Config` if enrichment is not configured
    /// - `AppError::Validation` if `job_id` or `address` is missing
    /// - `AppError::NotFound` if the job does not exist
    pub async fn recompute(&self, req: RecomputeRequest) -> Result<Recomputed> {
        let enrichment = self.enrichment()?;
        let job_id = req
            .job_id
            .ok_or_else(|| AppError::Validation("job_id is required".to_string()))?;
        if req.address.trim().is_empty() {
            return Err(AppError::Validation("address is required".to_string()));
        }

        if self.repo.find_by_id(job_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Listing {} not found", job_id)));
        }

        self.apply(enrichment, job_id, req.address.trim(), req.locality.as_deref())
            .await
    }

    /// Recompute every job with at least one unknown duration, one at a time
    ///
    /// Jobs without a stored address are skipped; per-job errors are collected.
    pub async fn recompute_missing(&self) -> Result<BulkRecompute> {
        let enrichment = self.enrichment()?;
        let jobs = self.repo.list_missing_transport().await?;
        info!(candidates = jobs.len(), "Recomputing missing transport times");

        let mut results = Vec::new();
        for job in jobs {
            let Some((address, locality)) = job.address_parts() else {
                continue;
            };
            let entry = match self.apply(enrichment, job.id, address, locality).await {
                Ok(done) => RecomputeEntry::Done(done),
                Err(e) => {
                    warn!(job_id = job.id, error = %e, "Transport recompute failed");
                    RecomputeEntry::Failed {
                        job_id: job.id,
                        error: e.to_string(),
                    }
                }
            };
            results.push(entry);
        }

        Ok(BulkRecompute {
            processed: results.len(),
            results,
        })
    }

    async fn apply(
        &self,
        enrichment: &EnrichmentService,
        job_id: ListingId,
        street_address: &str,
        locality: Option<&str>,
    ) -> Result<Recomputed> {
        let address = build_complete_address(street_address, locality);
        let metrics = enrichment.enrich(&address).await;
        self.repo.update_transport(job_id, &metrics).await?;
        info!(job_id, address = %address, "Transport times updated");
        Ok(Recomputed {
            job_id,
            address,
            metrics,
        })
    }

    fn enrichment(&self) -> Result<&EnrichmentService> {
        self.enrichment.as_deref().ok_or_else(|| {
            AppError::Config("GOOGLE_MAPS_API_KEY is not configured".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExtractedListing, TravelMode};
    use crate::port::listing_repository::mocks::InMemoryListingRepository;
    use crate::port::maps::mocks::{MockGeocoder, MockTravelPlanner};

    fn enrichment() -> Arc<EnrichmentService> {
        Arc::new(EnrichmentService::new(
            Arc::new(MockGeocoder::found(47.37, 8.53)),
            Arc::new(MockTravelPlanner::uniform("20 mins", "3.1 km")),
            Destination::default(),
        ))
    }

    async fn complete_job(repo: &InMemoryListingRepository, url: &str, listing: ExtractedListing) {
        repo.create_pending(url, 0).await.unwrap();
        repo.complete(url, &listing).await.unwrap();
    }

    #[tokio::test]
    async fn test_recompute_requires_configuration() {
        let service = TransportService::new(Arc::new(InMemoryListingRepository::new()), None);
        let req = RecomputeRequest {
            job_id: Some(1),
            address: "Musterstrasse 5".to_string(),
            locality: None,
        };

        assert!(matches!(service.recompute(req).await, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_recompute_validates_input() {
        let service =
            TransportService::new(Arc::new(InMemoryListingRepository::new()), Some(enrichment()));

        let req: RecomputeRequest = serde_json::from_str(r#"{"address": "x"}"#).unwrap();
        assert!(matches!(service.recompute(req).await, Err(AppError::Validation(_))));

        let req: RecomputeRequest = serde_json::from_str(r#"{"jobId": 1, "address": " "}"#).unwrap();
        assert!(matches!(service.recompute(req).await, Err(AppError::Validation(_))));

        let req: RecomputeRequest = serde_json::from_str(r#"{"jobId": 7, "address": "a"}"#).unwrap();
        assert!(matches!(service.recompute(req).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_recompute_is_idempotent() {
        let repo = Arc::new(InMemoryListingRepository::new());
        complete_job(&repo, "https://a", [("zimmer", "1")].into_iter().collect()).await;
        let service = TransportService::new(repo.clone(), Some(enrichment()));
        let req = RecomputeRequest {
            job_id: Some(1),
            address: "Musterstrasse 5".to_string(),
            locality: Some("8001 Zürich".to_string()),
        };

        let first = service.recompute(req.clone()).await.unwrap();
        let stored_first = repo.find_by_id(1).await.unwrap().unwrap().transport;
        let second = service.recompute(req).await.unwrap();
        let stored_second = repo.find_by_id(1).await.unwrap().unwrap().transport;

        assert_eq!(first.address, "Musterstrasse 5, 8001 Zürich");
        assert_eq!(first.metrics.transit_distance.as_deref(), Some("3.1 km"));
        assert_eq!(first, second);
        assert_eq!(stored_first, stored_second);
        assert_eq!(stored_first.duration(TravelMode::Cycling), Some("20 mins"));
    }

    #[tokio::test]
    async fn test_recompute_missing_skips_jobs_without_address() {
        let repo = Arc::new(InMemoryListingRepository::new());
        complete_job(
            &repo,
            "https://a",
            [("adresse", "Musterstrasse 5"), ("ort", "8001 Zürich")]
                .into_iter()
                .collect(),
        )
        .await;
        complete_job(&repo, "https://b", [("zimmer", "2")].into_iter().collect()).await;
        let service = TransportService::new(repo.clone(), Some(enrichment()));

        let bulk = service.recompute_missing().await.unwrap();

        assert_eq!(bulk.processed, 1);
        match &bulk.results[0] {
            RecomputeEntry::Done(done) => {
                assert_eq!(done.job_id, 1);
                assert_eq!(done.address, "Musterstrasse 5, 8001 Zürich");
            }
            other => panic!("expected success, got {:?}", other),
        }
        // Only job b is still missing
        let missing = repo.list_missing_transport().await.unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].url, "https://b");
    }

    #[tokio::test]
    async fn test_recompute_missing_collects_errors() {
        let repo = Arc::new(InMemoryListingRepository::new());
        complete_job(
            &repo,
            "https://a",
            [("adresse", "Musterstrasse 5")].into_iter().collect(),
        )
        .await;
        let service = TransportService::new(repo.clone(), Some(enrichment()));
        repo.set_fail_writes(true);

        let bulk = service.recompute_missing().await.unwrap();

        assert_eq!(bulk.processed, 1);
        assert!(matches!(
            &bulk.results[0],
            RecomputeEntry::Failed { job_id: 1, error } if error.contains("injected")
        ));
    }
}
