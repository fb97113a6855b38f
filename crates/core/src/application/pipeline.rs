// Scrape Pipeline - the background unit of work for one URL
//
// fetch -> extract -> (address? normalize + enrich) -> persist

use crate::application::address::build_complete_address;
use crate::application::enrichment::EnrichmentService;
use crate::domain::{ExtractedListing, JobStatus, TransportMetrics};
use crate::error::{AppError, Result};
use crate::port::{ListingExtractor, ListingRepository, PageFetcher};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ScrapePipeline {
    repo: Arc<dyn ListingRepository>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ListingExtractor>,
    enrichment: Option<Arc<EnrichmentService>>,
}

impl ScrapePipeline {
    pub fn new(
        repo: Arc<dyn ListingRepository>,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ListingExtractor>,
        enrichment: Option<Arc<EnrichmentService>>,
    ) -> Self {
        Self {
            repo,
            fetcher,
            extractor,
            enrichment,
        }
    }

    /// Drive the Pending job for `url` to a terminal status
    ///
    /// Fetch and extraction failures mark the job Failed and return `Ok(Failed)`.
    /// Persistence errors are returned as-is; the job may then stay Pending.
    pub async fn run(&self, url: &str) -> Result<JobStatus> {
        let listing = match self.scrape(url).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(url = %url, error = %e, "Scrape failed, marking job failed");
                self.repo.fail(url).await?;
                return Ok(JobStatus::Failed);
            }
        };

        let metrics = self.enrich(&listing).await;

        self.repo.complete(url, &listing).await?;
        if let Some(metrics) = metrics {
            let job = self
                .repo
                .get_by_url(url)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", url)))?;
            self.repo.update_transport(job.id, &metrics).await?;
        }

        info!(url = %url, fields = listing.len(), "Listing complete");
        Ok(JobStatus::Complete)
    }

    async fn scrape(&self, url: &str) -> Result<ExtractedListing> {
        let html = self.fetcher.fetch(url).await?;
        debug!(url = %url, bytes = html.len(), "Fetched page");
        let listing = self.extractor.extract(&html)?;
        Ok(listing)
    }

    async fn enrich(&self, listing: &ExtractedListing) -> Option<TransportMetrics> {
        let street_address = listing.address()?;
        let Some(enrichment) = &self.enrichment else {
            debug!("Enrichment not configured, skipping");
            return None;
        };
        let address = build_complete_address(street_address, listing.locality());
        Some(enrichment.enrich(&address).await)
    }
}
