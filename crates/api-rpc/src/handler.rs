//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::{to_rpc_error, validation_error};
use crate::types::{
    DeleteParams, DeleteResponse, DoneParams, GetParams, JobView, LikeParams,
    RecomputeAllResponse, RecomputeResponse, StatsResponse, SubmitParams, SubmitResponse,
};
use flatscout_core::application::{
    JobCoordinator, RecomputeRequest, SubmitOutcome, SubmitRequest, TransportService,
};
use flatscout_core::domain::{ListingId, ListingJob};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    coordinator: Arc<JobCoordinator>,
    transport: Arc<TransportService>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(coordinator: Arc<JobCoordinator>, transport: Arc<TransportService>) -> Self {
        Self {
            coordinator,
            transport,
            start_time: std::time::Instant::now(),
        }
    }

    /// listing.submit.v1
    pub async fn submit(&self, params: SubmitParams) -> Result<SubmitResponse, ErrorObjectOwned> {
        let outcome = self
            .coordinator
            .submit(SubmitRequest::new(params.url))
            .await
            .map_err(to_rpc_error)?;

        Ok(match outcome {
            SubmitOutcome::Complete(listing) => SubmitResponse::Listing(listing),
            other => SubmitResponse::Status {
                status: other.status(),
            },
        })
    }

    /// listing.get.v1 - `null` for an unknown URL
    pub async fn get(&self, params: GetParams) -> Result<Option<JobView>, ErrorObjectOwned> {
        if params.url.trim().is_empty() {
            return Err(validation_error("url cannot be empty"));
        }
        let job = self
            .coordinator
            .query(&params.url)
            .await
            .map_err(to_rpc_error)?;
        job.map(view).transpose()
    }

    /// listing.list.v1
    pub async fn list(&self) -> Result<Vec<JobView>, ErrorObjectOwned> {
        let jobs = self.coordinator.list().await.map_err(to_rpc_error)?;
        jobs.into_iter().map(view).collect()
    }

    /// listing.like.v1
    pub async fn like(&self, params: LikeParams) -> Result<JobView, ErrorObjectOwned> {
        let id = require_id(params.id)?;
        let job = self
            .coordinator
            .set_liked(id, params.liked)
            .await
            .map_err(to_rpc_error)?;
        view(job)
    }

    /// listing.done.v1
    pub async fn done(&self, params: DoneParams) -> Result<JobView, ErrorObjectOwned> {
        let id = require_id(params.id)?;
        let job = self
            .coordinator
            .set_done(id, params.done)
            .await
            .map_err(to_rpc_error)?;
        view(job)
    }

    /// listing.delete.v1
    pub async fn delete(&self, params: DeleteParams) -> Result<DeleteResponse, ErrorObjectOwned> {
        let id = require_id(params.id)?;
        self.coordinator.delete(id).await.map_err(to_rpc_error)?;
        Ok(DeleteResponse { id, deleted: true })
    }

    /// transport.recompute.v1
    pub async fn recompute(
        &self,
        params: RecomputeRequest,
    ) -> Result<RecomputeResponse, ErrorObjectOwned> {
        let done = self
            .transport
            .recompute(params)
            .await
            .map_err(to_rpc_error)?;
        Ok(RecomputeResponse::new(&done, self.destination()))
    }

    /// transport.recompute_all.v1
    pub async fn recompute_all(&self) -> Result<RecomputeAllResponse, ErrorObjectOwned> {
        let bulk = self
            .transport
            .recompute_missing()
            .await
            .map_err(to_rpc_error)?;
        Ok(RecomputeAllResponse::new(bulk, self.destination()))
    }

    /// admin.stats.v1
    pub async fn stats(&self) -> Result<StatsResponse, ErrorObjectOwned> {
        let counts = self.coordinator.counts().await.map_err(to_rpc_error)?;

        Ok(StatsResponse {
            total_jobs: counts.total,
            pending_jobs: counts.pending,
            complete_jobs: counts.complete,
            failed_jobs: counts.failed,
            in_flight_units: self.coordinator.in_flight(),
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
            enrichment_configured: self.transport.is_configured(),
        })
    }

    fn destination(&self) -> flatscout_core::domain::Destination {
        self.transport.destination().cloned().unwrap_or_default()
    }
}

fn require_id(id: Option<ListingId>) -> Result<ListingId, ErrorObjectOwned> {
    id.ok_or_else(|| validation_error("id is required"))
}

fn view(job: ListingJob) -> Result<JobView, ErrorObjectOwned> {
    JobView::try_from(job).map_err(to_rpc_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatscout_core::application::{
        unit_channel, EnrichmentService, ScrapePipeline, Supervisor,
    };
    use flatscout_core::domain::{Destination, JobStatus};
    use flatscout_core::port::listing_extractor::mocks::LineExtractor;
    use flatscout_core::port::listing_repository::mocks::InMemoryListingRepository;
    use flatscout_core::port::maps::mocks::{MockGeocoder, MockTravelPlanner};
    use flatscout_core::port::page_fetcher::mocks::StaticPageFetcher;
    use flatscout_core::port::time_provider::mocks::SteppingTimeProvider;

    const URL: &str = "https://www.wgzimmer.ch/wglink/de/7.html";

    fn handler(with_enrichment: bool) -> (RpcHandler, Supervisor) {
        let repo = Arc::new(InMemoryListingRepository::new());
        let enrichment = with_enrichment.then(|| {
            Arc::new(EnrichmentService::new(
                Arc::new(MockGeocoder::found(47.37, 8.53)),
                Arc::new(MockTravelPlanner::uniform("12 mins", "2.0 km")),
                Destination::default(),
            ))
        });
        let pipeline = Arc::new(ScrapePipeline::new(
            repo.clone(),
            Arc::new(StaticPageFetcher::new().with_page(URL, "adresse: Musterstrasse 5")),
            Arc::new(LineExtractor),
            enrichment.clone(),
        ));
        let (spawner, supervisor) = unit_channel();
        let coordinator = Arc::new(JobCoordinator::new(
            repo.clone(),
            pipeline,
            spawner,
            Arc::new(SteppingTimeProvider::new(0, 1)),
        ));
        let transport = Arc::new(TransportService::new(repo, enrichment));
        (RpcHandler::new(coordinator, transport), supervisor)
    }

    #[tokio::test]
    async fn test_submit_then_get() {
        let (handler, mut supervisor) = handler(false);

        let resp = handler
            .submit(SubmitParams {
                url: URL.to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(
            resp,
            SubmitResponse::Status {
                status: JobStatus::Pending
            }
        ));
        supervisor.next_report().await.unwrap();

        let resp = handler
            .submit(SubmitParams {
                url: URL.to_string(),
            })
            .await
            .unwrap();
        assert!(matches!(resp, SubmitResponse::Listing(_)));

        let job = handler
            .get(GetParams {
                url: URL.to_string(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        assert!(job.content.contains("Musterstrasse 5"));
    }

    #[tokio::test]
    async fn test_validation_and_not_found() {
        let (handler, _supervisor) = handler(false);

        let err = handler.submit(SubmitParams::default()).await.unwrap_err();
        assert_eq!(err.code(), 4000);

        let unknown = handler
            .get(GetParams {
                url: URL.to_string(),
            })
            .await
            .unwrap();
        assert!(unknown.is_none());

        let err = handler.like(LikeParams::default()).await.unwrap_err();
        assert_eq!(err.code(), 4000);

        let err = handler
            .delete(DeleteParams { id: Some(99) })
            .await
            .unwrap_err();
        assert_eq!(err.code(), 4001);
    }

    #[tokio::test]
    async fn test_recompute_without_key_is_internal_error() {
        let (handler, _supervisor) = handler(false);

        let err = handler.recompute_all().await.unwrap_err();
        assert_eq!(err.code(), 5000);
        assert!(err.message().contains("GOOGLE_MAPS_API_KEY"));

        let stats = handler.stats().await.unwrap();
        assert!(!stats.enrichment_configured);
    }

    #[tokio::test]
    async fn test_recompute_reports_destination() {
        let (handler, mut supervisor) = handler(true);
        handler
            .submit(SubmitParams {
                url: URL.to_string(),
            })
            .await
            .unwrap();
        supervisor.next_report().await.unwrap();

        let resp = handler
            .recompute(RecomputeRequest {
                job_id: Some(1),
                address: "Musterstrasse 5".to_string(),
                locality: Some("8001 Zürich".to_string()),
            })
            .await
            .unwrap();

        assert!(resp.success);
        assert_eq!(resp.transport_times.walking_time.as_deref(), Some("12 mins"));
        assert_eq!(resp.destination, Destination::default());
        let stats = handler.stats().await.unwrap();
        assert_eq!(stats.complete_jobs, 1);
        assert_eq!(stats.in_flight_units, 0);
    }
}
