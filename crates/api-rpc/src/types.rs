//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use flatscout_core::application::{BulkRecompute, RecomputeEntry, Recomputed};
use flatscout_core::domain::{
    Coordinates, Destination, ExtractedListing, JobStatus, ListingId, ListingJob,
    TransportMetrics,
};
use flatscout_core::error::AppError;
use serde::{Deserialize, Serialize};

/// listing.submit.v1 - Submit a listing URL
#[derive(Debug, Default, Deserialize)]
pub struct SubmitParams {
    #[serde(default)]
    pub url: String,
}

/// `{status}` for pending/failed jobs, the stored listing once complete
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Status { status: JobStatus },
    Listing(ExtractedListing),
}

/// listing.get.v1 - Get the job for a URL
#[derive(Debug, Default, Deserialize)]
pub struct GetParams {
    #[serde(default)]
    pub url: String,
}

/// One stored job
///
/// `content` is the serialized listing (`{}` until the job is complete).
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: ListingId,
    pub url: String,
    pub status: JobStatus,
    pub content: String,
    pub scraped_at: i64,
    pub liked: bool,
    pub done: bool,
    pub walking_time: Option<String>,
    pub transit_time: Option<String>,
    pub cycling_time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TryFrom<ListingJob> for JobView {
    type Error = AppError;

    fn try_from(job: ListingJob) -> Result<Self, Self::Error> {
        let content = match &job.listing {
            Some(listing) => listing.to_json()?,
            None => "{}".to_string(),
        };
        Ok(Self {
            id: job.id,
            url: job.url,
            status: job.status,
            content,
            scraped_at: job.scraped_at,
            liked: job.liked,
            done: job.done,
            walking_time: job.transport.walking_time,
            transit_time: job.transport.transit_time,
            cycling_time: job.transport.cycling_time,
            latitude: job.transport.latitude,
            longitude: job.transport.longitude,
        })
    }
}

/// listing.like.v1
#[derive(Debug, Default, Deserialize)]
pub struct LikeParams {
    pub id: Option<ListingId>,
    #[serde(default)]
    pub liked: bool,
}

/// listing.done.v1
#[derive(Debug, Default, Deserialize)]
pub struct DoneParams {
    pub id: Option<ListingId>,
    #[serde(default)]
    pub done: bool,
}

/// listing.delete.v1
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub id: Option<ListingId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub id: ListingId,
    pub deleted: bool,
}

/// Travel durations and distances for the three modes
#[derive(Debug, Clone, Serialize)]
pub struct TransportTimes {
    pub walking_time: Option<String>,
    pub transit_time: Option<String>,
    pub cycling_time: Option<String>,
    pub walking_distance: Option<String>,
    pub transit_distance: Option<String>,
    pub cycling_distance: Option<String>,
}

impl From<&TransportMetrics> for TransportTimes {
    fn from(m: &TransportMetrics) -> Self {
        Self {
            walking_time: m.walking_time.clone(),
            transit_time: m.transit_time.clone(),
            cycling_time: m.cycling_time.clone(),
            walking_distance: m.walking_distance.clone(),
            transit_distance: m.transit_distance.clone(),
            cycling_distance: m.cycling_distance.clone(),
        }
    }
}

/// transport.recompute.v1 - parameters are `flatscout_core::application::RecomputeRequest`
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeResponse {
    pub success: bool,
    pub transport_times: TransportTimes,
    pub coordinates: Option<Coordinates>,
    pub destination: Destination,
}

impl RecomputeResponse {
    pub fn new(done: &Recomputed, destination: Destination) -> Self {
        Self {
            success: true,
            transport_times: TransportTimes::from(&done.metrics),
            coordinates: done.coordinates(),
            destination,
        }
    }
}

/// transport.recompute_all.v1
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeAllResponse {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<RecomputeResult>,
    pub destination: Destination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecomputeResult {
    Done {
        id: ListingId,
        address: String,
        transport_times: TransportTimes,
        coordinates: Option<Coordinates>,
    },
    Failed {
        id: ListingId,
        error: String,
    },
}

impl RecomputeAllResponse {
    pub fn new(bulk: BulkRecompute, destination: Destination) -> Self {
        let results = bulk
            .results
            .into_iter()
            .map(|entry| match entry {
                RecomputeEntry::Done(done) => RecomputeResult::Done {
                    id: done.job_id,
                    transport_times: TransportTimes::from(&done.metrics),
                    coordinates: done.coordinates(),
                    address: done.address,
                },
                RecomputeEntry::Failed { job_id, error } => RecomputeResult::Failed {
                    id: job_id,
                    error,
                },
            })
            .collect();
        Self {
            success: true,
            processed: bulk.processed,
            results,
            destination,
        }
    }
}

/// admin.stats.v1 - Get service statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub total_jobs: i64,
    pub pending_jobs: i64,
    pub complete_jobs: i64,
    pub failed_jobs: i64,
    pub in_flight_units: usize,
    pub uptime_seconds: i64,
    pub enrichment_configured: bool,
}
