//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type ListingId = i64;

/// Extracted listing fields; `None` marks a label without a value
pub type Listing = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UrlParams<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LikeParams {
    pub id: ListingId,
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DoneParams {
    pub id: ListingId,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct IdParams {
    pub id: ListingId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusOnly {
    pub status: JobStatus,
}

/// Response from submit: a bare status until the listing is complete
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    Status(StatusOnly),
    Listing(Listing),
}

impl SubmitResponse {
    pub fn status(&self) -> JobStatus {
        match self {
            SubmitResponse::Status(s) => s.status,
            SubmitResponse::Listing(_) => JobStatus::Complete,
        }
    }
}

/// Stored job
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: ListingId,
    pub url: String,
    pub status: JobStatus,
    /// Serialized listing, `{}` until complete
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

impl Job {
    pub fn listing(&self) -> serde_json::Result<Listing> {
        serde_json::from_str(&self.content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteResponse {
    pub id: ListingId,
    pub deleted: bool,
}

/// Request to recompute transport times for one job
#[derive(Debug, Clone, Serialize)]
pub struct RecomputeRequest {
    pub job_id: ListingId,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransportTimes {
    pub walking_time: Option<String>,
    pub transit_time: Option<String>,
    pub cycling_time: Option<String>,
    pub walking_distance: Option<String>,
    pub transit_distance: Option<String>,
    pub cycling_distance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Destination {
    pub address: String,
    pub location: Coordinates,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecomputeResponse {
    pub success: bool,
    pub transport_times: TransportTimes,
    pub coordinates: Option<Coordinates>,
    pub destination: Destination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
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

#[derive(Debug, Clone, Deserialize)]
pub struct RecomputeAllResponse {
    pub success: bool,
    pub processed: usize,
    pub results: Vec<RecomputeResult>,
    pub destination: Destination,
}

/// Service statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Stats {
    pub total_jobs: i64,
    pub pending_jobs: i64,
    pub complete_jobs: i64,
    pub failed_jobs: i64,
    pub in_flight_units: usize,
    pub uptime_seconds: i64,
    pub enrichment_configured: bool,
}
