// Submit Use Case

use crate::domain::{ExtractedListing, JobStatus, ListingJob};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Submit request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub url: String,
}

impl SubmitRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// What a caller learns from a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Pending,
    Failed,
    Complete(ExtractedListing),
}

impl SubmitOutcome {
    pub fn status(&self) -> JobStatus {
        match self {
            SubmitOutcome::Pending => JobStatus::Pending,
            SubmitOutcome::Failed => JobStatus::Failed,
            SubmitOutcome::Complete(_) => JobStatus::Complete,
        }
    }

    /// Outcome for a job that already exists
    pub(crate) fn from_existing(job: ListingJob) -> Self {
        match (job.status, job.listing) {
            (JobStatus::Complete, Some(listing)) => SubmitOutcome::Complete(listing),
            (JobStatus::Failed, _) => SubmitOutcome::Failed,
            // Complete rows always carry a listing; anything else is still in flight
            _ => SubmitOutcome::Pending,
        }
    }
}

/// Validate a submit request and return the job key
///
/// The key is the trimmed URL exactly as submitted.
pub fn validate_request(req: &SubmitRequest) -> Result<String> {
    let url = req.url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("url cannot be empty".to_string()));
    }

    let parsed = Url::parse(url)
        .map_err(|e| AppError::Validation(format!("url is not a valid absolute URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::Validation(format!(
                "url scheme must be http or https, got '{}'",
                other
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(AppError::Validation("url must have a host".to_string()));
    }

    Ok(url.to_string())
}
