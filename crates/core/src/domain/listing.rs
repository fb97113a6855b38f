// Listing Job Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::extracted::ExtractedListing;
use crate::domain::transport::TransportMetrics;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storage-assigned job identifier
pub type ListingId = i64;

/// Job status
///
/// `Pending` is the only non-terminal state. Transitions are one-way:
/// `Pending -> Complete` or `Pending -> Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Complete,
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [JobStatus::Pending, JobStatus::Complete, JobStatus::Failed];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Complete) | (JobStatus::Pending, JobStatus::Failed)
        )
    }

    /// Validate a transition and return the new status
    pub fn transition(self, next: JobStatus) -> Result<JobStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "complete" => Ok(JobStatus::Complete),
            "failed" => Ok(JobStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "unknown job status: {}",
                other
            ))),
        }
    }
}

/// Listing Job Entity
///
/// One row per source URL. `listing` is only present once the job is `Complete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingJob {
    pub id: ListingId,
    pub url: String,
    pub status: JobStatus,
    pub listing: Option<ExtractedListing>,
    pub scraped_at: i64, // epoch ms
    pub liked: bool,
    pub done: bool,
    pub transport: TransportMetrics,
}

impl ListingJob {
    /// Create a freshly submitted job
    ///
    /// # Arguments
    ///
    /// * `id` - Storage-assigned id (injected)
    /// * `url` - Source URL (natural key)
    /// * `scraped_at` - Submission timestamp in epoch ms (injected, not system time)
    pub fn pending(id: ListingId, url: impl Into<String>, scraped_at: i64) -> Self {
        Self {
            id,
            url: url.into(),
            status: JobStatus::Pending,
            listing: None,
            scraped_at,
            liked: false,
            done: false,
            transport: TransportMetrics::default(),
        }
    }

    /// Transition to Complete with the extracted listing
    pub fn complete(&mut self, listing: ExtractedListing) -> Result<()> {
        if listing.is_empty() {
            return Err(DomainError::EmptyListing);
        }
        self.status = self.status.transition(JobStatus::Complete)?;
        self.listing = Some(listing);
        Ok(())
    }

    /// Transition to Failed
    pub fn fail(&mut self) -> Result<()> {
        self.status = self.status.transition(JobStatus::Failed)?;
        self.listing = None;
        Ok(())
    }

    /// Street address and locality hint as stored in the listing
    pub fn address_parts(&self) -> Option<(&str, Option<&str>)> {
        let listing = self.listing.as_ref()?;
        listing.address().map(|address| (address, listing.locality()))
    }
}
