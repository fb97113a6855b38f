// Maps Ports - geocoding and travel-duration lookup
// Consumed by the EnrichmentService; failures here never fail a job.

use crate::domain::{Coordinates, TravelEstimate, TravelMode};
use async_trait::async_trait;
use thiserror::Error;

/// Enrichment call errors (PartialEnrichmentFailure in the error taxonomy)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Upstream returned HTTP {0}")]
    Http(u16),

    /// API-level status such as REQUEST_DENIED or OVER_QUERY_LIMIT
    #[error("Upstream status {status}: {message}")]
    Api { status: String, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve an address to coordinates
    ///
    /// # Returns
    /// `Ok(None)` when the backend has no result for the address
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, EnrichmentError>;
}

#[async_trait]
pub trait TravelPlanner: Send + Sync {
    /// Look up duration/distance from `origin` to `destination` for one mode
    ///
    /// # Returns
    /// `Ok(None)` when no route exists for this mode
    async fn travel(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> Result<Option<TravelEstimate>, EnrichmentError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted answer for a mock call
    #[derive(Debug, Clone)]
    pub enum MockAnswer<T> {
        Found(T),
        NotFound,
        Fail(String),
    }

    impl<T: Clone> MockAnswer<T> {
        fn resolve(&self) -> Result<Option<T>, EnrichmentError> {
            match self {
                MockAnswer::Found(v) => Ok(Some(v.clone())),
                MockAnswer::NotFound => Ok(None),
                MockAnswer::Fail(msg) => Err(EnrichmentError::Transport(msg.clone())),
            }
        }
    }

    /// Geocoder returning the same answer for every address
    pub struct MockGeocoder {
        answer: MockAnswer<Coordinates>,
        calls: AtomicUsize,
    }

    impl MockGeocoder {
        pub fn new(answer: MockAnswer<Coordinates>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn found(lat: f64, lng: f64) -> Self {
            Self::new(MockAnswer::Found(Coordinates { lat, lng }))
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self::new(MockAnswer::Fail(message.into()))
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Geocoder for MockGeocoder {
        async fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, EnrichmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.resolve()
        }
    }

    /// Travel planner with one scripted answer per mode (default: NotFound)
    pub struct MockTravelPlanner {
        answers: HashMap<TravelMode, MockAnswer<TravelEstimate>>,
        calls: AtomicUsize,
    }

    impl MockTravelPlanner {
        pub fn new() -> Self {
            Self {
                answers: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }

        /// Every mode answers with the given duration and distance
        pub fn uniform(duration: &str, distance: &str) -> Self {
            let mut planner = Self::new();
            for mode in TravelMode::ALL {
                planner = planner.with_answer(
                    mode,
                    MockAnswer::Found(TravelEstimate {
                        duration: Some(duration.to_string()),
                        distance: Some(distance.to_string()),
                    }),
                );
            }
            planner
        }

        pub fn failing(message: &str) -> Self {
            let mut planner = Self::new();
            for mode in TravelMode::ALL {
                planner = planner.with_answer(mode, MockAnswer::Fail(message.to_string()));
            }
            planner
        }

        pub fn with_answer(mut self, mode: TravelMode, answer: MockAnswer<TravelEstimate>) -> Self {
            self.answers.insert(mode, answer);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Default for MockTravelPlanner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl TravelPlanner for MockTravelPlanner {
        async fn travel(
            &self,
            _origin: &str,
            _destination: &str,
            mode: TravelMode,
        ) -> Result<Option<TravelEstimate>, EnrichmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answers
                .get(&mode)
                .map(MockAnswer::resolve)
                .unwrap_or(Ok(None))
        }
    }
}
