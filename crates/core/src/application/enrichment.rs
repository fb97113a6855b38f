// Enrichment Service - coordinates + travel durations for one address

use crate::domain::{Coordinates, Destination, TransportMetrics, TravelEstimate, TravelMode};
use crate::port::{Geocoder, TravelPlanner};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Wraps geocoding and travel lookup into one partial-failure tolerant result
pub struct EnrichmentService {
    geocoder: Arc<dyn Geocoder>,
    travel_planner: Arc<dyn TravelPlanner>,
    destination: Destination,
}

impl EnrichmentService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        travel_planner: Arc<dyn TravelPlanner>,
        destination: Destination,
    ) -> Self {
        Self {
            geocoder,
            travel_planner,
            destination,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Enrich a complete address
    ///
    /// Issues one geocode and one travel lookup per mode concurrently and waits for all
    /// four. Each failed or empty call leaves only its own fields null; this never fails.
    pub async fn enrich(&self, address: &str) -> TransportMetrics {
        debug!(address = %address, destination = %self.destination.address, "Enriching address");

        let lookups = join_all(
            TravelMode::ALL
                .into_iter()
                .map(|mode| async move { (mode, self.lookup(address, mode).await) }),
        );
        let (coordinates, estimates) = tokio::join!(self.geocode(address), lookups);

        let mut metrics = TransportMetrics::default();
        if let Some(coordinates) = coordinates {
            metrics.set_coordinates(coordinates);
        }
        for (mode, estimate) in estimates {
            if let Some(estimate) = estimate {
                metrics.set_estimate(mode, estimate);
            }
        }

        info!(
            address = %address,
            geocoded = metrics.coordinates().is_some(),
            walking = ?metrics.walking_time,
            transit = ?metrics.transit_time,
            cycling = ?metrics.cycling_time,
            "Enrichment finished"
        );
        metrics
    }

    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        match self.geocoder.geocode(address).await {
            Ok(Some(coordinates)) => Some(coordinates),
            Ok(None) => {
                warn!(address = %address, "No geocoding result for address");
                None
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Geocoding failed");
                None
            }
        }
    }

    async fn lookup(&self, address: &str, mode: TravelMode) -> Option<TravelEstimate> {
        match self
            .travel_planner
            .travel(address, &self.destination.address, mode)
            .await
        {
            Ok(Some(estimate)) => Some(estimate),
            Ok(None) => {
                warn!(address = %address, mode = %mode, "No route for travel mode");
                None
            }
            Err(e) => {
                warn!(address = %address, mode = %mode, error = %e, "Travel lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::maps::mocks::{MockAnswer, MockGeocoder, MockTravelPlanner};

    fn service(geocoder: MockGeocoder, planner: MockTravelPlanner) -> EnrichmentService {
        EnrichmentService::new(Arc::new(geocoder), Arc::new(planner), Destination::default())
    }

    #[tokio::test]
    async fn test_all_calls_succeed() {
        let service = service(
            MockGeocoder::found(47.38, 8.54),
            MockTravelPlanner::uniform("15 mins", "1.2 km"),
        );

        let metrics = service.enrich("Musterstrasse 5, 8001 Zürich").await;

        assert_eq!(metrics.coordinates(), Some(Coordinates { lat: 47.38, lng: 8.54 }));
        for mode in TravelMode::ALL {
            assert_eq!(metrics.duration(mode), Some("15 mins"));
        }
        assert_eq!(metrics.transit_distance.as_deref(), Some("1.2 km"));
    }

    #[tokio::test]
    async fn test_total_failure_yields_all_null() {
        let geocoder = Arc::new(MockGeocoder::failing("connection refused"));
        let planner = Arc::new(MockTravelPlanner::failing("connection refused"));
        let service =
            EnrichmentService::new(geocoder.clone(), planner.clone(), Destination::default());

        let metrics = service.enrich("Nowhere 1").await;

        assert!(metrics.is_empty());
        // Every call was still attempted
        assert_eq!(geocoder.call_count(), 1);
        assert_eq!(planner.call_count(), 3);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_fields() {
        let planner = MockTravelPlanner::new()
            .with_answer(
                TravelMode::Walking,
                MockAnswer::Found(TravelEstimate {
                    duration: Some("25 mins".to_string()),
                    distance: Some("2.0 km".to_string()),
                }),
            )
            .with_answer(TravelMode::Transit, MockAnswer::Fail("timeout".to_string()))
            .with_answer(TravelMode::Cycling, MockAnswer::NotFound);
        let service = service(MockGeocoder::failing("denied"), planner);

        let metrics = service.enrich("Musterstrasse 5, 8001 Zürich").await;

        assert_eq!(metrics.coordinates(), None);
        assert_eq!(metrics.walking_time.as_deref(), Some("25 mins"));
        assert_eq!(metrics.transit_time, None);
        assert_eq!(metrics.cycling_time, None);
    }
}
