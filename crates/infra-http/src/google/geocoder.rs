// Google Geocoding API adapter

use super::{api_error, GoogleMapsConfig, MapsClient};
use async_trait::async_trait;
use flatscout_core::domain::Coordinates;
use flatscout_core::error::Result;
use flatscout_core::port::{EnrichmentError, Geocoder};
use serde::Deserialize;
use tracing::debug;

const GEOCODE_PATH: &str = "/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    /// First result wins; ZERO_RESULTS is an absent result, not an error
    fn into_coordinates(self) -> std::result::Result<Option<Coordinates>, EnrichmentError> {
        match self.status.as_str() {
            "OK" => Ok(self.results.into_iter().next().map(|r| Coordinates {
                lat: r.geometry.location.lat,
                lng: r.geometry.location.lng,
            })),
            "ZERO_RESULTS" => Ok(None),
            _ => Err(api_error(self.status, self.error_message)),
        }
    }
}

pub struct GoogleGeocoder {
    client: MapsClient,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleMapsConfig) -> Result<Self> {
        Ok(Self {
            client: MapsClient::new(config)?,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(
        &self,
        address: &str,
    ) -> std::result::Result<Option<Coordinates>, EnrichmentError> {
        let response: GeocodeResponse = self
            .client
            .get_json(GEOCODE_PATH, &[("address", address)])
            .await?;
        debug!(address = %address, status = %response.status, results = response.results.len(), "Geocoding response");
        response.into_coordinates()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{serve_once, serve_once_capturing};

    const OK_BODY: &str = r#"{
        "results": [
            {
                "formatted_address": "Musterstrasse 5, 8001 Zürich, Switzerland",
                "geometry": { "location": { "lat": 47.3717, "lng": 8.5423 }, "location_type": "ROOFTOP" }
            },
            {
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
            }
        ],
        "status": "OK"
    }"#;

    fn decode(body: &str) -> std::result::Result<Option<Coordinates>, EnrichmentError> {
        serde_json::from_str::<GeocodeResponse>(body)
            .unwrap()
            .into_coordinates()
    }

    #[test]
    fn test_first_result_is_used() {
        assert_eq!(
            decode(OK_BODY).unwrap(),
            Some(Coordinates {
                lat: 47.3717,
                lng: 8.5423
            })
        );
    }

    #[test]
    fn test_zero_results_is_absent() {
        assert_eq!(decode(r#"{"results": [], "status": "ZERO_RESULTS"}"#).unwrap(), None);
    }

    #[test]
    fn test_denied_is_api_error() {
        let result = decode(
            r#"{"results": [], "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#,
        );

        assert_eq!(
            result,
            Err(EnrichmentError::Api {
                status: "REQUEST_DENIED".to_string(),
                message: "The provided API key is invalid.".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_geocode_over_http() {
        let (base, request) = serve_once_capturing(200, "application/json", OK_BODY).await;
        let geocoder =
            GoogleGeocoder::new(GoogleMapsConfig::new("test-key").with_base_url(base)).unwrap();

        let coordinates = geocoder.geocode("Musterstrasse 5, 8001 Zürich").await.unwrap();

        assert_eq!(coordinates.map(|c| c.lat), Some(47.3717));
        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /maps/api/geocode/json?"));
        assert!(request_line.contains("address=Musterstrasse"));
        assert!(request_line.contains("key=test-key"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let base = serve_once(503, "text/plain", "unavailable").await;
        let geocoder =
            GoogleGeocoder::new(GoogleMapsConfig::new("k").with_base_url(base)).unwrap();

        assert_eq!(
            geocoder.geocode("x").await,
            Err(EnrichmentError::Http(503))
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let base = serve_once(200, "application/json", "<html>").await;
        let geocoder =
            GoogleGeocoder::new(GoogleMapsConfig::new("k").with_base_url(base)).unwrap();

        assert!(matches!(
            geocoder.geocode("x").await,
            Err(EnrichmentError::Decode(_))
        ));
    }
}
