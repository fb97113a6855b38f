// Google Distance Matrix API adapter (one origin, one destination, one mode)

use super::{api_error, GoogleMapsConfig, MapsClient};
use async_trait::async_trait;
use flatscout_core::domain::{TravelEstimate, TravelMode};
use flatscout_core::error::Result;
use flatscout_core::port::{EnrichmentError, TravelPlanner};
use serde::Deserialize;
use tracing::debug;

const DISTANCE_MATRIX_PATH: &str = "/maps/api/distancematrix/json";

/// Routing backend name for a travel mode
fn wire_mode(mode: TravelMode) -> &'static str {
    match mode {
        TravelMode::Walking => "walking",
        TravelMode::Transit => "transit",
        TravelMode::Cycling => "bicycling",
    }
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<Row>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    status: String,
    duration: Option<TextValue>,
    distance: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

impl DistanceMatrixResponse {
    /// Only the first element counts; element status other than OK means no route
    fn into_estimate(self) -> std::result::Result<Option<TravelEstimate>, EnrichmentError> {
        if self.status != "OK" {
            return Err(api_error(self.status, self.error_message));
        }

        let element = self
            .rows
            .into_iter()
            .next()
            .and_then(|row| row.elements.into_iter().next());

        Ok(match element {
            Some(element) if element.status == "OK" => Some(TravelEstimate {
                duration: element.duration.map(|d| d.text),
                distance: element.distance.map(|d| d.text),
            }),
            _ => None,
        })
    }
}

pub struct GoogleTravelPlanner {
    client: MapsClient,
}

impl GoogleTravelPlanner {
    pub fn new(config: GoogleMapsConfig) -> Result<Self> {
        Ok(Self {
            client: MapsClient::new(config)?,
        })
    }
}

#[async_trait]
impl TravelPlanner for GoogleTravelPlanner {
    async fn travel(
        &self,
        origin: &str,
        destination: &str,
        mode: TravelMode,
    ) -> std::result::Result<Option<TravelEstimate>, EnrichmentError> {
        let response: DistanceMatrixResponse = self
            .client
            .get_json(
                DISTANCE_MATRIX_PATH,
                &[
                    ("origins", origin),
                    ("destinations", destination),
                    ("mode", wire_mode(mode)),
                    ("units", "metric"),
                ],
            )
            .await?;
        debug!(origin = %origin, mode = %mode, status = %response.status, "Distance matrix response");
        response.into_estimate()
    }
}
