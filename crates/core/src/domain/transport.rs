// Transport Domain Model - enrichment results

use serde::{Deserialize, Serialize};

/// Travel mode queried against the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walking,
    Transit,
    Cycling,
}

impl TravelMode {
    pub const ALL: [TravelMode; 3] = [TravelMode::Walking, TravelMode::Transit, TravelMode::Cycling];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Walking => "walking",
            TravelMode::Transit => "transit",
            TravelMode::Cycling => "cycling",
        }
    }
}

impl std::fmt::Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One travel lookup result (human-readable strings as returned by the routing backend)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub duration: Option<String>,
    pub distance: Option<String>,
}

/// Fixed travel destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub address: String,
    pub location: Coordinates,
}

impl Destination {
    pub const DEFAULT_ADDRESS: &'static str = "Rämistrasse 101, 8092 Zürich, Switzerland";
    pub const DEFAULT_LAT: f64 = 47.37659190407654;
    pub const DEFAULT_LNG: f64 = 8.548000258889498;

    pub fn new(address: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            address: address.into(),
            location: Coordinates { lat, lng },
        }
    }
}

impl Default for Destination {
    /// ETH Zurich main building
    fn default() -> Self {
        Self::new(Self::DEFAULT_ADDRESS, Self::DEFAULT_LAT, Self::DEFAULT_LNG)
    }
}

/// Aggregate enrichment result; every field is nullable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportMetrics {
    pub walking_time: Option<String>,
    pub transit_time: Option<String>,
    pub cycling_time: Option<String>,
    pub walking_distance: Option<String>,
    pub transit_distance: Option<String>,
    pub cycling_distance: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl TransportMetrics {
    pub fn set_estimate(&mut self, mode: TravelMode, estimate: TravelEstimate) {
        let (time, distance) = match mode {
            TravelMode::Walking => (&mut self.walking_time, &mut self.walking_distance),
            TravelMode::Transit => (&mut self.transit_time, &mut self.transit_distance),
            TravelMode::Cycling => (&mut self.cycling_time, &mut self.cycling_distance),
        };
        *time = estimate.duration;
        *distance = estimate.distance;
    }

    pub fn duration(&self, mode: TravelMode) -> Option<&str> {
        match mode {
            TravelMode::Walking => self.walking_time.as_deref(),
            TravelMode::Transit => self.transit_time.as_deref(),
            TravelMode::Cycling => self.cycling_time.as_deref(),
        }
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.latitude = Some(coordinates.lat);
        self.longitude = Some(coordinates.lng);
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        }
    }

    /// True when any travel duration is still unknown
    pub fn is_missing_durations(&self) -> bool {
        TravelMode::ALL.iter().any(|m| self.duration(*m).is_none())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The subset that is persisted (durations and coordinates)
    pub fn persisted(&self) -> Self {
        Self {
            walking_distance: None,
            transit_distance: None,
            cycling_distance: None,
            ..self.clone()
        }
    }
}
