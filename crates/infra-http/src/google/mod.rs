// Google Maps Platform adapters

mod distance_matrix;
mod geocoder;

pub use distance_matrix::GoogleTravelPlanner;
pub use geocoder::GoogleGeocoder;

use crate::client::build_client;
use flatscout_core::error::Result;
use flatscout_core::port::EnrichmentError;
use serde::de::DeserializeOwned;
use tracing::debug;

pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";

/// Logged instead of the key itself
const KEY_PREFIX_LEN: usize = 10;

#[derive(Clone)]
pub struct GoogleMapsConfig {
    api_key: String,
    base_url: String,
}

impl GoogleMapsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_MAPS_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// At most the first 10 characters of the key, for logs
    pub fn key_prefix(&self) -> String {
        let prefix: String = self.api_key.chars().take(KEY_PREFIX_LEN).collect();
        format!("{}...", prefix)
    }
}

impl std::fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &self.key_prefix())
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Shared HTTP plumbing for the Maps web services
#[derive(Clone)]
struct MapsClient {
    http: reqwest::Client,
    config: GoogleMapsConfig,
}

impl MapsClient {
    fn new(config: GoogleMapsConfig) -> Result<Self> {
        Ok(Self {
            http: build_client()?,
            config,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<T, EnrichmentError> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!(url = %url, key = %self.config.key_prefix(), "Calling Maps API");

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            // reqwest errors carry the full URL, key included
            .map_err(|e| EnrichmentError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Http(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EnrichmentError::Decode(e.without_url().to_string()))
    }
}

/// Map a non-OK top-level API status to an error
fn api_error(status: String, message: Option<String>) -> EnrichmentError {
    EnrichmentError::Api {
        message: message.unwrap_or_else(|| "no error message".to_string()),
        status,
    }
}
