//! Daemon configuration
//!
//! Defaults overlaid with `FLATSCOUT_*` environment variables. The maps key is the
//! unprefixed `GOOGLE_MAPS_API_KEY`.

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use flatscout_core::domain::Destination;
use serde::Deserialize;

pub const DEFAULT_DB_PATH: &str = "~/.flatscout/listings.db";
pub const MAPS_API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub destination_address: String,
    pub destination_lat: f64,
    pub destination_lng: f64,
    /// Override for the Google Maps endpoint (local testing)
    pub maps_base_url: Option<String>,
    #[serde(skip)]
    pub maps_api_key: Option<String>,
}

impl DaemonConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        let mut config = Self::from_environment(Environment::with_prefix("FLATSCOUT"))?;
        config.maps_api_key = std::env::var(MAPS_API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty());
        Ok(config)
    }

    fn from_environment(env: Environment) -> Result<Self> {
        let destination = Destination::default();
        let raw = Config::builder()
            .set_default("db_path", DEFAULT_DB_PATH)?
            .set_default("rpc_host", flatscout_api_rpc::server::DEFAULT_RPC_HOST)?
            .set_default("rpc_port", flatscout_api_rpc::server::DEFAULT_RPC_PORT)?
            .set_default("destination_address", destination.address)?
            .set_default("destination_lat", destination.location.lat)?
            .set_default("destination_lng", destination.location.lng)?
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let mut config: DaemonConfig = raw
            .try_deserialize()
            .context("Invalid FLATSCOUT_* configuration")?;
        config.db_path = shellexpand::tilde(&config.db_path).into_owned();
        Ok(config)
    }

    /// sqlx connection URL for the configured database file
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite://{}?mode=rwc", self.db_path)
        }
    }

    pub fn destination(&self) -> Destination {
        Destination::new(
            self.destination_address.clone(),
            self.destination_lat,
            self.destination_lng,
        )
    }

    #[cfg(test)]
    fn from_map(vars: &[(&str, &str)]) -> Result<Self> {
        let source: std::collections::HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self::from_environment(Environment::with_prefix("FLATSCOUT").source(Some(source)))
    }
}
