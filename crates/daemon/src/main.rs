//! Flatscout Daemon - Main Entry Point
//! JSON-RPC server + supervised scrape units

mod settings;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use settings::DaemonConfig;
use flatscout_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use flatscout_core::application::worker::constants::SHUTDOWN_GRACE_PERIOD;
use flatscout_core::application::{
    shutdown_channel, unit_channel, EnrichmentService, JobCoordinator, ScrapePipeline,
    TransportService,
};
use flatscout_core::port::time_provider::SystemTimeProvider;
use flatscout_infra_html::HtmlListingExtractor;
use flatscout_infra_http::{GoogleGeocoder, GoogleMapsConfig, GoogleTravelPlanner, HttpPageFetcher};
use flatscout_infra_sqlite::{create_pool, run_migrations, SqliteListingRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging
    let log_format =
        std::env::var("FLATSCOUT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    telemetry::init(&log_format)?;

    info!("Flatscout v{} starting...", VERSION);

    // 2. Configuration
    let config = DaemonConfig::load()?;

    // 3. Database
    if let Some(parent) = std::path::Path::new(&config.db_path).parent() {
        if !config.db_path.starts_with("sqlite:") && !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    info!(db_path = %config.db_path, "Initializing database...");
    let pool = create_pool(&config.database_url())
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Dependencies
    let time_provider = Arc::new(SystemTimeProvider);
    let repo = Arc::new(SqliteListingRepository::new(pool.clone()));
    let fetcher = Arc::new(
        HttpPageFetcher::new().map_err(|e| anyhow::anyhow!("HTTP client failed: {}", e))?,
    );
    let extractor = Arc::new(HtmlListingExtractor);
    let enrichment = build_enrichment(&config)?;

    let pipeline = Arc::new(ScrapePipeline::new(
        repo.clone(),
        fetcher,
        extractor,
        enrichment.clone(),
    ));
    let (spawner, supervisor) = unit_channel();
    let coordinator = Arc::new(JobCoordinator::new(
        repo.clone(),
        pipeline,
        spawner,
        time_provider,
    ));
    let transport = Arc::new(TransportService::new(repo, enrichment));

    // 5. Supervisor
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let supervisor_handle = tokio::spawn(supervisor.run(shutdown_rx, SHUTDOWN_GRACE_PERIOD));

    // 6. JSON-RPC server
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, RpcHandler::new(coordinator, transport))
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Stop accepting work, then let in-flight units drain
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    shutdown_tx.shutdown();
    if let Err(e) = supervisor_handle.await {
        warn!(error = %e, "Supervisor task ended abnormally");
    }
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}

/// Google-backed enrichment, or None when no API key is configured
fn build_enrichment(config: &DaemonConfig) -> Result<Option<Arc<EnrichmentService>>> {
    let Some(api_key) = &config.maps_api_key else {
        warn!(
            "{} not set; listings are stored without transport times",
            settings::MAPS_API_KEY_VAR
        );
        return Ok(None);
    };

    let mut maps = GoogleMapsConfig::new(api_key.clone());
    if let Some(base_url) = &config.maps_base_url {
        maps = maps.with_base_url(base_url.clone());
    }
    info!(key = %maps.key_prefix(), destination = %config.destination_address, "Transport enrichment enabled");

    let geocoder = GoogleGeocoder::new(maps.clone())
        .map_err(|e| anyhow::anyhow!("Geocoder setup failed: {}", e))?;
    let planner = GoogleTravelPlanner::new(maps)
        .map_err(|e| anyhow::anyhow!("Travel planner setup failed: {}", e))?;

    Ok(Some(Arc::new(EnrichmentService::new(
        Arc::new(geocoder),
        Arc::new(planner),
        config.destination(),
    ))))
}
