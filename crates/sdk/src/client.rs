//! Flatscout Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{
    DeleteResponse, DoneParams, IdParams, Job, LikeParams, ListingId, RecomputeAllResponse,
    RecomputeRequest, RecomputeResponse, Stats, SubmitResponse, UrlParams,
};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use serde::Serialize;
use std::time::Duration;

/// Flatscout daemon client
///
/// # Example
///
/// ```no_run
/// use flatscout_sdk::FlatscoutClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FlatscoutClient::connect("http://127.0.0.1:9531").await?;
/// let response = client.submit("https://www.wgzimmer.ch/wglink/de/42.html").await?;
/// println!("{:?}", response.status());
/// # Ok(())
/// # }
/// ```
pub struct FlatscoutClient {
    client: HttpClient,
}

/// Encode a request struct as named params
fn named(request: &impl Serialize) -> Result<ObjectParams> {
    let serde_json::Value::Object(fields) = serde_json::to_value(request)? else {
        return Err(SdkError::Other("params must serialize to an object".to_string()));
    };
    let mut params = ObjectParams::new();
    for (key, value) in fields {
        params.insert(&key, value)?;
    }
    Ok(params)
}

impl FlatscoutClient {
    /// Connect to the daemon
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9531`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Submit a listing URL
    ///
    /// Returns `pending` for a new URL; the listing itself once scraping has completed.
    pub async fn submit(&self, url: &str) -> Result<SubmitResponse> {
        let params = named(&UrlParams { url })?;
        Ok(self.client.request("listing.submit.v1", params).await?)
    }

    /// Get the stored job for a URL (`None` if the URL was never submitted)
    pub async fn get(&self, url: &str) -> Result<Option<Job>> {
        let params = named(&UrlParams { url })?;
        Ok(self.client.request("listing.get.v1", params).await?)
    }

    /// All jobs, liked first, newest first
    pub async fn list(&self) -> Result<Vec<Job>> {
        Ok(self.client.request("listing.list.v1", rpc_params![]).await?)
    }

    pub async fn like(&self, id: ListingId, liked: bool) -> Result<Job> {
        let params = named(&LikeParams { id, liked })?;
        Ok(self.client.request("listing.like.v1", params).await?)
    }

    pub async fn done(&self, id: ListingId, done: bool) -> Result<Job> {
        let params = named(&DoneParams { id, done })?;
        Ok(self.client.request("listing.done.v1", params).await?)
    }

    pub async fn delete(&self, id: ListingId) -> Result<DeleteResponse> {
        let params = named(&IdParams { id })?;
        Ok(self.client.request("listing.delete.v1", params).await?)
    }

    /// Recompute transport times for one job from an explicit address
    pub async fn recompute(&self, request: RecomputeRequest) -> Result<RecomputeResponse> {
        let params = named(&request)?;
        Ok(self.client.request("transport.recompute.v1", params).await?)
    }

    /// Recompute every job with a missing travel duration
    pub async fn recompute_all(&self) -> Result<RecomputeAllResponse> {
        Ok(self
            .client
            .request("transport.recompute_all.v1", rpc_params![])
            .await?)
    }

    pub async fn stats(&self) -> Result<Stats> {
        Ok(self.client.request("admin.stats.v1", rpc_params![]).await?)
    }
}
