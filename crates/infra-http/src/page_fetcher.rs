// HTTP PageFetcher Implementation

use crate::client::build_client;
use async_trait::async_trait;
use flatscout_core::error::Result;
use flatscout_core::port::{FetchError, PageFetcher};
use tracing::debug;

/// Fetches listing pages over HTTP(S); no JavaScript rendering
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
        })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        debug!(url = %url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
