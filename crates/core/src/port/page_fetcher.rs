// Page Fetcher Port
// Retrieves raw listing markup for a URL

use async_trait::async_trait;
use thiserror::Error;

/// Fetch errors (FetchFailure in the error taxonomy)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page body as text
    ///
    /// # Errors
    /// - FetchError::Transport if the request could not be sent
    /// - FetchError::Status if the server answered with a non-success status
    /// - FetchError::Body if the body could not be decoded
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves canned pages; unknown URLs answer 404
    #[derive(Default)]
    pub struct StaticPageFetcher {
        pages: Mutex<HashMap<String, Result<String, FetchError>>>,
        calls: Mutex<HashMap<String, usize>>,
        delay: Option<Duration>,
    }

    impl StaticPageFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Hold every fetch for `delay` (keeps units in flight during tests)
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
            self.pages
                .lock()
                .unwrap()
                .insert(url.into(), Ok(html.into()));
            self
        }

        pub fn with_error(self, url: impl Into<String>, error: FetchError) -> Self {
            self.pages.lock().unwrap().insert(url.into(), Err(error));
            self
        }

        pub fn call_count(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl PageFetcher for StaticPageFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(url.to_string())
                .or_insert(0) += 1;

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let page = self.pages.lock().unwrap().get(url).cloned();
            page.unwrap_or_else(|| {
                Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                })
            })
        }
    }
}
