//! Simple SDK Example
//!
//! Submits a listing, waits for the scrape to finish and prints its fields.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package flatscout-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example simple -- https://www.wgzimmer.ch/wglink/de/42.html
//!    ```

use flatscout_sdk::{FlatscoutClient, JobStatus, SubmitResponse};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .ok_or("usage: simple <listing-url>")?;

    let client = FlatscoutClient::connect("http://127.0.0.1:9531").await?;

    // Poll by resubmitting; only the first submit starts a scrape
    for _ in 0..30 {
        match client.submit(&url).await? {
            SubmitResponse::Listing(fields) => {
                for (key, value) in &fields {
                    println!("{:<24} {}", key, value.as_deref().unwrap_or("-"));
                }
                if let Some(job) = client.get(&url).await? {
                    println!("\nwalking: {:?}", job.walking_time);
                    println!("transit: {:?}", job.transit_time);
                    println!("cycling: {:?}", job.cycling_time);
                }
                return Ok(());
            }
            SubmitResponse::Status(s) if s.status == JobStatus::Failed => {
                println!("Scrape failed for {}", url);
                return Ok(());
            }
            SubmitResponse::Status(_) => tokio::time::sleep(Duration::from_secs(1)).await,
        }
    }

    println!("Still pending after 30s");
    Ok(())
}
