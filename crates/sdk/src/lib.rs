//! Flatscout SDK - Rust Client Library
//!
//! Typed client for the Flatscout daemon's JSON-RPC API.
//!
//! # Example
//!
//! ```no_run
//! use flatscout_sdk::{FlatscoutClient, SubmitResponse};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FlatscoutClient::connect("http://127.0.0.1:9531").await?;
//!
//!     match client.submit("https://www.wgzimmer.ch/wglink/de/42.html").await? {
//!         SubmitResponse::Listing(fields) => println!("{} fields", fields.len()),
//!         SubmitResponse::Status(s) => println!("status: {:?}", s.status),
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::FlatscoutClient;
pub use error::{Result, SdkError};
pub use types::{
    Coordinates, DeleteResponse, Destination, Job, JobStatus, Listing, ListingId,
    RecomputeAllResponse, RecomputeRequest, RecomputeResponse, RecomputeResult, Stats,
    StatusOnly, SubmitResponse, TransportTimes,
};
