// Flatscout Infrastructure - HTTP Adapters
// Implements: PageFetcher, Geocoder, TravelPlanner

mod client;
mod google;
mod page_fetcher;

#[cfg(test)]
mod test_server;

pub use client::build_client;
pub use google::{GoogleGeocoder, GoogleMapsConfig, GoogleTravelPlanner, DEFAULT_MAPS_BASE_URL};
pub use page_fetcher::HttpPageFetcher;
