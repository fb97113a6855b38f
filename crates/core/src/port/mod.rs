// Port Layer - Interfaces for external dependencies

pub mod listing_extractor;
pub mod listing_repository;
pub mod maps;
pub mod page_fetcher;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use listing_extractor::{ExtractionError, ListingExtractor};
pub use listing_repository::ListingRepository;
pub use maps::{EnrichmentError, Geocoder, TravelPlanner};
pub use page_fetcher::{FetchError, PageFetcher};
pub use time_provider::TimeProvider;
