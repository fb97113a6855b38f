// Domain Layer - Pure business logic and entities

pub mod error;
pub mod extracted;
pub mod listing;
pub mod transport;

// Re-exports
pub use error::DomainError;
pub use extracted::{keys, ExtractedListing};
pub use listing::{JobStatus, ListingId, ListingJob};
pub use transport::{Coordinates, Destination, TransportMetrics, TravelEstimate, TravelMode};
