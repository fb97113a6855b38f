// Flatscout Infrastructure - SQLite Adapter
// Implements: ListingRepository

mod connection;
mod listing_repository;
mod migration;

pub use connection::create_pool;
pub use listing_repository::SqliteListingRepository;
pub use migration::run_migrations;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
