// Listing Extractor Port
// Markup -> flat field mapping. Synchronous: parsing never suspends.

use crate::domain::ExtractedListing;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No section heading matched anything usable
    #[error("No listing sections found in markup")]
    Empty,
}

/// Extraction capability
///
/// Implementations:
/// - HtmlListingExtractor (infra-html): convention-aware HTML section walker
pub trait ListingExtractor: Send + Sync {
    /// Extract a non-empty listing
    ///
    /// # Errors
    /// - ExtractionError::Empty if nothing on the page matched
    fn extract(&self, html: &str) -> Result<ExtractedListing, ExtractionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Reads `key: value` lines; blank pages are Empty
    pub struct LineExtractor;

    impl ListingExtractor for LineExtractor {
        fn extract(&self, html: &str) -> Result<ExtractedListing, ExtractionError> {
            let listing: ExtractedListing = html
                .lines()
                .filter_map(|line| line.split_once(':'))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .filter(|(k, _)| !k.is_empty())
                .collect();

            if listing.is_empty() {
                return Err(ExtractionError::Empty);
            }
            Ok(listing)
        }
    }
}
