// HTML ListingExtractor Implementation

use crate::convention::detect;
use crate::walker::{extract_sections, headings};
use flatscout_core::domain::ExtractedListing;
use flatscout_core::port::{ExtractionError, ListingExtractor};
use scraper::Html;
use tracing::debug;

/// Convention-aware extractor for listing pages
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlListingExtractor;

impl HtmlListingExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl ListingExtractor for HtmlListingExtractor {
    fn extract(&self, html: &str) -> Result<ExtractedListing, ExtractionError> {
        let document = Html::parse_document(html);
        let headings = headings(&document);
        let convention = detect(&headings);
        debug!(
            convention = convention.name(),
            headings = headings.len(),
            "Extracting listing"
        );

        let listing = extract_sections(&headings, convention);
        if listing.is_empty() {
            return Err(ExtractionError::Empty);
        }
        debug!(fields = listing.len(), "Extracted listing");
        Ok(listing)
    }
}
