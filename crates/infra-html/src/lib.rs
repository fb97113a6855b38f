// Flatscout Infrastructure - HTML Adapter
// Implements: ListingExtractor

mod convention;
mod extractor;
mod labels;
mod vocabulary;
mod walker;

pub use convention::{MarkupConvention, CONVENTIONS};
pub use extractor::HtmlListingExtractor;
