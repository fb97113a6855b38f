// Markup conventions: which blocks hold label/value items and which headings count

use crate::vocabulary::{section_for_heading, Section};
use crate::walker::{following_blocks, heading_text};
use scraper::ElementRef;

/// Class that marks section headings on newer listing pages
const HEADING_MARKER_CLASS: &str = "label";

/// One way listing pages lay out their sections
pub trait MarkupConvention: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this heading may open a section
    fn accepts_heading(&self, heading: ElementRef<'_>) -> bool;

    /// Label/value items held by one block that follows a section heading
    fn item_blocks<'a>(&self, block: ElementRef<'a>) -> Vec<ElementRef<'a>>;
}

/// `<li>` items inside a `<ul>` after the heading
pub struct ListItems {
    marked: bool,
}

/// Labelled `<p>` blocks after the heading
pub struct Paragraphs {
    marked: bool,
}

fn is_marked(heading: ElementRef<'_>) -> bool {
    heading
        .value()
        .classes()
        .any(|class| class == HEADING_MARKER_CLASS)
}

fn has_label(block: ElementRef<'_>) -> bool {
    block
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|el| matches!(el.value().name(), "strong" | "b"))
}

impl MarkupConvention for ListItems {
    fn name(&self) -> &'static str {
        if self.marked {
            "list-items-marked"
        } else {
            "list-items"
        }
    }

    fn accepts_heading(&self, heading: ElementRef<'_>) -> bool {
        !self.marked || is_marked(heading)
    }

    fn item_blocks<'a>(&self, block: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        if block.value().name() != "ul" {
            return Vec::new();
        }
        block
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "li")
            .collect()
    }
}

impl MarkupConvention for Paragraphs {
    fn name(&self) -> &'static str {
        if self.marked {
            "paragraphs-marked"
        } else {
            "paragraphs"
        }
    }

    fn accepts_heading(&self, heading: ElementRef<'_>) -> bool {
        !self.marked || is_marked(heading)
    }

    fn item_blocks<'a>(&self, block: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        if block.value().name() == "p" && has_label(block) {
            vec![block]
        } else {
            Vec::new()
        }
    }
}

/// Detection order: marked conventions first, list items before paragraphs
pub static CONVENTIONS: [&dyn MarkupConvention; 4] = [
    &ListItems { marked: true },
    &Paragraphs { marked: true },
    &ListItems { marked: false },
    &Paragraphs { marked: false },
];

/// Used when no convention is detected; free-text sections can still match
static FALLBACK: &dyn MarkupConvention = &ListItems { marked: false };

/// Pick the first convention the page uses
///
/// A page uses a convention when a tabular section heading it accepts is followed by
/// one of its item blocks.
pub fn detect(headings: &[ElementRef<'_>]) -> &'static dyn MarkupConvention {
    CONVENTIONS
        .iter()
        .copied()
        .find(|convention| uses(*convention, headings))
        .unwrap_or(FALLBACK)
}

fn uses(convention: &dyn MarkupConvention, headings: &[ElementRef<'_>]) -> bool {
    headings.iter().copied().any(|heading| {
        convention.accepts_heading(heading)
            && section_for_heading(&heading_text(heading)).is_some_and(Section::is_tabular)
            && following_blocks(heading).any(|block| !convention.item_blocks(block).is_empty())
    })
}
