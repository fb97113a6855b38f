// Section walker shared by every markup convention

use crate::convention::MarkupConvention;
use crate::labels::{clean_value, normalize_label, strip_label};
use crate::vocabulary::{section_for_heading, LabelStyle, SectionKind, LINK_VALUE_KEYS};
use flatscout_core::domain::ExtractedListing;
use scraper::{ElementRef, Html};
use tracing::trace;

fn is_heading(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// All heading elements in document order
pub fn headings(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(is_heading)
        .collect()
}

pub fn heading_text(heading: ElementRef<'_>) -> String {
    heading.text().collect()
}

/// Element siblings after `heading`, up to the next heading
pub fn following_blocks<'a>(heading: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|el| !is_heading(el))
}

/// Walk every vocabulary section the convention accepts
///
/// Only the first heading per section title is used.
pub fn extract_sections(
    headings: &[ElementRef<'_>],
    convention: &dyn MarkupConvention,
) -> ExtractedListing {
    let mut listing = ExtractedListing::new();
    let mut visited: Vec<&'static str> = Vec::new();

    for heading in headings.iter().copied() {
        if !convention.accepts_heading(heading) {
            continue;
        }
        let Some(section) = section_for_heading(&heading_text(heading)) else {
            continue;
        };
        if visited.contains(&section.title) {
            continue;
        }
        visited.push(section.title);
        trace!(section = section.title, "Walking section");

        match section.kind {
            SectionKind::Tabular(style) => {
                let items = following_blocks(heading)
                    .flat_map(|block| convention.item_blocks(block))
                    .filter_map(|item| read_item(item, style));
                for (key, value) in items {
                    match value {
                        Some(value) => listing.insert(key, value),
                        None => listing.insert_absent(key),
                    }
                }
            }
            SectionKind::FreeText(key) => {
                let paragraph = following_blocks(heading).find(|b| b.value().name() == "p");
                if let Some(text) = paragraph.map(free_text).filter(|t| !t.is_empty()) {
                    listing.insert(key, text);
                }
            }
        }
    }

    listing
}

/// Label/value from one item; unlabelled items are skipped
fn read_item(item: ElementRef<'_>, style: LabelStyle) -> Option<(String, Option<String>)> {
    let label = item
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "strong" | "b"))?;
    let raw_label: String = label.text().collect();
    if strip_label(&raw_label).is_empty() {
        return None;
    }
    let key = normalize_label(&raw_label, style);

    let from_link = style == LabelStyle::Address && LINK_VALUE_KEYS.contains(&key.as_str());
    let value = if from_link {
        link_text(item).unwrap_or_else(|| direct_text(item))
    } else {
        direct_text(item)
    };
    let value = clean_value(&value);

    Some((key, (!value.is_empty()).then_some(value)))
}

/// Text nodes that are direct children of the item (label markup excluded)
fn direct_text(item: ElementRef<'_>) -> String {
    item.children()
        .filter_map(|child| child.value().as_text())
        .map(|text| &**text)
        .collect()
}

fn link_text(item: ElementRef<'_>) -> Option<String> {
    item.descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Paragraph text with `<br>` as `\n` and decorative labels removed
///
/// A label is any `<label>`, or a `<strong>`/`<b>` that opens the paragraph; a colon
/// right after an opening label goes with it. Emphasis elsewhere keeps its text.
fn free_text(paragraph: ElementRef<'_>) -> String {
    let mut out = String::new();
    let mut at_start = true;
    let mut after_label = false;

    for child in paragraph.children() {
        if let Some(text) = child.value().as_text() {
            let mut text: &str = text;
            if after_label && !text.trim().is_empty() {
                let rest = text.trim_start();
                text = rest.strip_prefix(':').unwrap_or(rest);
                after_label = false;
            }
            if !text.trim().is_empty() {
                at_start = false;
            }
            out.push_str(text);
        } else if let Some(element) = ElementRef::wrap(child) {
            let opening_label = at_start && matches!(element.value().name(), "strong" | "b");
            at_start = false;
            if opening_label {
                after_label = true;
                continue;
            }
            push_inline(element, &mut out);
        }
    }

    out.trim().to_string()
}

fn push_inline(element: ElementRef<'_>, out: &mut String) {
    match element.value().name() {
        "br" => out.push('\n'),
        "label" => {}
        _ => {
            for child in element.children() {
                if let Some(text) = child.value().as_text() {
                    out.push_str(text);
                } else if let Some(child) = ElementRef::wrap(child) {
                    push_inline(child, out);
                }
            }
        }
    }
}
