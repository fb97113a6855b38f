// Label and value normalization

use crate::vocabulary::LabelStyle;

/// Normalize an item label into a field key
///
/// `Miete / Monat:` -> `miete_/_monat` (data), `Kreis / Quartier` -> `kreis_quartier` (address)
pub fn normalize_label(raw: &str, style: LabelStyle) -> String {
    let label = collapse_whitespace(&strip_label(raw).to_lowercase());
    let label = match style {
        LabelStyle::Data => label,
        LabelStyle::Address => label.replace(" / ", "_"),
    };
    label.replace(' ', "_")
}

/// Trim and drop a trailing `:`
pub fn strip_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_suffix(':').unwrap_or(trimmed).trim_end()
}

/// Trim and drop a leading `:` separator
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix(':').unwrap_or(trimmed).trim().to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
