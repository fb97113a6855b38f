// Section vocabulary: German section titles on listing pages

use flatscout_core::domain::keys;

/// How a section's content becomes fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// One field per labelled item
    Tabular(LabelStyle),
    /// One field holding the first paragraph
    FreeText(&'static str),
}

/// Label normalization rules differ per tabular section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    /// Whitespace runs become `_`
    Data,
    /// ` / ` collapses to `_` first, then whitespace runs become `_`
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub kind: SectionKind,
}

pub const SECTIONS: [Section; 5] = [
    Section {
        title: "Daten und Miete",
        kind: SectionKind::Tabular(LabelStyle::Data),
    },
    Section {
        title: "Adresse",
        kind: SectionKind::Tabular(LabelStyle::Address),
    },
    Section {
        title: "Beschreibung",
        kind: SectionKind::FreeText(keys::DESCRIPTION),
    },
    Section {
        title: "Wir suchen",
        kind: SectionKind::FreeText(keys::SEEKING),
    },
    Section {
        title: "Wir sind",
        kind: SectionKind::FreeText(keys::WE_ARE),
    },
];

/// Address keys rendered as links; their value is the link text
pub const LINK_VALUE_KEYS: [&str; 2] = [keys::REGION, keys::DISTRICT];

/// Section whose title occurs in the heading text
pub fn section_for_heading(heading_text: &str) -> Option<&'static Section> {
    let text = heading_text.trim();
    SECTIONS.iter().find(|s| text.contains(s.title))
}

impl Section {
    pub fn is_tabular(&self) -> bool {
        matches!(self.kind, SectionKind::Tabular(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_match() {
        assert_eq!(
            section_for_heading("  Beschreibungen ").map(|s| s.title),
            Some("Beschreibung")
        );
        assert_eq!(
            section_for_heading("Wir sind").map(|s| s.kind),
            Some(SectionKind::FreeText(keys::WE_ARE))
        );
        assert!(section_for_heading("Kontakt").is_none());
    }
}
