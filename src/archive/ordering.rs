//! Field selectors for searching and sorting tomes

use crate::models::Tome;

/// Which text field of a tome a search or sort applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TomeField {
    Title,
    Author,
    Category,
}

impl TomeField {
    pub fn key(self, tome: &Tome) -> &str {
        match self {
            TomeField::Title => tome.title(),
            TomeField::Author => tome.author(),
            TomeField::Category => tome.category(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TomeField::Title => "title",
            TomeField::Author => "author",
            TomeField::Category => "category",
        }
    }
}

impl std::fmt::Display for TomeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Case-insensitive containment of an already-lowercased fragment; an empty
/// fragment matches everything
pub fn contains_lowercase(haystack: &str, lowered_fragment: &str) -> bool {
    haystack.to_lowercase().contains(lowered_fragment)
}

/// Stable, case-insensitive ascending sort on the selected field
pub fn sort_ignore_case(tomes: &mut [Tome], field: TomeField) {
    tomes.sort_by_cached_key(|tome| field.key(tome).to_lowercase());
}
