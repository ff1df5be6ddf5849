//! Venue reference data and key-prefix matching.
//!
//! Venues come from a ranking table (CCF style) where each row links to a DBLP
//! listing. The DBLP path of that link, e.g. `conf/ccs` or `journals/tdsc`, is the
//! venue's *crossref*: every paper whose DBLP key starts with it belongs to the venue.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::regex::Regex;

static DBLP_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://dblp\.uni-trier\.de/db/((conf|journals)/.*?)(/|$)").unwrap()
});

/// Kind of publication outlet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VenueKind {
    Journal,
    #[default]
    Meeting,
}

impl VenueKind {
    /// Interprets the table's type column. Only the exact text `Journal` is a journal.
    pub fn from_table_value(value: &str) -> Self {
        if value == "Journal" {
            VenueKind::Journal
        } else {
            VenueKind::Meeting
        }
    }
}

/// A row of the venue ranking table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueEntry {
    /// Table id, `None` when the row's id was not numeric
    pub id: Option<i64>,
    /// Short name, e.g. `CCS`
    pub title: String,
    pub full_name: String,
    pub publisher: String,
    pub url: String,
    /// Free-form rank; `A`, `B` and `C` are the meaningful values
    pub rank: String,
    pub kind: VenueKind,
    /// Category id, `0` when unset
    pub category: u32,
    /// DBLP key prefix derived from `url`, empty when it could not be derived
    pub crossref: String,
}

/// A row of the category table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: i64,
    /// Short display glyph
    pub icon: String,
    pub title: String,
    pub url: String,
}

/// Extracts the DBLP key prefix from a venue URL.
///
/// Returns an empty string when the URL is not a DBLP `conf/` or `journals/` listing.
///
/// # Examples
///
/// ```
/// use paperlens::venue::crossref_from_url;
///
/// assert_eq!(crossref_from_url("https://dblp.uni-trier.de/db/conf/ccs/"), "conf/ccs");
/// assert_eq!(crossref_from_url("https://example.org/ccs"), "");
/// ```
pub fn crossref_from_url(url: &str) -> String {
    DBLP_URL_REGEX
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Finds the venue a paper key belongs to.
///
/// Venues are scanned in the given order and the first one whose non-empty crossref
/// is a prefix of `paper_key` wins. There is no longest-prefix preference: with
/// `conf/` listed before `conf/ccs`, every conference key matches `conf/`.
pub fn match_venue<'a>(paper_key: &str, venues: &'a [VenueEntry]) -> Option<&'a VenueEntry> {
    if paper_key.is_empty() {
        return None;
    }
    venues
        .iter()
        .find(|venue| !venue.crossref.is_empty() && paper_key.starts_with(&venue.crossref))
}

/// Looks up a category by id.
pub fn find_category(id: u32, categories: &[CategoryEntry]) -> Option<&CategoryEntry> {
    categories.iter().find(|c| c.id == i64::from(id))
}
