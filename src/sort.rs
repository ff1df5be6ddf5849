//! Paper ordering.
//!
//! Sorting is stable and keeps papers with a missing sort value at the end in both
//! directions: `desc` reverses the comparison of two present values only.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::Paper;

/// Paper fields that can be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Type,
    Title,
    Doi,
    Year,
    Publisher,
    Key,
    Pub,
    Rank,
    Category,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// How a field is read and compared.
#[derive(Clone, Copy)]
enum SortKey {
    Text(fn(&Paper) -> Option<&str>),
    Number(fn(&Paper) -> Option<i64>),
}

impl SortField {
    fn key(self) -> SortKey {
        match self {
            SortField::Type => SortKey::Text(|p| p.paper_type.as_deref()),
            SortField::Title => SortKey::Text(|p| p.title.as_deref()),
            SortField::Doi => SortKey::Text(|p| p.doi.as_deref()),
            SortField::Year => SortKey::Number(|p| p.year),
            SortField::Publisher => SortKey::Text(|p| p.publisher.as_deref()),
            SortField::Key => SortKey::Text(|p| p.key.as_deref()),
            SortField::Pub => SortKey::Text(|p| Some(p.publisher_abbr.as_str())),
            SortField::Rank => SortKey::Text(|p| p.rank.as_deref()),
            SortField::Category => SortKey::Number(|p| p.category.map(i64::from)),
        }
    }
}

/// The active sort column and direction. No field means load order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// Column-header click behaviour: the active ascending column flips to descending,
    /// anything else becomes the active column ascending.
    pub fn toggle(&mut self, field: SortField) {
        self.direction = if self.field == Some(field) && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.field = Some(field);
    }

    /// Compares two papers under this configuration.
    pub fn compare(&self, a: &Paper, b: &Paper) -> Ordering {
        let Some(field) = self.field else {
            return Ordering::Equal;
        };
        match field.key() {
            SortKey::Text(get) => self.order_present(get(a), get(b), |x, y| locale_cmp(x, y)),
            SortKey::Number(get) => self.order_present(get(a), get(b), |x, y| x.cmp(y)),
        }
    }

    /// Missing values go last; the direction applies to present values only.
    fn order_present<T>(
        &self,
        a: Option<T>,
        b: Option<T>,
        cmp: impl FnOnce(&T, &T) -> Ordering,
    ) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match self.direction {
                SortDirection::Asc => cmp(&x, &y),
                SortDirection::Desc => cmp(&x, &y).reverse(),
            },
        }
    }
}

/// Collation-style string comparison.
///
/// Strings compare by their base letters first, with diacritics removed and case
/// folded, so `Étude` sorts between `Epoch` and `Fault`. Ties are broken by accents
/// (unaccented first), then case (lowercase first), then code point order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented_letters(a).cmp(accented_letters(b)))
        .then_with(|| a.nfd().map(char::is_uppercase).cmp(b.nfd().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|&c| !is_combining_mark(c))
        .flat_map(char::to_lowercase)
}

fn accented_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Sorts papers by the configured field. Without a field the input is returned as is.
pub fn sort_papers<'a>(mut papers: Vec<&'a Paper>, config: &SortConfig) -> Vec<&'a Paper> {
    if config.field.is_some() {
        // stable: equal values keep their input order
        papers.sort_by(|a, b| config.compare(a, b));
    }
    papers
}
