//! Paper augmentation.
//!
//! Turns decoded [`RawPaper`]s into [`Paper`]s by attaching the publisher abbreviation
//! and the rank and category of the venue matched by key prefix.

use tracing::debug;

use crate::venue::{VenueEntry, match_venue};
use crate::{Paper, RawPaper};

/// Augments every raw paper against the venue table.
///
/// Output order matches input order and no record is ever dropped. Records missing a
/// key simply get no rank or category; records missing a publisher get an empty
/// abbreviation.
pub fn augment(raw: &[RawPaper], venues: &[VenueEntry]) -> Vec<Paper> {
    let papers: Vec<Paper> = raw.iter().map(|r| augment_one(r, venues)).collect();
    debug!(
        papers = papers.len(),
        ranked = papers.iter().filter(|p| p.rank.is_some()).count(),
        "augmented papers"
    );
    papers
}

fn augment_one(raw: &RawPaper, venues: &[VenueEntry]) -> Paper {
    let venue = raw
        .key
        .as_deref()
        .and_then(|key| match_venue(key, venues));

    let rank = venue
        .map(|v| v.rank.trim())
        .filter(|r| !r.is_empty())
        .map(String::from);
    let category = venue.map(|v| v.category).filter(|&c| c != 0);

    Paper {
        paper_type: raw.paper_type.clone(),
        title: raw.title.clone(),
        doi: raw.doi.clone(),
        year: raw.year,
        publisher: raw.publisher.clone(),
        key: raw.key.clone(),
        authors: raw.authors.clone(),
        publisher_abbr: publisher_abbreviation(raw.publisher.as_deref().unwrap_or_default()),
        rank,
        category,
    }
}

/// Concatenates the uppercase ASCII letters of a publisher name.
///
/// # Examples
///
/// ```
/// use paperlens::augment::publisher_abbreviation;
///
/// assert_eq!(publisher_abbreviation("Springer International Publishing AG"), "SIPAG");
/// assert_eq!(publisher_abbreviation("elsevier"), "");
/// ```
pub fn publisher_abbreviation(publisher: &str) -> String {
    publisher
        .chars()
        .filter(char::is_ascii_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn venue(crossref: &str, rank: &str, category: u32) -> VenueEntry {
        VenueEntry {
            crossref: crossref.to_string(),
            rank: rank.to_string(),
            category,
            ..Default::default()
        }
    }

    fn raw(key: Option<&str>, publisher: Option<&str>) -> RawPaper {
        RawPaper {
            title: Some("A Paper".to_string()),
            key: key.map(String::from),
            publisher: publisher.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_publisher_abbreviation() {
        assert_eq!(publisher_abbreviation("IEEE Computer Society"), "IEEECS");
        assert_eq!(publisher_abbreviation("ACM"), "ACM");
        assert_eq!(publisher_abbreviation("Ünïcode Ärger"), "");
        assert_eq!(publisher_abbreviation(""), "");
    }

    #[test]
    fn test_rank_and_category_from_matched_venue() {
        let venues = vec![venue("conf/ccs", " A ", 1)];
        let papers = augment(&[raw(Some("conf/ccs/Smith20"), Some("ACM"))], &venues);

        assert_eq!(papers[0].rank.as_deref(), Some("A"));
        assert_eq!(papers[0].category, Some(1));
        assert_eq!(papers[0].publisher_abbr, "ACM");
    }

    #[test]
    fn test_blank_rank_and_zero_category_are_absent() {
        let venues = vec![venue("conf/ccs", "  ", 0)];
        let papers = augment(&[raw(Some("conf/ccs/Smith20"), None)], &venues);

        assert_eq!(papers[0].rank, None);
        assert_eq!(papers[0].category, None);
        assert_eq!(papers[0].publisher_abbr, "");
    }

    #[test]
    fn test_rank_and_category_are_independent() {
        let venues = vec![venue("conf/ccs", "B", 0), venue("conf/sp", "", 4)];
        let papers = augment(
            &[
                raw(Some("conf/ccs/Smith20"), None),
                raw(Some("conf/sp/Doe21"), None),
            ],
            &venues,
        );

        assert_eq!(papers[0].rank.as_deref(), Some("B"));
        assert_eq!(papers[0].category, None);
        assert_eq!(papers[1].rank, None);
        assert_eq!(papers[1].category, Some(4));
    }

    #[test]
    fn test_unmatched_and_keyless_records_pass_through() {
        let venues = vec![venue("conf/ccs", "A", 1)];
        let input = vec![
            raw(None, Some("Springer")),
            RawPaper::default(),
            raw(Some("journals/tdsc/X"), None),
        ];
        let papers = augment(&input, &venues);

        assert_eq!(papers.len(), 3);
        assert!(papers.iter().all(|p| p.rank.is_none() && p.category.is_none()));
        assert_eq!(papers[0].publisher_abbr, "S");
        assert_eq!(papers[1].title, None);
    }

    #[test]
    fn test_output_preserves_order_and_fields() {
        let input = vec![
            RawPaper {
                paper_type: Some("article".to_string()),
                title: Some("First".to_string()),
                doi: Some("10.1/a".to_string()),
                year: Some(2021),
                authors: Some(vec!["A".to_string()]),
                ..Default::default()
            },
            RawPaper {
                title: Some("Second".to_string()),
                ..Default::default()
            },
        ];
        let papers = augment(&input, &[]);

        assert_eq!(papers[0].title.as_deref(), Some("First"));
        assert_eq!(papers[0].paper_type.as_deref(), Some("article"));
        assert_eq!(papers[0].doi.as_deref(), Some("10.1/a"));
        assert_eq!(papers[0].year, Some(2021));
        assert_eq!(papers[0].authors, Some(vec!["A".to_string()]));
        assert_eq!(papers[1].title.as_deref(), Some("Second"));
    }

    #[test]
    fn test_augment_is_idempotent() {
        let venues = vec![venue("conf/ccs", "A", 1), venue("conf/", "C", 2)];
        let input = vec![
            raw(Some("conf/ccs/Smith20"), Some("ACM")),
            raw(Some("conf/ndss/Lee19"), Some("Internet Society")),
        ];
        assert_eq!(augment(&input, &venues), augment(&input, &venues));
    }
}
