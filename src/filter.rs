//! Compound paper filtering.
//!
//! A [`FilterCriteria`] combines four independent predicates with logical AND:
//!
//! - a title query of whitespace-separated tokens; `-token` excludes titles containing it
//! - an exact publication year
//! - a [`RankBucket`]
//! - an exact category id
//!
//! # Example
//!
//! ```
//! use paperlens::Paper;
//! use paperlens::filter::{FilterCriteria, filter_papers};
//!
//! let papers = vec![
//!     Paper { title: Some("Byzantine Fault Tolerance".to_string()), ..Default::default() },
//!     Paper { title: Some("Fault Injection Attacks".to_string()), ..Default::default() },
//! ];
//! let criteria = FilterCriteria {
//!     title: "fault -byzantine".to_string(),
//!     ..Default::default()
//! };
//!
//! let matched = filter_papers(&papers, &criteria);
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0].title_or_empty(), "Fault Injection Attacks");
//! ```

use either::{Left, Right};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::{Error, Paper};

const RANKED: [&str; 3] = ["A", "B", "C"];

/// Grouping of venue ranks used by the rank filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RankBucket {
    /// No constraint
    #[default]
    Any,
    /// Rank is one of `A`, `B`, `C`
    #[serde(rename = "ABC")]
    Abc,
    A,
    B,
    C,
    /// Rank is absent or anything other than `A`, `B`, `C`
    #[serde(rename = "NotABC")]
    NotAbc,
}

impl RankBucket {
    /// All buckets in menu order.
    pub const ALL: [RankBucket; 6] = [
        RankBucket::Any,
        RankBucket::Abc,
        RankBucket::A,
        RankBucket::B,
        RankBucket::C,
        RankBucket::NotAbc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankBucket::Any => "Any",
            RankBucket::Abc => "ABC",
            RankBucket::A => "A",
            RankBucket::B => "B",
            RankBucket::C => "C",
            RankBucket::NotAbc => "NotABC",
        }
    }

    /// Tests a paper's rank against this bucket.
    pub fn matches(&self, rank: Option<&str>) -> bool {
        let ranked = rank.is_some_and(|r| RANKED.contains(&r));
        match self {
            RankBucket::Any => true,
            RankBucket::Abc => ranked,
            RankBucket::NotAbc => !ranked,
            exact => rank == Some(exact.as_str()),
        }
    }
}

impl fmt::Display for RankBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankBucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankBucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str() == s)
            .ok_or_else(|| Error::InvalidFieldValue {
                field: "rank".to_string(),
                message: format!("unknown rank bucket `{s}`"),
            })
    }
}

/// A parsed title search string.
///
/// Tokens are lowercased and split on whitespace runs. A token starting with `-` is
/// an exclusion token with the leading `-` removed; a lone `-` yields nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleQuery {
    positive: Vec<String>,
    negative: Vec<String>,
}

impl TitleQuery {
    pub fn parse(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let (positive, negative): (Vec<String>, Vec<String>) = lowered
            .split_whitespace()
            .partition_map(|token| match token.strip_prefix('-') {
                Some(excluded) => Right(excluded.to_string()),
                None => Left(token.to_string()),
            });

        Self {
            positive,
            negative: negative.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    /// Tokens every matching title must contain.
    pub fn positive(&self) -> &[String] {
        &self.positive
    }

    /// Tokens no matching title may contain.
    pub fn negative(&self) -> &[String] {
        &self.negative
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Case-insensitive substring test of a title against both token sets.
    pub fn matches(&self, title: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let title = title.to_lowercase();
        self.positive.iter().all(|t| title.contains(t.as_str()))
            && !self.negative.iter().any(|t| title.contains(t.as_str()))
    }

    /// Byte ranges of `title` covered by positive tokens, ordered and merged.
    pub fn highlight_ranges(&self, title: &str) -> Vec<Range<usize>> {
        title
            .char_indices()
            .flat_map(|(start, _)| {
                self.positive.iter().filter_map(move |token| {
                    match_len_ignore_case(&title[start..], token).map(|len| start..start + len)
                })
            })
            .sorted_by_key(|r| (r.start, r.end))
            .coalesce(|a, b| {
                if b.start <= a.end {
                    Ok(a.start..a.end.max(b.end))
                } else {
                    Err((a, b))
                }
            })
            .collect()
    }
}

/// Length in bytes of the prefix of `haystack` that equals the lowercase `needle`
/// once lowercased, if any.
fn match_len_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let mut needle_chars = needle.chars().peekable();
    for (offset, ch) in haystack.char_indices() {
        if needle_chars.peek().is_none() {
            return Some(offset);
        }
        for lower in ch.to_lowercase() {
            if needle_chars.next() != Some(lower) {
                return None;
            }
        }
    }
    needle_chars.peek().is_none().then_some(haystack.len())
}

/// The filter state applied to a paper collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Raw title search string
    pub title: String,
    pub year: Option<i64>,
    pub rank: RankBucket,
    pub category: Option<u32>,
}

impl FilterCriteria {
    /// Parses the title query once for repeated matching.
    pub fn compile(&self) -> PaperFilter {
        PaperFilter {
            query: TitleQuery::parse(&self.title),
            year: self.year,
            rank: self.rank,
            category: self.category,
        }
    }

    /// Whether no predicate constrains the collection.
    pub fn is_unconstrained(&self) -> bool {
        TitleQuery::parse(&self.title).is_empty()
            && self.year.is_none()
            && self.rank == RankBucket::Any
            && self.category.is_none()
    }
}

/// A [`FilterCriteria`] with its title query already parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    query: TitleQuery,
    year: Option<i64>,
    rank: RankBucket,
    category: Option<u32>,
}

impl PaperFilter {
    pub fn query(&self) -> &TitleQuery {
        &self.query
    }

    pub fn matches(&self, paper: &Paper) -> bool {
        self.query.matches(paper.title_or_empty())
            && self.year.is_none_or(|year| paper.year == Some(year))
            && self.rank.matches(paper.rank.as_deref())
            && self
                .category
                .is_none_or(|category| paper.category == Some(category))
    }
}

/// Returns the papers satisfying every predicate, in input order.
pub fn filter_papers<'a>(papers: &'a [Paper], criteria: &FilterCriteria) -> Vec<&'a Paper> {
    let filter = criteria.compile();
    papers.iter().filter(|paper| filter.matches(paper)).collect()
}
