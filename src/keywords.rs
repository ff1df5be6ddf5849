//! Title keyword extraction.
//!
//! Counts significant title words over a paper collection, typically whatever the
//! current filter lets through, and ranks them by frequency.
//!
//! Tokenization per title:
//!
//! 1. lowercase
//! 2. replace every character outside `[a-z0-9]` and whitespace with a space
//! 3. split on whitespace runs
//! 4. drop tokens of two characters or fewer and [`STOPWORDS`]
//!
//! Equal counts keep first-occurrence order.
//!
//! # Example
//!
//! ```
//! use paperlens::{KeywordExtractor, Paper};
//!
//! let papers = vec![
//!     Paper { title: Some("Scalable Consensus Protocols".to_string()), ..Default::default() },
//!     Paper { title: Some("Consensus in Blockchain Systems".to_string()), ..Default::default() },
//! ];
//!
//! let keywords = KeywordExtractor::new().extract(&papers);
//! assert_eq!(keywords[0].word, "consensus");
//! assert_eq!(keywords[0].count, 2);
//! assert!(keywords.iter().all(|k| k.word != "blockchain"));
//! ```

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::Paper;

/// Default number of keywords returned.
pub const DEFAULT_LIMIT: usize = 40;

/// Words never reported as keywords.
///
/// Common English function words, a few filler words of paper titles, and the
/// survey's own topic word, which would otherwise top every list.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
    "dare", "ought", "used", "it", "its", "this", "that", "these", "those", "i", "you", "he",
    "she", "we", "they", "what", "which", "who", "whom", "whose", "where", "when", "why", "how",
    "all", "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor",
    "not", "only", "own", "same", "so", "than", "too", "very", "just", "also", "now", "here",
    "there", "then", "once", "if", "unless", "until", "while", "about", "after", "before",
    "between", "into", "through", "during", "above", "below", "up", "down", "out", "off", "over",
    "under", "again", "further", "any", "based", "using", "via",
    // survey topic
    "blockchain",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// A word and the number of times it occurs across the extracted titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: CompactString,
    pub count: usize,
}

/// Configurable keyword extractor.
///
/// # Examples
///
/// ```
/// use paperlens::KeywordExtractor;
///
/// let extractor = KeywordExtractor::new()
///     .with_limit(10)
///     .with_extra_stopwords(["survey", "towards"]);
/// ```
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    limit: usize,
    min_len: usize,
    extra_stopwords: HashSet<CompactString>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Creates an extractor returning up to 40 keywords of three or more characters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            min_len: 3,
            extra_stopwords: HashSet::new(),
        }
    }

    /// Sets the maximum number of keywords returned.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the minimum token length kept.
    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Adds words to exclude on top of [`STOPWORDS`].
    #[must_use]
    pub fn with_extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extra_stopwords
            .extend(words.into_iter().map(|w| CompactString::from(w.as_ref().to_lowercase())));
        self
    }

    fn is_stopword(&self, word: &str) -> bool {
        STOPWORD_SET.contains(word) || self.extra_stopwords.contains(word)
    }

    /// Ranks the keywords of the given papers' titles by descending count.
    pub fn extract<'a, I>(&self, papers: I) -> Vec<Keyword>
    where
        I: IntoIterator<Item = &'a Paper>,
    {
        let mut keywords: Vec<Keyword> = Vec::new();
        let mut index: HashMap<CompactString, usize> = HashMap::new();

        for paper in papers {
            let normalized = normalize_title(paper.title_or_empty());
            for word in normalized.split_whitespace() {
                if word.len() < self.min_len || self.is_stopword(word) {
                    continue;
                }
                match index.get(word) {
                    Some(&i) => keywords[i].count += 1,
                    None => {
                        index.insert(CompactString::from(word), keywords.len());
                        keywords.push(Keyword {
                            word: CompactString::from(word),
                            count: 1,
                        });
                    }
                }
            }
        }

        // stable sort keeps first-occurrence order among equal counts
        keywords.sort_by(|a, b| b.count.cmp(&a.count));
        keywords.truncate(self.limit);
        keywords
    }
}

/// Extracts up to `limit` keywords with the default stopwords.
pub fn extract_keywords<'a, I>(papers: I, limit: usize) -> Vec<Keyword>
where
    I: IntoIterator<Item = &'a Paper>,
{
    KeywordExtractor::new().with_limit(limit).extract(papers)
}

fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}
