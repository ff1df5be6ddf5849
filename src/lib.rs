//! A library for loading, augmenting, filtering, and exploring bundled lists of academic papers.
//!
//! `paperlens` works on `paper.bin` files: msgpack-encoded paper lists produced by an
//! external corpus generator. It enriches each paper with venue rank and category data
//! from a reference table, and provides the filtering, sorting, pagination, and keyword
//! extraction a paper browser needs.
//!
//! # Key Features
//!
//! - **Binary decoding**: bare paper arrays or `{papers, filename, stats}` maps
//! - **Venue augmentation**:
//!   - Rank and category lookup by DBLP key prefix
//!   - Publisher abbreviations
//! - **Exploration**:
//!   - Compound filters with inclusion/exclusion title tokens
//!   - Stable sorting with missing values last
//!   - Clamped pagination
//!   - Title keyword frequencies
//! - **Session support**: recent-file cache and persisted search state
//!
//! # Basic Usage
//!
//! ```rust
//! use paperlens::{augment, filter::{FilterCriteria, RankBucket, filter_papers}, RawPaper, VenueEntry};
//!
//! let raw = vec![RawPaper {
//!     title: Some("Scalable Consensus Protocols".to_string()),
//!     key: Some("conf/ccs/Smith20".to_string()),
//!     publisher: Some("ACM Press".to_string()),
//!     year: Some(2020),
//!     ..Default::default()
//! }];
//! let venues = vec![VenueEntry {
//!     rank: "A".to_string(),
//!     category: 1,
//!     crossref: "conf/ccs".to_string(),
//!     ..Default::default()
//! }];
//!
//! let papers = augment(&raw, &venues);
//! assert_eq!(papers[0].publisher_abbr, "ACMP");
//!
//! let criteria = FilterCriteria {
//!     rank: RankBucket::A,
//!     ..Default::default()
//! };
//! assert_eq!(filter_papers(&papers, &criteria).len(), 1);
//! ```
//!
//! # Error Handling
//!
//! Only loading can fail. Decoding returns a [`decode::DecodeError`]; everything
//! downstream of augmentation is infallible and works on whatever collection it is given:
//!
//! ```rust
//! use paperlens::decode::{DecodeError, PaperBinDecoder};
//!
//! match PaperBinDecoder::new().decode(&[0xc1]) {
//!     Ok(payload) => println!("Loaded {} papers", payload.papers.len()),
//!     Err(DecodeError::InvalidFormat(msg)) => eprintln!("Not a paper.bin file: {}", msg),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```
//!
//! # Thread Safety
//!
//! Every pipeline function is pure over its inputs and keeps no global state, so a
//! caller may recompute on every keystroke and discard stale results freely.

use serde::{Deserialize, Serialize};
use thiserror::Error;

extern crate csv as csv_crate;

pub mod augment;
pub mod csv;
pub mod decode;
pub mod filter;
pub mod keywords;
pub mod paginate;
mod regex;
pub mod session;
pub mod sort;
pub mod storage;
mod utils;
pub mod venue;

// Reexports
pub use augment::augment;
pub use decode::{DecodedPayload, PaperBinDecoder};
pub use keywords::{Keyword, KeywordExtractor};
pub use session::Session;
pub use venue::{CategoryEntry, VenueEntry, VenueKind};

/// A specialized Result type for paperlens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced at the loading boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] decode::DecodeError),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid field value: {field} - {message}")]
    InvalidFieldValue { field: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<csv_crate::Error> for Error {
    fn from(err: csv_crate::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// A paper record as decoded from a `paper.bin` payload.
///
/// Fields missing from the source stay `None`; defaulting is left to consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPaper {
    /// Publication kind, e.g. `article` or `inproceedings`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub paper_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Used as the row identity by presentation layers; not guaranteed unique
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Hierarchical DBLP key whose prefix identifies the venue, e.g. `conf/ccs/Smith20`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
}

/// A paper enriched with venue rank, category and publisher abbreviation.
///
/// Papers are value records rebuilt on every load; nothing mutates them in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub paper_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<String>>,
    /// Uppercase ASCII letters of `publisher`, possibly empty
    #[serde(rename = "pub")]
    pub publisher_abbr: String,
    /// Trimmed rank of the matched venue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// Category id of the matched venue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u32>,
}

impl Paper {
    /// The title, or an empty string when the record has none.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }
}
