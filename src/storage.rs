//! Session persistence.
//!
//! Two small stores let a browsing session resume where it left off:
//!
//! - [`SearchState`], the page size and active filters, saved as JSON under
//!   [`SEARCH_KEY`] in any [`KeyValueStore`]
//! - [`PaperFileCache`], the most recently uploaded `paper.bin` files
//!
//! Both are best-effort. A missing or corrupt search state silently falls back to
//! the defaults, and a failed save is logged and otherwise ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::filter::{FilterCriteria, RankBucket};
use crate::utils::parse_leading_int;
use crate::{Error, Result};

/// Key the search state is stored under.
pub const SEARCH_KEY: &str = "SEARCH";

/// Page size used when nothing was saved.
pub const DEFAULT_PER_PAGE: usize = 20;

/// Number of uploaded files kept by [`PaperFileCache`].
pub const MAX_FILES: usize = 10;

/// A string key-value store, such as browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] when the backing store rejects the write.
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A saved filter value; older states store numbers as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(i64),
    Text(String),
}

impl FilterValue {
    fn as_text(&self) -> String {
        match self {
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Text(s) => s.clone(),
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            FilterValue::Number(n) => Some(*n),
            FilterValue::Text(s) => parse_leading_int(s),
        }
    }
}

/// One active filter: `title`, `year`, `rank` or `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub field: String,
    pub filter: FilterValue,
}

/// Persisted page size and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchState {
    pub per_page: usize,
    pub filters: Vec<SavedFilter>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            filters: Vec::new(),
        }
    }
}

impl SearchState {
    /// Captures the non-default parts of a filter state.
    pub fn from_criteria(criteria: &FilterCriteria, per_page: usize) -> Self {
        let mut filters = Vec::new();
        if !criteria.title.is_empty() {
            filters.push(SavedFilter {
                field: "title".to_string(),
                filter: FilterValue::Text(criteria.title.clone()),
            });
        }
        if let Some(year) = criteria.year {
            filters.push(SavedFilter {
                field: "year".to_string(),
                filter: FilterValue::Number(year),
            });
        }
        if criteria.rank != RankBucket::Any {
            filters.push(SavedFilter {
                field: "rank".to_string(),
                filter: FilterValue::Text(criteria.rank.to_string()),
            });
        }
        if let Some(category) = criteria.category {
            filters.push(SavedFilter {
                field: "category".to_string(),
                filter: FilterValue::Number(i64::from(category)),
            });
        }
        Self { per_page, filters }
    }

    /// Rebuilds filter criteria, skipping unknown fields and unparseable values.
    pub fn to_criteria(&self) -> FilterCriteria {
        let mut criteria = FilterCriteria::default();
        for saved in &self.filters {
            match saved.field.as_str() {
                "title" => criteria.title = saved.filter.as_text(),
                "year" => criteria.year = saved.filter.as_int(),
                "rank" => match saved.filter.as_text().parse::<RankBucket>() {
                    Ok(rank) => criteria.rank = rank,
                    Err(e) => warn!("ignoring saved rank filter: {e}"),
                },
                "category" => {
                    criteria.category = saved
                        .filter
                        .as_int()
                        .and_then(|c| u32::try_from(c).ok())
                        .filter(|&c| c != 0);
                }
                other => debug!(field = other, "ignoring unknown saved filter"),
            }
        }
        criteria
    }
}

/// Loads the search state, falling back to defaults when absent or unreadable.
pub fn load_search_state(store: &impl KeyValueStore) -> SearchState {
    let Some(json) = store.get(SEARCH_KEY) else {
        return SearchState::default();
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        warn!("discarding unreadable search state: {e}");
        SearchState::default()
    })
}

/// Saves the search state. Failures are logged and otherwise ignored.
pub fn save_search_state(store: &mut impl KeyValueStore, state: &SearchState) {
    let result = serde_json::to_string(state)
        .map_err(Error::from)
        .and_then(|json| store.set(SEARCH_KEY, json));
    if let Err(e) = result {
        warn!("could not save search state: {e}");
    }
}

/// An uploaded `paper.bin` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperFile {
    /// `"{timestamp}-{name}"`
    pub id: String,
    pub name: String,
    pub data: Vec<u8>,
    /// Upload time in milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Recently uploaded files, capped with oldest-first eviction.
#[derive(Debug, Clone)]
pub struct PaperFileCache {
    /// Ordered oldest first
    files: Vec<PaperFile>,
    capacity: usize,
}

impl Default for PaperFileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PaperFileCache {
    /// Creates a cache holding up to [`MAX_FILES`] files.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_FILES)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            files: Vec::new(),
            capacity,
        }
    }

    /// Stores a file and returns its id. A file with the same id is replaced.
    pub fn save(&mut self, name: &str, data: Vec<u8>, timestamp: u64) -> String {
        let id = format!("{timestamp}-{name}");
        self.files.retain(|f| f.id != id);
        self.files.push(PaperFile {
            id: id.clone(),
            name: name.to_string(),
            data,
            timestamp,
        });
        self.files
            .sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        let excess = self.files.len().saturating_sub(self.capacity);
        for file in self.files.drain(..excess) {
            debug!(id = %file.id, "evicted cached paper file");
        }
        id
    }

    /// Cached files, most recent first.
    pub fn files(&self) -> impl Iterator<Item = &PaperFile> {
        self.files.iter().rev()
    }

    pub fn get(&self, id: &str) -> Option<&PaperFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn latest(&self) -> Option<&PaperFile> {
        self.files.last()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
