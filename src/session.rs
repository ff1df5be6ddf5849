//! Browsing session state.
//!
//! A [`Session`] is the explicit application state a paper browser works from: the
//! reference tables, the currently loaded papers, the recent-file cache and the
//! filter, sort and page settings. Every derived view (filtered set, visible page,
//! keywords) is recomputed from that state on demand, so there is nothing to
//! invalidate when a setting changes.
//!
//! # Example
//!
//! ```
//! use paperlens::{Session, VenueEntry};
//! use paperlens::session::ViewState;
//!
//! let venues = vec![VenueEntry {
//!     rank: "A".to_string(),
//!     crossref: "conf/ccs".to_string(),
//!     ..Default::default()
//! }];
//! let mut session = Session::new(venues, Vec::new());
//! assert_eq!(session.view_state(), ViewState::NoPapersLoaded);
//!
//! // fixarray(1) [ fixmap(1) { "key": "conf/ccs/X20" } ]
//! let bytes = [0x91, 0x81, 0xa3, b'k', b'e', b'y', 0xac,
//!     b'c', b'o', b'n', b'f', b'/', b'c', b'c', b's', b'/', b'X', b'2', b'0'];
//! session.load_bytes(&bytes).unwrap();
//!
//! assert_eq!(session.view_state(), ViewState::Results);
//! assert_eq!(session.papers()[0].rank.as_deref(), Some("A"));
//! ```

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info};

use crate::decode::{DecodedPayload, PaperBinDecoder};
use crate::filter::{FilterCriteria, RankBucket, filter_papers};
use crate::keywords::{Keyword, KeywordExtractor};
use crate::paginate::{clamp_page, paginate, total_pages};
use crate::sort::{SortConfig, SortField, sort_papers};
use crate::storage::{
    DEFAULT_PER_PAGE, KeyValueStore, PaperFile, PaperFileCache, SearchState, load_search_state,
    save_search_state,
};
use crate::utils::strip_doi_url;
use crate::venue::{CategoryEntry, VenueEntry, find_category};
use crate::{Error, Paper, Result, augment};

/// What the paper list area should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// No file loaded, or the loaded file has no papers
    NoPapersLoaded,
    /// Papers are loaded but none pass the filters
    NoMatches,
    Results,
}

/// One rendered page of the paper list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub papers: Vec<&'a Paper>,
    /// Clamped 1-based page number
    pub page: usize,
    pub total_pages: usize,
    /// Papers loaded
    pub total: usize,
    /// Papers passing the filters
    pub matched: usize,
    pub state: ViewState,
}

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<i64>,
    #[serde(rename = "pub")]
    publisher_abbr: &'a str,
}

/// Application state for one browsing session.
#[derive(Debug, Clone)]
pub struct Session {
    venues: Vec<VenueEntry>,
    categories: Vec<CategoryEntry>,
    papers: Vec<Paper>,
    filename: Option<String>,
    stats: Option<Vec<(String, i64)>>,
    files: PaperFileCache,
    selected_file_id: Option<String>,
    criteria: FilterCriteria,
    sort: SortConfig,
    page: usize,
    per_page: usize,
    extractor: KeywordExtractor,
}

impl Session {
    /// Creates an empty session over the given reference tables.
    #[must_use]
    pub fn new(venues: Vec<VenueEntry>, categories: Vec<CategoryEntry>) -> Self {
        Self {
            venues,
            categories,
            papers: Vec::new(),
            filename: None,
            stats: None,
            files: PaperFileCache::new(),
            selected_file_id: None,
            criteria: FilterCriteria::default(),
            sort: SortConfig::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            extractor: KeywordExtractor::new(),
        }
    }

    /// Replaces the keyword extractor configuration.
    #[must_use]
    pub fn with_keyword_extractor(mut self, extractor: KeywordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn venues(&self) -> &[VenueEntry] {
        &self.venues
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    /// All loaded papers in load order.
    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    /// Source dump name of the loaded file.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Word statistics of the loaded file.
    pub fn stats(&self) -> Option<&[(String, i64)]> {
        self.stats.as_deref()
    }

    /// The first `n` word statistics, in payload order.
    pub fn stats_preview(&self, n: usize) -> &[(String, i64)] {
        let stats = self.stats().unwrap_or_default();
        &stats[..n.min(stats.len())]
    }

    /// Decodes and installs a `paper.bin` payload.
    ///
    /// Returns the number of papers loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for an unreadable payload. The previously loaded
    /// papers stay in place in that case.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        let payload = PaperBinDecoder::new().decode(bytes)?;
        Ok(self.install(payload))
    }

    /// Caches an uploaded file, selects it, and loads it.
    ///
    /// Only `.bin` files are accepted. An accepted file stays cached even when it
    /// fails to decode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldValue`] for a name without the `.bin` extension,
    /// leaving the cache and selection untouched, and [`Error::Decode`] for an
    /// unreadable payload, leaving the previously loaded papers in place.
    pub fn upload(&mut self, name: &str, data: Vec<u8>, timestamp: u64) -> Result<usize> {
        if !name.ends_with(".bin") {
            return Err(Error::InvalidFieldValue {
                field: "name".to_string(),
                message: format!("`{name}` is not a .bin file"),
            });
        }
        let decoded = PaperBinDecoder::new().decode(&data);
        let id = self.files.save(name, data, timestamp);
        info!(id = %id, "cached uploaded paper file");
        self.selected_file_id = Some(id);
        Ok(self.install(decoded?))
    }

    /// Loads a cached file by id and selects it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] for an unknown id and [`Error::Decode`] for an
    /// unreadable payload; the current papers and selection are kept either way.
    pub fn open_cached(&mut self, id: &str) -> Result<usize> {
        let file = self
            .files
            .get(id)
            .ok_or_else(|| Error::Storage(format!("no cached paper file `{id}`")))?;
        let payload = PaperBinDecoder::new().decode(&file.data)?;
        self.selected_file_id = Some(id.to_string());
        Ok(self.install(payload))
    }

    /// Loads the most recently cached file, if there is one.
    pub fn resume_latest(&mut self) -> Option<Result<usize>> {
        let id = self.files.latest()?.id.clone();
        Some(self.open_cached(&id))
    }

    fn install(&mut self, payload: DecodedPayload) -> usize {
        let papers = augment(&payload.papers, &self.venues);
        debug!(papers = papers.len(), "installed paper set");
        self.papers = papers;
        self.filename = payload.filename;
        self.stats = payload.stats;
        self.page = 1;
        self.papers.len()
    }

    /// Cached files, most recent first.
    pub fn files(&self) -> impl Iterator<Item = &PaperFile> {
        self.files.files()
    }

    pub fn selected_file_id(&self) -> Option<&str> {
        self.selected_file_id.as_deref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Replaces all filters and returns to the first page.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.page = 1;
    }

    pub fn set_title_query(&mut self, query: impl Into<String>) {
        self.criteria.title = query.into();
        self.page = 1;
    }

    /// Searches for a clicked keyword, replacing the current title query.
    pub fn apply_keyword(&mut self, word: &str) {
        self.set_title_query(word);
    }

    pub fn set_year(&mut self, year: Option<i64>) {
        self.criteria.year = year;
        self.page = 1;
    }

    pub fn set_rank(&mut self, rank: RankBucket) {
        self.criteria.rank = rank;
        self.page = 1;
    }

    pub fn set_category(&mut self, category: Option<u32>) {
        self.criteria.category = category;
        self.page = 1;
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    /// Sorts by `field`, flipping the direction when it is already the ascending column.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    /// Sets the page size; zero is treated as one.
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
    }

    /// Requests a page. The effective page is clamped when read.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Papers passing the current filters, in load order.
    pub fn filtered(&self) -> Vec<&Paper> {
        filter_papers(&self.papers, &self.criteria)
    }

    /// Filtered papers in the current sort order.
    pub fn sorted(&self) -> Vec<&Paper> {
        sort_papers(self.filtered(), &self.sort)
    }

    /// The clamped page of sorted, filtered papers.
    pub fn current_page(&self) -> Vec<&Paper> {
        self.view().papers
    }

    /// The visible page of sorted, filtered papers with its counts.
    pub fn view(&self) -> PageView<'_> {
        let sorted = self.sorted();
        let matched = sorted.len();
        let page = clamp_page(self.page, matched, self.per_page);
        PageView {
            papers: paginate(&sorted, page, self.per_page).to_vec(),
            page,
            total_pages: total_pages(matched, self.per_page),
            total: self.papers.len(),
            matched,
            state: Self::state_for(self.papers.len(), matched),
        }
    }

    /// Distinguishes an empty load from an over-restrictive filter.
    pub fn view_state(&self) -> ViewState {
        let matched = if self.papers.is_empty() {
            0
        } else {
            self.filtered().len()
        };
        Self::state_for(self.papers.len(), matched)
    }

    fn state_for(total: usize, matched: usize) -> ViewState {
        if total == 0 {
            ViewState::NoPapersLoaded
        } else if matched == 0 {
            ViewState::NoMatches
        } else {
            ViewState::Results
        }
    }

    /// Keywords of the filtered papers.
    pub fn keywords(&self) -> Vec<Keyword> {
        self.extractor.extract(self.filtered())
    }

    /// Distinct publication years of the loaded papers, newest first.
    pub fn years(&self) -> Vec<i64> {
        self.papers
            .iter()
            .filter_map(|p| p.year)
            .filter(|&y| y != 0)
            .unique()
            .sorted_unstable_by(|a, b| b.cmp(a))
            .collect()
    }

    /// Category entry of a paper, if it has one.
    pub fn category_for(&self, paper: &Paper) -> Option<&CategoryEntry> {
        paper
            .category
            .and_then(|id| find_category(id, &self.categories))
    }

    /// The filtered papers as a pretty-printed JSON array of `{id, title, year, pub}`,
    /// with `id` being the DOI without its `doi.org` URL prefix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Storage`] if serialization fails.
    pub fn export_filtered_json(&self) -> Result<String> {
        let records: Vec<ExportRecord<'_>> = self
            .filtered()
            .into_iter()
            .map(|p| ExportRecord {
                id: strip_doi_url(p.doi.as_deref().unwrap_or_default()),
                title: p.title_or_empty(),
                year: p.year,
                publisher_abbr: &p.publisher_abbr,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// The persistable part of the current settings.
    pub fn search_state(&self) -> SearchState {
        SearchState::from_criteria(&self.criteria, self.per_page)
    }

    /// Applies saved settings.
    pub fn restore_search_state(&mut self, state: &SearchState) {
        self.set_per_page(state.per_page);
        self.set_criteria(state.to_criteria());
    }

    /// Restores settings from a store, falling back to defaults.
    pub fn restore_from(&mut self, store: &impl KeyValueStore) {
        let state = load_search_state(store);
        self.restore_search_state(&state);
    }

    /// Saves settings to a store on a best-effort basis.
    pub fn persist_to(&self, store: &mut impl KeyValueStore) {
        save_search_state(store, &self.search_state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawPaper;
    use crate::sort::SortDirection;
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn venues() -> Vec<VenueEntry> {
        vec![
            VenueEntry {
                rank: "A".to_string(),
                category: 1,
                crossref: "conf/ccs".to_string(),
                ..Default::default()
            },
            VenueEntry {
                rank: "B".to_string(),
                category: 2,
                crossref: "journals/tdsc".to_string(),
                ..Default::default()
            },
        ]
    }

    fn categories() -> Vec<CategoryEntry> {
        vec![CategoryEntry {
            id: 1,
            icon: "🔒".to_string(),
            title: "Security".to_string(),
            url: String::new(),
        }]
    }

    fn raw(title: &str, year: i64, key: &str) -> RawPaper {
        RawPaper {
            title: Some(title.to_string()),
            doi: Some(format!("https://doi.org/10.1/{year}")),
            year: Some(year),
            publisher: Some("ACM Press".to_string()),
            key: Some(key.to_string()),
            ..Default::default()
        }
    }

    fn payload() -> Vec<u8> {
        let papers = vec![
            raw("Scalable Consensus Protocols", 2020, "conf/ccs/A20"),
            raw("Consensus in Blockchain Systems", 2021, "journals/tdsc/B21"),
            raw("Sharding Revisited", 2019, "conf/other/C19"),
        ];
        rmp_serde::to_vec(&json!({
            "papers": papers,
            "filename": "dblp-2024-01-01.xml.gz",
            "stats": {"consensus": 2}
        }))
        .unwrap()
    }

    fn loaded() -> Session {
        let mut session = Session::new(venues(), categories());
        session.load_bytes(&payload()).unwrap();
        session
    }

    fn titles(papers: &[&Paper]) -> Vec<String> {
        papers.iter().map(|p| p.title_or_empty().to_string()).collect()
    }

    #[test]
    fn test_load_bytes_augments() {
        let session = loaded();
        assert_eq!(session.papers().len(), 3);
        assert_eq!(session.papers()[0].rank.as_deref(), Some("A"));
        assert_eq!(session.papers()[1].category, Some(2));
        assert_eq!(session.papers()[2].rank, None);
        assert_eq!(session.papers()[0].publisher_abbr, "ACMP");
        assert_eq!(session.filename(), Some("dblp-2024-01-01.xml.gz"));
        assert_eq!(session.stats_preview(20), &[("consensus".to_string(), 2)]);
    }

    #[test]
    fn test_failed_load_keeps_previous_papers() {
        let mut session = loaded();
        let result = session.load_bytes(&[0xd9, 0xff]);
        assert!(matches!(result, Err(Error::Decode(_))));
        assert_eq!(session.papers().len(), 3);
        assert_eq!(session.filename(), Some("dblp-2024-01-01.xml.gz"));
    }

    #[test]
    fn test_view_states() {
        let empty = Session::new(venues(), categories());
        assert_eq!(empty.view_state(), ViewState::NoPapersLoaded);
        assert_eq!(empty.view().state, ViewState::NoPapersLoaded);
        assert_eq!(empty.view().total_pages, 1);

        let mut session = loaded();
        assert_eq!(session.view_state(), ViewState::Results);
        session.set_title_query("nonexistent");
        assert_eq!(session.view_state(), ViewState::NoMatches);
        let view = session.view();
        assert_eq!((view.total, view.matched), (3, 0));
        assert!(view.papers.is_empty());
    }

    #[test]
    fn test_filter_sort_and_page() {
        let mut session = loaded();
        session.set_sort(SortConfig::new(SortField::Year, SortDirection::Desc));
        session.set_per_page(2);

        let view = session.view();
        assert_eq!(view.total_pages, 2);
        assert_eq!(
            titles(&view.papers),
            vec!["Consensus in Blockchain Systems", "Scalable Consensus Protocols"]
        );

        session.set_page(99);
        let view = session.view();
        assert_eq!(view.page, 2);
        assert_eq!(titles(&session.current_page()), vec!["Sharding Revisited"]);

        session.set_rank(RankBucket::Abc);
        let view = session.view();
        assert_eq!(view.page, 1);
        assert_eq!(view.matched, 2);
    }

    #[test]
    fn test_keywords_follow_filters() {
        let mut session = loaded();
        let keywords = session.keywords();
        assert_eq!(keywords[0].word, "consensus");
        assert_eq!(keywords[0].count, 2);
        assert!(keywords.iter().all(|k| k.word != "blockchain"));

        session.apply_keyword("sharding");
        let keywords = session.keywords();
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].word, "sharding");
        assert_eq!(session.criteria().title, "sharding");
    }

    #[test]
    fn test_years_newest_first() {
        let session = loaded();
        assert_eq!(session.years(), vec![2021, 2020, 2019]);
    }

    #[test]
    fn test_category_lookup() {
        let session = loaded();
        let security = session.category_for(&session.papers()[0]).unwrap();
        assert_eq!(security.title, "Security");
        assert!(session.category_for(&session.papers()[1]).is_none());
        assert!(session.category_for(&session.papers()[2]).is_none());
    }

    #[test]
    fn test_export_filtered_json() {
        let mut session = loaded();
        session.set_year(Some(2020));
        let exported: serde_json::Value =
            serde_json::from_str(&session.export_filtered_json().unwrap()).unwrap();
        assert_eq!(
            exported,
            json!([{
                "id": "10.1/2020",
                "title": "Scalable Consensus Protocols",
                "year": 2020,
                "pub": "ACMP"
            }])
        );
    }

    #[test]
    fn test_upload_and_cache() {
        let mut session = Session::new(venues(), categories());
        assert_eq!(session.upload("paper.bin", payload(), 1_700_000_000_000).unwrap(), 3);
        assert_eq!(session.selected_file_id(), Some("1700000000000-paper.bin"));

        let result = session.upload("broken.bin", vec![0xd9, 0xff], 1_700_000_000_500);
        assert!(result.is_err());
        assert_eq!(session.papers().len(), 3);
        assert_eq!(session.files().count(), 2);

        let mut resumed = session.clone();
        resumed.open_cached("1700000000000-paper.bin").unwrap();
        assert_eq!(resumed.selected_file_id(), Some("1700000000000-paper.bin"));
        assert!(matches!(
            resumed.open_cached("missing"),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_upload_rejects_non_bin_names() {
        let mut session = Session::new(venues(), categories());
        session.upload("paper.bin", payload(), 10).unwrap();

        let result = session.upload("notes.txt", payload(), 20);
        assert!(matches!(
            result,
            Err(Error::InvalidFieldValue { ref field, .. }) if field == "name"
        ));
        assert_eq!(session.files().count(), 1);
        assert_eq!(session.selected_file_id(), Some("10-paper.bin"));
    }

    #[test]
    fn test_duplicate_dois_are_kept() {
        let twin = |title: &str| RawPaper {
            title: Some(title.to_string()),
            doi: Some("https://doi.org/10.1/same".to_string()),
            year: Some(2022),
            key: Some("conf/ccs/T22".to_string()),
            ..Default::default()
        };
        let bytes = rmp_serde::to_vec(&json!([twin("First Twin"), twin("Second Twin")])).unwrap();

        let mut session = Session::new(venues(), categories());
        assert_eq!(session.load_bytes(&bytes).unwrap(), 2);
        session.set_title_query("twin");
        session.set_sort(SortConfig::new(SortField::Doi, SortDirection::Asc));

        assert_eq!(session.papers().len(), 2);
        assert_eq!(titles(&session.filtered()), vec!["First Twin", "Second Twin"]);
        assert_eq!(titles(&session.sorted()), vec!["First Twin", "Second Twin"]);

        let exported: serde_json::Value =
            serde_json::from_str(&session.export_filtered_json().unwrap()).unwrap();
        let ids: Vec<&str> = exported
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["10.1/same", "10.1/same"]);
    }

    #[test]
    fn test_resume_latest() {
        let mut session = Session::new(venues(), categories());
        assert!(session.resume_latest().is_none());

        session.upload("paper.bin", payload(), 10).unwrap();
        let mut fresh = session.clone();
        fresh.set_title_query("x");
        assert_eq!(fresh.resume_latest().unwrap().unwrap(), 3);
    }

    #[test]
    fn test_search_state_round_trip() {
        let mut session = loaded();
        session.set_title_query("consensus -scalable");
        session.set_rank(RankBucket::B);
        session.set_per_page(50);

        let mut store = MemoryStore::new();
        session.persist_to(&mut store);

        let mut restored = loaded();
        restored.restore_from(&store);
        assert_eq!(restored.criteria(), session.criteria());
        assert_eq!(restored.per_page(), 50);
        assert_eq!(
            titles(&restored.filtered()),
            vec!["Consensus in Blockchain Systems"]
        );
    }

    #[test]
    fn test_repeated_views_are_independent() {
        let mut session = loaded();
        let first = titles(&session.sorted());
        session.toggle_sort(SortField::Title);
        session.toggle_sort(SortField::Title);
        session.set_sort(SortConfig::default());
        assert_eq!(titles(&session.sorted()), first);
    }
}
