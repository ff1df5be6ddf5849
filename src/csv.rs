//! Reference table parsing.
//!
//! Venue rankings and subject categories ship as two small comma-separated tables with
//! a header row. Fields may be double-quoted to contain commas and are trimmed.
//! Malformed rows never fail a load: they are reported as [`ParseWarning`]s next to
//! the parsed entries. A venue row with a non-numeric id is kept without an id; a
//! category row with one is skipped, since categories are only reachable by id.
//!
//! # Example
//!
//! ```
//! use paperlens::csv::{TableParser, VenueTableParser};
//!
//! let input = "\
//! id,title,fullname,publisher,url,rank,type,category
//! 1,CCS,\"ACM Conference on Computer and Communications Security\",ACM,https://dblp.uni-trier.de/db/conf/ccs/,A,Meeting,1";
//!
//! let table = VenueTableParser::new().parse(input).unwrap();
//! assert_eq!(table.entries[0].crossref, "conf/ccs");
//! assert!(table.warnings.is_empty());
//! ```

mod structure;

use csv::{ReaderBuilder, Trim};
use std::fmt;
use tracing::{debug, warn};

use crate::venue::{CategoryEntry, VenueEntry};
use crate::{Error, Result};
use structure::RawTableRow;

/// A recoverable problem with one table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number in the input
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parsed table rows plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable<T> {
    pub entries: Vec<T>,
    pub warnings: Vec<ParseWarning>,
}

impl<T> Default for ReferenceTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Configuration for reading reference tables.
///
/// # Examples
///
/// ```
/// use paperlens::csv::CsvConfig;
///
/// let mut config = CsvConfig::new();
/// config.set_delimiter(b';').set_has_header(false);
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Delimiter to use for parsing the table
    delimiter: u8,
    /// Whether the first row is a header to skip
    has_header: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfig {
    /// Creates a configuration for comma-separated tables with a header row
    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }

    /// Sets the delimiter character
    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether the table has a header row
    pub fn set_has_header(&mut self, has_header: bool) -> &mut Self {
        self.has_header = has_header;
        self
    }
}

/// Trait for reference table parsers.
pub trait TableParser {
    /// Row type produced by the parser.
    type Entry;

    /// Parses a whole table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Csv`] when the input cannot be read as delimited text at all.
    /// Individual bad rows become warnings instead.
    fn parse(&self, input: &str) -> Result<ReferenceTable<Self::Entry>>;
}

/// Reads every non-blank row and converts it with `convert`.
///
/// `convert` may report problems with a kept row through the warning sink; an `Err`
/// skips the row.
fn parse_rows<T>(
    config: &CsvConfig,
    input: &str,
    convert: impl Fn(
        &RawTableRow<'_>,
        &mut Vec<ParseWarning>,
    ) -> std::result::Result<T, ParseWarning>,
) -> Result<ReferenceTable<T>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.has_header)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input.trim().as_bytes());

    let mut table = ReferenceTable::default();
    let mut skipped = 0;
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(Error::from)?;
        let line = record
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(index + 1 + usize::from(config.has_header));
        let row = RawTableRow::new(&record, line);

        if row.is_blank() {
            continue;
        }
        let reported = table.warnings.len();
        match convert(&row, &mut table.warnings) {
            Ok(entry) => {
                for warning in &table.warnings[reported..] {
                    warn!(line = warning.line, "keeping table row: {}", warning.message);
                }
                table.entries.push(entry);
            }
            Err(warning) => {
                warn!(line = warning.line, "skipping table row: {}", warning.message);
                table.warnings.push(warning);
                skipped += 1;
            }
        }
    }

    debug!(
        entries = table.entries.len(),
        skipped,
        warnings = table.warnings.len(),
        "parsed reference table"
    );
    Ok(table)
}

/// Parser for the venue ranking table.
///
/// Columns: id, title, full name, publisher, url, rank, type, category.
#[derive(Debug, Clone, Default)]
pub struct VenueTableParser {
    config: CsvConfig,
}

impl VenueTableParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new parser with custom configuration
    #[must_use]
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }
}

impl TableParser for VenueTableParser {
    type Entry = VenueEntry;

    fn parse(&self, input: &str) -> Result<ReferenceTable<VenueEntry>> {
        parse_rows(&self.config, input, |row, warnings| Ok(row.to_venue(warnings)))
    }
}

/// Parser for the category table.
///
/// Columns: id, icon, title, url.
#[derive(Debug, Clone, Default)]
pub struct CategoryTableParser {
    config: CsvConfig,
}

impl CategoryTableParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new parser with custom configuration
    #[must_use]
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }
}

impl TableParser for CategoryTableParser {
    type Entry = CategoryEntry;

    fn parse(&self, input: &str) -> Result<ReferenceTable<CategoryEntry>> {
        parse_rows(&self.config, input, |row, _| row.to_category())
    }
}
