//! Reference table row structure.
//!
//! This module defines the positional row view used while converting table records.

use csv::StringRecord;

use crate::csv::ParseWarning;
use crate::utils::parse_leading_int;
use crate::venue::{CategoryEntry, VenueEntry, VenueKind, crossref_from_url};

/// One record of a reference table.
#[derive(Debug, Clone)]
pub(crate) struct RawTableRow<'r> {
    /// The trimmed record fields
    record: &'r StringRecord,
    /// Line number for warning reporting
    line_number: usize,
}

impl<'r> RawTableRow<'r> {
    pub(crate) fn new(record: &'r StringRecord, line_number: usize) -> Self {
        Self {
            record,
            line_number,
        }
    }

    /// Field at `index`, empty when the row is short.
    pub(crate) fn field(&self, index: usize) -> &'r str {
        self.record.get(index).unwrap_or_default()
    }

    /// Rows with an empty first field carry no entry.
    pub(crate) fn is_blank(&self) -> bool {
        self.field(0).is_empty()
    }

    fn id(&self) -> Result<i64, ParseWarning> {
        let raw = self.field(0);
        parse_leading_int(raw).ok_or_else(|| ParseWarning {
            line: self.line_number,
            message: format!("invalid id `{raw}`"),
        })
    }

    /// Converts a venue table row: id, title, full name, publisher, url, rank, type, category.
    ///
    /// A non-numeric id is reported to `warnings` and left unset; the venue is still
    /// kept so papers keep matching its crossref.
    pub(crate) fn to_venue(&self, warnings: &mut Vec<ParseWarning>) -> VenueEntry {
        let url = self.field(4);
        let category = parse_leading_int(self.field(7))
            .and_then(|c| u32::try_from(c).ok())
            .unwrap_or(0);

        let id = match self.id() {
            Ok(id) => Some(id),
            Err(warning) => {
                warnings.push(warning);
                None
            }
        };

        VenueEntry {
            id,
            title: self.field(1).to_string(),
            full_name: self.field(2).to_string(),
            publisher: self.field(3).to_string(),
            url: url.to_string(),
            rank: self.field(5).to_string(),
            kind: VenueKind::from_table_value(self.field(6)),
            category,
            crossref: crossref_from_url(url),
        }
    }

    /// Converts a category table row: id, icon, title, url.
    pub(crate) fn to_category(&self) -> Result<CategoryEntry, ParseWarning> {
        Ok(CategoryEntry {
            id: self.id()?,
            icon: self.field(1).to_string(),
            title: self.field(2).to_string(),
            url: self.field(3).to_string(),
        })
    }
}
