use std::sync::LazyLock;

use crate::regex::Regex;

static DOI_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://doi\.org/").unwrap());

/// Strips a leading `http(s)://doi.org/` from a DOI
///
/// # Arguments
///
/// * `doi` - The DOI string, bare or in URL form
pub fn strip_doi_url(doi: &str) -> &str {
    match DOI_URL_REGEX.find(doi) {
        Some(m) => &doi[m.end()..],
        None => doi,
    }
}

/// Parses the leading integer of a string, ignoring anything after it.
///
/// Leading whitespace and a single sign are accepted; `"12abc"` gives 12 and
/// `"abc"` gives `None`.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let sign_len = trimmed.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}
