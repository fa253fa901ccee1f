use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::abbrev::{AbbreviationCache, JournalLookup};
use crate::models::{Entry, StageOutput, Violation};

/// Resolver prefixes stripped from DOIs, tried in this order
pub const DOI_PROXIES: [&str; 5] = [
    "https://doi.org/",
    "http://doi.org/",
    "http://dx.doi.org/",
    "https://dx.doi.org/",
    "doi:",
];

/// Raised when a normalizer that cannot be done reliably is switched on
#[derive(Error, Debug)]
#[error("{feature} is not supported: {reason}")]
pub struct UnsupportedFeature {
    pub feature: &'static str,
    pub reason: &'static str,
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex must compile"))
}

fn page_separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // hyphen, non-breaking hyphen, en dash, em dash, minus sign, hyphen-minus
    RE.get_or_init(|| {
        Regex::new("[\u{2010}\u{2011}\u{2013}\u{2014}\u{2212}-]+")
            .expect("page separator regex must compile")
    })
}

/// Lower-case a DOI and strip a known resolver prefix.
///
/// Returns the stripped DOI and whether it looks valid (`10.` prefix and at
/// least one `/`).
pub fn canonical_doi(doi: &str) -> (String, bool) {
    let lower = doi.to_lowercase();
    let stripped = DOI_PROXIES
        .iter()
        .find_map(|proxy| lower.strip_prefix(proxy))
        .unwrap_or(lower.as_str())
        .to_string();
    let valid = stripped.starts_with("10.") && stripped.contains('/');
    (stripped, valid)
}

/// Normalize the `doi` field of every entry that has one.
///
/// Invalid DOIs are reported, but still rewritten to their stripped form.
pub fn normalize_doi(entries: &[Entry]) -> StageOutput {
    let mut output = StageOutput::default();

    for entry in entries {
        let Some(doi) = entry.get("doi") else {
            output.entries.push(entry.clone());
            continue;
        };
        let (canonical, valid) = canonical_doi(doi);
        if !valid {
            let violation = Violation::InvalidDoi {
                id: entry.id().to_string(),
                doi: canonical.clone(),
            };
            warn!("{}", violation);
            output.violations.push(violation);
        }
        output.entries.push(entry.clone().with_field("doi", canonical));
    }

    output
}

/// Collapse every whitespace run in every field value to a single space
pub fn normalize_whitespace(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .map(|entry| {
            entry.map_values(|_, value| whitespace_re().replace_all(value, " ").into_owned())
        })
        .collect()
}

/// Author and editor name normalization.
///
/// Splitting BibTeX name lists and round-tripping them through LaTeX
/// encoding is not reliable enough to rewrite user data, so this refuses to
/// run instead of silently doing nothing.
pub fn normalize_names(_entries: &[Entry]) -> Result<Vec<Entry>, UnsupportedFeature> {
    Err(UnsupportedFeature {
        feature: "normalize_names",
        reason: "splitting and re-encoding author/editor names is not robust",
    })
}

/// Rewrite a page range so its endpoints are joined by `--`.
///
/// Any run of dash-like characters counts as the separator. Values without
/// two endpoints are returned unchanged.
pub fn page_double_hyphen(pages: &str) -> String {
    if !page_separator_re().is_match(pages) {
        return pages.to_string();
    }
    let parts: Vec<&str> = page_separator_re()
        .split(pages)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match (parts.first(), parts.last()) {
        (Some(first), Some(last)) if parts.len() >= 2 => format!("{first}--{last}"),
        _ => pages.to_string(),
    }
}

/// Apply [`page_double_hyphen`] to the `pages` field of every entry
pub fn fix_page_double_hyphen(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .map(|entry| match entry.get("pages") {
            Some(pages) => entry.clone().with_field("pages", page_double_hyphen(pages)),
            None => entry.clone(),
        })
        .collect()
}

/// Replace unabbreviated journal names by their ISO abbreviation.
///
/// A journal name without any `.` is taken to be unabbreviated. Cache misses
/// go to `lookup`; a failed lookup leaves the name as it is and is not cached.
pub async fn abbreviate_journals<L: JournalLookup>(
    entries: Vec<Entry>,
    cache: &mut AbbreviationCache,
    lookup: &L,
) -> Vec<Entry> {
    let mut result = Vec::with_capacity(entries.len());

    for entry in entries {
        let journal = match entry.get("journal") {
            Some(journal) if !journal.contains('.') => journal.to_string(),
            _ => {
                result.push(entry);
                continue;
            }
        };

        let abbreviation = match cache.get(&journal) {
            Some(cached) => {
                debug!("Cached abbreviation for {}: {}", journal, cached);
                Some(cached.to_string())
            }
            None => {
                info!("Downloading abbreviation for: {}", journal);
                match lookup.abbreviate(&journal).await {
                    Ok(abbreviation) => {
                        cache.insert(journal.clone(), abbreviation.clone());
                        Some(abbreviation)
                    }
                    Err(e) => {
                        warn!("Keeping journal name {:?} unabbreviated: {:#}", journal, e);
                        None
                    }
                }
            }
        };

        match abbreviation {
            Some(abbreviation) => result.push(entry.with_field("journal", abbreviation)),
            None => result.push(entry),
        }
    }

    result
}
