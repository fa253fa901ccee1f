use std::collections::HashSet;

use tracing::{info, warn};

use crate::config::Config;
use crate::io::BibSource;
use crate::models::{DuplicatePolicy, StageOutput, Violation};

/// Configuration for Stage 0 collection
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Policy for entries sharing an ID
    pub duplicate_id: DuplicatePolicy,
    /// Policy for entries sharing a DOI
    pub duplicate_doi: DuplicatePolicy,
    /// Whether `@preamble` directives are acceptable
    pub preambles_allowed: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            duplicate_id: DuplicatePolicy::Ignore,
            duplicate_doi: DuplicatePolicy::Ignore,
            preambles_allowed: true,
        }
    }
}

impl From<&Config> for CollectConfig {
    fn from(config: &Config) -> Self {
        Self {
            duplicate_id: config.duplicate_id,
            duplicate_doi: config.duplicate_doi,
            preambles_allowed: config.preambles_allowed,
        }
    }
}

/// Execute Stage 0: merge all sources into one ordered entry sequence.
///
/// Duplicates are only reported here (under `Fail`); they are always kept.
/// Merging happens much later, in Stage 5.
pub fn collect_entries(sources: Vec<BibSource>, config: &CollectConfig) -> StageOutput {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_dois: HashSet<String> = HashSet::new();
    let mut output = StageOutput::default();

    for source in sources {
        if source.preambles > 0 && !config.preambles_allowed {
            let violation = Violation::PreambleNotAllowed {
                count: source.preambles,
            };
            warn!("{}", violation);
            output.violations.push(violation);
        }

        for entry in source.entries {
            let id_seen = !seen_ids.insert(entry.id().to_string());
            match config.duplicate_id {
                DuplicatePolicy::Fail if id_seen => {
                    let violation = Violation::DuplicateId {
                        id: entry.id().to_string(),
                    };
                    warn!("{}", violation);
                    output.violations.push(violation);
                }
                DuplicatePolicy::Fail | DuplicatePolicy::Merge | DuplicatePolicy::Ignore => {}
            }

            if let Some(doi) = entry.get("doi") {
                let doi_seen = !seen_dois.insert(doi.to_string());
                match config.duplicate_doi {
                    DuplicatePolicy::Fail if doi_seen => {
                        let violation = Violation::DuplicateDoi {
                            doi: doi.to_string(),
                        };
                        warn!("{}", violation);
                        output.violations.push(violation);
                    }
                    DuplicatePolicy::Fail | DuplicatePolicy::Merge | DuplicatePolicy::Ignore => {}
                }
            }

            output.entries.push(entry);
        }
    }

    info!("Found {} BibTeX entries", output.entries.len());
    output
}
