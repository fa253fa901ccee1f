use std::collections::{BTreeSet, HashSet};

use tracing::{info, warn};

use crate::models::{Entry, StageOutput, Violation};

/// Execute Stage 1: reconcile entries with the document's citations.
///
/// Keeps only cited entries whose type is not dropped, and reports every
/// citation that no entry defines. Dropping is never a violation by itself.
pub fn reconcile_citations(
    entries: Vec<Entry>,
    citations: &BTreeSet<String>,
    drop_entry_types: &[String],
) -> StageOutput {
    let defined: HashSet<&str> = entries.iter().map(|e| e.id()).collect();
    let violations: Vec<Violation> = citations
        .iter()
        .filter(|key| !defined.contains(key.as_str()))
        .map(|key| {
            let violation = Violation::MissingCitation { key: key.clone() };
            warn!("{}", violation);
            violation
        })
        .collect();

    let kept: Vec<Entry> = entries
        .into_iter()
        .filter(|entry| {
            if !citations.contains(entry.id()) {
                info!("Dropping unused id: {}", entry.id());
                return false;
            }
            if drop_entry_types.iter().any(|t| t == entry.entry_type()) {
                info!(
                    "Dropping irrelevant entry type: @{} ({})",
                    entry.entry_type(),
                    entry.id()
                );
                return false;
            }
            true
        })
        .collect();

    info!("Found {} used BibTeX entries", kept.len());
    StageOutput {
        entries: kept,
        violations,
    }
}
