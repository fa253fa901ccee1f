use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::abbrev::{AbbreviationCache, JournalLookup};
use crate::config::Config;
use crate::io::{BibSource, parse_aux_file, parse_bibtex_file};
use crate::models::{DuplicatePolicy, Entry, StageOutput, Verdict, Violation};
use crate::stages::{
    CollectConfig, abbreviate_journals, clean_entries, collect_entries, detect_case_collisions,
    fix_bad_practices, fix_page_double_hyphen, merge_entries, normalize_doi, normalize_names,
    normalize_whitespace, reconcile_citations, sort_entries, write_output,
};

/// Outcome of one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub verdict: Verdict,
    /// Every violation found, in stage order
    pub violations: Vec<Violation>,
}

impl UnitReport {
    fn finished(verdict: Verdict) -> Self {
        Self {
            verdict,
            violations: Vec::new(),
        }
    }
}

/// Running state of one unit: the current entries, the verdict so far and
/// the violations behind it
struct Run {
    entries: Vec<Entry>,
    verdict: Verdict,
    violations: Vec<Violation>,
}

impl Run {
    fn absorb(&mut self, output: StageOutput) {
        self.verdict = self.verdict.require(output.is_valid());
        self.entries = output.entries;
        self.violations.extend(output.violations);
    }
}

/// Sanitize the bibliography of one LaTeX document.
///
/// Structural failures (unreadable aux or bib files, enabled name
/// normalization, I/O errors) are returned as errors. Policy violations do
/// not stop later stages; they are collected and only keep the output from
/// being written.
pub async fn process_aux<L: JournalLookup>(
    aux_path: &Path,
    config: &Config,
    lookup: &L,
) -> Result<UnitReport> {
    if aux_path.extension().and_then(|s| s.to_str()) != Some("aux") {
        warn!("Expecting an .aux file, got: {:?}", aux_path);
        return Ok(UnitReport::finished(Verdict::Broken));
    }

    info!("Processing {:?}", aux_path);
    let aux = parse_aux_file(aux_path)?;
    let citations: BTreeSet<String> = aux.citations.into_iter().collect();
    if citations.is_empty() {
        info!("No citations in {:?}, nothing to do", aux_path);
        return Ok(UnitReport::finished(Verdict::Unchanged));
    }
    if aux.bib_files.is_empty() {
        info!("No bibliography files in {:?}, nothing to do", aux_path);
        return Ok(UnitReport::finished(Verdict::Unchanged));
    }

    let sources: Vec<BibSource> = aux
        .bib_files
        .iter()
        .map(|path| {
            parse_bibtex_file(path).with_context(|| format!("Failed to load {:?}", path))
        })
        .collect::<Result<_>>()?;

    let mut run = Run {
        entries: Vec::new(),
        verdict: Verdict::Changed,
        violations: Vec::new(),
    };

    info!("Stage 0: Collecting entries...");
    run.absorb(collect_entries(sources, &CollectConfig::from(config)));
    info!("Found {} BibTeX entries", run.entries.len());

    info!("Stage 1: Reconciling citations...");
    let entries = std::mem::take(&mut run.entries);
    run.absorb(reconcile_citations(entries, &citations, &config.drop_entry_types));

    if !config.citation_policies.is_empty() {
        info!("Stage 2: Applying citation policies...");
        let entries = std::mem::take(&mut run.entries);
        run.absorb(clean_entries(entries, &config.citation_policies));
    }

    info!("Stage 3: Fixing bad practices...");
    let entries = fix_bad_practices(&run.entries);
    let violations = detect_case_collisions(&entries);
    run.absorb(StageOutput {
        entries,
        violations,
    });

    info!("Stage 4: Normalizing fields...");
    if config.normalize_doi {
        let output = normalize_doi(&run.entries);
        run.absorb(output);
    }
    if config.normalize_whitespace {
        run.entries = normalize_whitespace(&run.entries);
    }
    if config.normalize_names {
        run.entries = normalize_names(&run.entries)?;
    }
    if config.fix_page_double_hyphen {
        run.entries = fix_page_double_hyphen(&run.entries);
    }
    if let Some(cache_path) = config.abbreviation_cache_path() {
        let mut cache = AbbreviationCache::load(&cache_path)?;
        let entries = std::mem::take(&mut run.entries);
        run.entries = abbreviate_journals(entries, &mut cache, lookup).await;
        cache.persist(&cache_path)?;
    }

    if config.duplicate_id == DuplicatePolicy::Merge {
        info!("Stage 5: Merging entries by ID...");
        let entries = std::mem::take(&mut run.entries);
        run.absorb(merge_entries(entries, "ID"));
        info!("Merged down to {} entries", run.entries.len());
    }
    if config.duplicate_doi == DuplicatePolicy::Merge {
        info!("Stage 5: Merging entries by DOI...");
        let entries = std::mem::take(&mut run.entries);
        run.absorb(merge_entries(entries, "doi"));
        info!("Merged down to {} entries", run.entries.len());
    }

    if config.sort {
        info!("Stage 6: Sorting entries...");
        let entries = std::mem::take(&mut run.entries);
        run.entries = sort_entries(entries);
    }

    info!("Stage 7: Writing output...");
    let out_dir = aux_path.parent().unwrap_or_else(|| Path::new(""));
    let result = write_output(&run.entries, &out_dir.join(&config.bibtex_out), run.verdict)?;
    if !run.violations.is_empty() {
        warn!("{} violations in {:?}", run.violations.len(), aux_path);
    }
    Ok(UnitReport {
        verdict: result.verdict,
        violations: run.violations,
    })
}

/// Process several units in order and return the worst verdict.
///
/// A unit that fails structurally is logged and counted as `Broken`; the
/// remaining units still run.
pub async fn process_all<L: JournalLookup>(
    aux_paths: &[impl AsRef<Path>],
    config: &Config,
    lookup: &L,
) -> Verdict {
    let mut worst = Verdict::Unchanged;
    for aux_path in aux_paths {
        let aux_path = aux_path.as_ref();
        let verdict = match process_aux(aux_path, config, lookup).await {
            Ok(report) => report.verdict,
            Err(e) => {
                error!("Failed to process {:?}: {:#}", aux_path, e);
                Verdict::Broken
            }
        };
        worst = worst.worsen(verdict);
    }
    worst
}
