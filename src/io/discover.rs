use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

fn should_skip_dir(name: &str) -> bool {
    matches!(name, ".git" | "target" | "node_modules")
}

fn is_aux(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("aux")
}

/// Find every LaTeX aux file below `root` that belongs to a document.
///
/// Only aux files with a sibling `.tex` of the same stem count; the rest are
/// by-products of `\include`. Results are sorted by path.
pub fn discover_aux_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    collect_aux_paths(root, &mut paths)?;
    paths.retain(|aux| aux.with_extension("tex").is_file());
    paths.sort();
    Ok(paths)
}

fn collect_aux_paths(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let entry = entry.with_context(|| format!("Failed to list {:?}", dir))?;
        entries.push(entry.path());
    }
    entries.sort();

    for path in entries {
        if path.is_dir() {
            let skip = path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(should_skip_dir);
            if !skip {
                collect_aux_paths(&path, out)?;
            }
        } else if is_aux(&path) {
            out.push(path);
        }
    }
    Ok(())
}
