use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{error, info};

use crate::io::{file_checksum, render_bibtex, sha256_hex, write_atomically};
use crate::models::{Entry, Verdict};

/// Result of Stage 7
#[derive(Debug)]
pub struct WriteResult {
    /// Final verdict for the unit
    pub verdict: Verdict,
    /// Output path, whether or not it was written
    pub path: PathBuf,
    /// Whether the file on disk was replaced
    pub written: bool,
}

/// Execute Stage 7: write the bibliography unless the verdict forbids it.
///
/// A `Broken` verdict never writes. Otherwise the rendered output is compared
/// by SHA-256 with the existing file: identical content downgrades the
/// verdict to `Unchanged`, anything else is written atomically.
pub fn write_output(entries: &[Entry], path: &Path, verdict: Verdict) -> Result<WriteResult> {
    if verdict == Verdict::Broken {
        error!("Broken bibliography. Not writing: {:?}", path);
        return Ok(WriteResult {
            verdict,
            path: path.to_path_buf(),
            written: false,
        });
    }

    let rendered = render_bibtex(entries);
    let new_hash = sha256_hex(rendered.as_bytes());

    if file_checksum(path)?.as_deref() == Some(new_hash.as_str()) {
        info!("No changes to {:?}", path);
        return Ok(WriteResult {
            verdict: Verdict::Unchanged,
            path: path.to_path_buf(),
            written: false,
        });
    }

    write_atomically(path, rendered.as_bytes())?;
    info!("Please check the new or corrected file: {:?}", path);
    Ok(WriteResult {
        verdict: verdict.worsen(Verdict::Changed),
        path: path.to_path_buf(),
        written: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<Entry> {
        vec![Entry::new("article", "a").with_field("year", "2000")]
    }

    #[test]
    fn test_writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("references.bib");

        let result = write_output(&entries(), &path, Verdict::Changed).unwrap();

        assert_eq!(result.verdict, Verdict::Changed);
        assert!(result.written);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            render_bibtex(&entries())
        );
    }

    #[test]
    fn test_identical_output_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("references.bib");
        std::fs::write(&path, render_bibtex(&entries())).unwrap();

        let result = write_output(&entries(), &path, Verdict::Changed).unwrap();

        assert_eq!(result.verdict, Verdict::Unchanged);
        assert!(!result.written);
    }

    #[test]
    fn test_broken_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("references.bib");
        std::fs::write(&path, "old").unwrap();

        let result = write_output(&entries(), &path, Verdict::Broken).unwrap();

        assert_eq!(result.verdict, Verdict::Broken);
        assert!(!result.written);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
    }

    #[test]
    fn test_different_content_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("references.bib");
        std::fs::write(&path, "old").unwrap();

        let result = write_output(&entries(), &path, Verdict::Changed).unwrap();

        assert_eq!(result.verdict, Verdict::Changed);
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "old");
    }
}
