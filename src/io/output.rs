use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::models::Entry;

/// Render entries as BibTeX.
///
/// Each entry is written as `@type{ID,` followed by one ` name = {value}`
/// line per field, in lexicographic field order, and entries are separated by
/// a blank line. The same entries in the same order always produce the same
/// bytes.
pub fn render_bibtex(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entry(entry: &Entry) -> String {
    let mut fields: Vec<(&str, &str)> = entry.fields().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut output = format!("@{}{{{}", entry.entry_type(), entry.id());
    for (name, value) in fields {
        output.push_str(&format!(",\n {name} = {{{value}}}"));
    }
    output.push_str("\n}\n");
    output
}

/// SHA-256 digest of a byte slice, hex encoded
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// SHA-256 of an existing file, or `None` when it does not exist
pub fn file_checksum(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    Ok(Some(sha256_hex(&bytes)))
}

/// Replace the contents of `path` without ever exposing a partial file.
///
/// The data goes to a sibling temporary file which is synced and then renamed
/// over the destination.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<()> {
        let file = File::create(&tmp_path)
            .with_context(|| format!("Failed to create file: {:?}", tmp_path))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        let file = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .with_context(|| format!("Failed to flush file: {:?}", tmp_path))?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        anyhow::anyhow!("Failed to move {:?} into place at {:?}: {}", tmp_path, path, e)
    })
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}", uuid::Uuid::new_v4().simple()));
    PathBuf::from(tmp)
}
