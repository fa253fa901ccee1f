use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while reading a LaTeX aux file
#[derive(Error, Debug)]
pub enum AuxError {
    #[error("Failed to read aux file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path:?} line {line}: cannot parse \\{command} line: {text}")]
    Malformed {
        path: PathBuf,
        line: usize,
        command: &'static str,
        text: String,
    },
}

/// Citation keys and bibliography files referenced by an aux file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuxData {
    /// Citation keys in order of appearance, duplicates included
    pub citations: Vec<String>,
    /// Bibliography files, resolved against the aux file's directory
    pub bib_files: Vec<PathBuf>,
}

/// Read an aux file and resolve the bibliography paths it names
pub fn parse_aux_file(path: &Path) -> Result<AuxData, AuxError> {
    let content = std::fs::read_to_string(path).map_err(|source| AuxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root = path.parent().unwrap_or_else(|| Path::new(""));
    parse_aux(&content, root, path)
}

/// Parse the `\citation` and `\bibdata` lines of an aux file.
///
/// `origin` is only used in error messages.
pub fn parse_aux(content: &str, root: &Path, origin: &Path) -> Result<AuxData, AuxError> {
    let mut citations = Vec::new();
    let mut bibdata = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        if let Some(words) = parse_aux_line("citation", line, origin, line_no)? {
            citations.extend(words);
        }
        if let Some(words) = parse_aux_line("bibdata", line, origin, line_no)? {
            bibdata.extend(words);
        }
    }

    let bib_files = bibdata
        .into_iter()
        .map(|name| {
            if name.ends_with(".bib") {
                root.join(name)
            } else {
                root.join(format!("{name}.bib"))
            }
        })
        .collect();

    Ok(AuxData {
        citations,
        bib_files,
    })
}

/// Parse a single `\command{a,b,c}` line, if it is one
fn parse_aux_line(
    command: &'static str,
    line: &str,
    origin: &Path,
    line_no: usize,
) -> Result<Option<Vec<String>>, AuxError> {
    let prefix = format!("\\{command}{{");
    if !line.starts_with(&prefix) {
        return Ok(None);
    }

    let line = line.trim_end_matches('\r');
    let well_formed =
        line.ends_with('}') && line.matches('{').count() == 1 && line.matches('}').count() == 1;
    if !well_formed {
        return Err(AuxError::Malformed {
            path: origin.to_path_buf(),
            line: line_no,
            command,
            text: line.to_string(),
        });
    }

    let inner = &line[prefix.len()..line.len() - 1];
    let words = inner
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    Ok(Some(words))
}
