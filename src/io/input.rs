use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use biblatex::{Field, RawBibliography, RawChunk, Spanned};
use thiserror::Error;

use crate::models::Entry;

/// Errors raised while reading a BibTeX file
#[derive(Error, Debug)]
pub enum BibParseError {
    #[error("Failed to read BibTeX file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: undefined string macro `{name}`")]
    UndefinedMacro { line: usize, name: String },
}

/// Entries and preamble count read from one BibTeX source
#[derive(Debug, Clone, Default)]
pub struct BibSource {
    pub entries: Vec<Entry>,
    /// Number of `@preamble` blocks found; all of them count as one
    pub preambles: usize,
}

/// Read and parse a BibTeX file
pub fn parse_bibtex_file(path: &Path) -> Result<BibSource, BibParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| BibParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_bibtex(&content)
}

/// Parse BibTeX source text.
///
/// Entry types and field names are lower-cased (with a few common field
/// aliases folded together); citation keys keep their case. Values lose their
/// outer delimiters but keep inner braces. `@string` macros and the standard
/// month abbreviations are expanded.
pub fn parse_bibtex(content: &str) -> Result<BibSource, BibParseError> {
    let raw = RawBibliography::parse(content).map_err(|e| BibParseError::Syntax {
        line: line_at(content, e.span.start),
        message: e.to_string(),
    })?;

    let resolver = Resolver {
        src: content,
        macros: raw
            .abbreviations
            .iter()
            .map(|pair| (pair.key.v.to_lowercase(), &pair.value.v))
            .collect(),
    };

    let mut entries = Vec::with_capacity(raw.entries.len());
    for raw_entry in &raw.entries {
        let raw_entry = &raw_entry.v;
        let mut entry = Entry::new(raw_entry.kind.v.to_lowercase(), raw_entry.key.v);
        for pair in &raw_entry.fields {
            let value = resolver.resolve(&pair.value, 0)?;
            entry = entry.with_field(homogenize_field(pair.key.v), value);
        }
        entries.push(entry);
    }

    Ok(BibSource {
        entries,
        preambles: usize::from(!raw.preamble.trim().is_empty()),
    })
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "January"),
    ("feb", "February"),
    ("mar", "March"),
    ("apr", "April"),
    ("may", "May"),
    ("jun", "June"),
    ("jul", "July"),
    ("aug", "August"),
    ("sep", "September"),
    ("oct", "October"),
    ("nov", "November"),
    ("dec", "December"),
];

/// `@string` definitions nested deeper than this are taken to be cyclic
const MAX_MACRO_DEPTH: usize = 32;

/// Lower-case a field name and fold known aliases
fn homogenize_field(name: &str) -> String {
    let lower = name.to_lowercase();
    let canonical = match lower.as_str() {
        "keyw" | "keywords" => "keyword",
        "authors" => "author",
        "editors" => "editor",
        "urls" | "link" | "links" => "url",
        "subjects" => "subject",
        "xref" => "crossref",
        _ => return lower,
    };
    canonical.to_string()
}

/// 1-based line of a byte offset, computed only when reporting an error
fn line_at(src: &str, offset: usize) -> usize {
    let offset = offset.min(src.len());
    src.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Turns raw field values into plain strings, expanding macros
struct Resolver<'a, 's> {
    src: &'a str,
    /// Lower-cased macro name -> definition
    macros: HashMap<String, &'a Field<'s>>,
}

impl<'a, 's> Resolver<'a, 's> {
    fn resolve(&self, field: &Spanned<Field<'s>>, depth: usize) -> Result<String, BibParseError> {
        self.resolve_field(&field.v, &field.span, depth)
    }

    fn resolve_field(
        &self,
        field: &Field<'s>,
        span: &Range<usize>,
        depth: usize,
    ) -> Result<String, BibParseError> {
        let _ = span;
        field
            .iter()
            .map(|chunk| match chunk.v {
                RawChunk::Normal(text) => Ok(text.to_string()),
                RawChunk::Abbreviation(name) => self.expand(name, &chunk.span, depth),
            })
            .collect()
    }

    fn expand(&self, name: &str, span: &Range<usize>, depth: usize) -> Result<String, BibParseError> {
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(name.to_string());
        }
        let key = name.to_lowercase();
        if let Some(definition) = self.macros.get(&key) {
            if depth >= MAX_MACRO_DEPTH {
                return Err(BibParseError::Syntax {
                    line: line_at(self.src, span.start),
                    message: format!("string macro `{name}` expands recursively"),
                });
            }
            return self.resolve_field(definition, span, depth + 1);
        }
        MONTHS
            .iter()
            .find(|(abbr, _)| *abbr == key)
            .map(|(_, month)| month.to_string())
            .ok_or_else(|| BibParseError::UndefinedMacro {
                line: line_at(self.src, span.start),
                name: name.to_string(),
            })
    }
}
