use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::io::write_atomically;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read abbreviation cache {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid abbreviation cache {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write abbreviation cache {path:?}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Journal name -> ISO abbreviation, persisted between runs as flat JSON.
///
/// Keys are exact journal names; no case folding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationCache {
    entries: BTreeMap<String, String>,
}

impl AbbreviationCache {
    /// Load the cache, starting empty when the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| CacheError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let entries = serde_json::from_str(&content).map_err(|source| CacheError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { entries })
    }

    /// Write the cache as pretty JSON with a trailing newline
    pub fn persist(&self, path: &Path) -> Result<(), CacheError> {
        let mut json =
            serde_json::to_string_pretty(&self.entries).map_err(|source| CacheError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        json.push('\n');
        write_atomically(path, json.as_bytes()).map_err(|e| CacheError::Write {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        })
    }

    pub fn get(&self, journal: &str) -> Option<&str> {
        self.entries.get(journal).map(String::as_str)
    }

    pub fn insert(&mut self, journal: impl Into<String>, abbreviation: impl Into<String>) {
        self.entries.insert(journal.into(), abbreviation.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
