use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{DuplicatePolicy, PolicyTable};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Settings controlling the sanitizer.
///
/// Defaults are the most permissive, least invasive choices; stricter
/// behavior has to be switched on explicitly in the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory relative paths in the config are resolved against
    #[serde(skip)]
    pub root: PathBuf,
    /// Output file name, relative to the aux file's directory
    pub bibtex_out: String,
    /// Entry types dropped unconditionally
    pub drop_entry_types: Vec<String>,
    pub normalize_doi: bool,
    pub duplicate_id: DuplicatePolicy,
    pub duplicate_doi: DuplicatePolicy,
    pub preambles_allowed: bool,
    pub normalize_whitespace: bool,
    pub normalize_names: bool,
    pub fix_page_double_hyphen: bool,
    /// Abbreviation cache file; enables journal abbreviation when set
    pub abbreviate_journal: Option<String>,
    /// Sort by year, then first author
    pub sort: bool,
    /// Allowed fields per entry type; empty disables policy cleaning
    pub citation_policies: PolicyTable,
    /// Seconds before a journal lookup is abandoned
    pub journal_lookup_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            bibtex_out: "references.bib".to_string(),
            drop_entry_types: Vec::new(),
            normalize_doi: false,
            duplicate_id: DuplicatePolicy::Ignore,
            duplicate_doi: DuplicatePolicy::Ignore,
            preambles_allowed: true,
            normalize_whitespace: false,
            normalize_names: false,
            fix_page_double_hyphen: false,
            abbreviate_journal: None,
            sort: false,
            citation_policies: PolicyTable::new(),
            journal_lookup_timeout: 10,
        }
    }
}

impl Config {
    /// Load the config file, or fall back to defaults rooted at the current
    /// directory when no file is given
    pub fn from_file(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            let root = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
            return Ok(Self {
                root,
                ..Default::default()
            });
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse YAML text; an empty document yields the defaults
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Location of the abbreviation cache, if journal abbreviation is enabled
    pub fn abbreviation_cache_path(&self) -> Option<PathBuf> {
        self.abbreviate_journal
            .as_ref()
            .map(|name| self.root.join(name))
    }

    pub fn journal_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.journal_lookup_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldPolicy;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bibtex_out, "references.bib");
        assert!(config.preambles_allowed);
        assert_eq!(config.duplicate_id, DuplicatePolicy::Ignore);
        assert!(config.citation_policies.is_empty());
        assert_eq!(config.abbreviation_cache_path(), None);
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
bibtex_out: out.bib
drop_entry_types: [misc]
normalize_doi: true
duplicate_id: merge
duplicate_doi: fail
preambles_allowed: false
abbreviate_journal: abbrev.json
sort: true
citation_policies:
  article:
    author: must
    volume: may
"#;

        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.bibtex_out, "out.bib");
        assert_eq!(config.drop_entry_types, vec!["misc"]);
        assert!(config.normalize_doi);
        assert_eq!(config.duplicate_id, DuplicatePolicy::Merge);
        assert_eq!(config.duplicate_doi, DuplicatePolicy::Fail);
        assert!(!config.preambles_allowed);
        assert!(config.sort);
        assert!(!config.normalize_whitespace);
        assert_eq!(
            config.citation_policies["article"]["author"],
            FieldPolicy::Must
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_yaml("sorted: true\n").is_err());
    }

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.bibtex_out, "references.bib");
    }

    #[test]
    fn test_from_file_sets_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bibsane.yaml");
        std::fs::write(&path, "abbreviate_journal: cache/abbrev.json\n").unwrap();

        let config = Config::from_file(Some(&path)).unwrap();

        assert_eq!(config.root, dir.path());
        assert_eq!(
            config.abbreviation_cache_path(),
            Some(dir.path().join("cache/abbrev.json"))
        );
    }
}
