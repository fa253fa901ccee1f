use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What to do when two entries share an ID or a DOI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Report the duplicate as a violation
    Fail,
    /// Collapse duplicates into one entry in the merge stage
    Merge,
    /// Leave duplicates alone
    #[default]
    Ignore,
}

/// Whether a field is required or allowed for an entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPolicy {
    Must,
    May,
}

/// Field policies for one entry type
pub type TypePolicy = BTreeMap<String, FieldPolicy>;

/// Entry type -> field policies
pub type PolicyTable = BTreeMap<String, TypePolicy>;
