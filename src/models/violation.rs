use thiserror::Error;

/// A policy violation found while sanitizing.
///
/// Violations never abort the pipeline. They are collected per stage and any
/// one of them makes the final verdict `Broken`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("duplicate BibTeX entry: {id}")]
    DuplicateId { id: String },

    #[error("duplicate DOI: {doi}")]
    DuplicateDoi { doi: String },

    #[error("@preamble is not allowed ({count} found)")]
    PreambleNotAllowed { count: usize },

    #[error("missing reference: {key}")]
    MissingCitation { key: String },

    #[error("{id}: @{entry_type} is not configured")]
    UnconfiguredEntryType { id: String, entry_type: String },

    #[error("{id}: @{entry_type} missing field {field}")]
    MissingField {
        id: String,
        entry_type: String,
        field: String,
    },

    #[error("{id}: invalid DOI: {doi}")]
    InvalidDoi { id: String, doi: String },

    #[error("BibTeX entry keys that only differ by case: {}", ids.join(" "))]
    CaseCollision { ids: Vec<String> },

    #[error("same {key}={value}, different {field}: {discarded} (kept {kept})")]
    MergeConflict {
        key: String,
        value: String,
        field: String,
        kept: String,
        discarded: String,
    },
}

/// Entries produced by a stage together with the violations it found
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    pub entries: Vec<crate::models::Entry>,
    pub violations: Vec<Violation>,
}

impl StageOutput {
    /// True when the stage found no violations
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_collision_message_lists_ids() {
        let violation = Violation::CaseCollision {
            ids: vec!["Smith2020".to_string(), "smith2020".to_string()],
        };
        assert_eq!(
            violation.to_string(),
            "BibTeX entry keys that only differ by case: Smith2020 smith2020"
        );
    }
}
