use std::collections::HashMap;

use tracing::{info, warn};

use crate::models::{Entry, StageOutput, Violation};

/// Execute Stage 5: merge entries sharing the same value of `field`.
///
/// Groups keep the order of their first member and take the union of all
/// members' fields. When members disagree on a field, the first-seen value
/// wins and the disagreement is reported. Entries lacking `field` cannot be
/// merged; they are appended after the merged groups in their original order.
pub fn merge_entries(entries: Vec<Entry>, field: &str) -> StageOutput {
    let mut merged: Vec<Entry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unmergeable: Vec<Entry> = Vec::new();
    let mut violations = Vec::new();

    for entry in entries {
        let Some(key) = entry.get(field).map(str::to_string) else {
            info!("Cannot merge entry without {}: {}", field, entry.id());
            unmergeable.push(entry);
            continue;
        };

        let Some(&slot) = index.get(&key) else {
            index.insert(key, merged.len());
            merged.push(entry);
            continue;
        };

        let mut target = merged[slot].clone();
        for (name, value) in entry.iter() {
            match target.get(name) {
                None => target = target.with_field(name, value),
                Some(existing) if existing != value => {
                    let violation = Violation::MergeConflict {
                        key: field.to_string(),
                        value: key.clone(),
                        field: name.to_string(),
                        kept: existing.to_string(),
                        discarded: value.to_string(),
                    };
                    warn!("{}", violation);
                    violations.push(violation);
                }
                Some(_) => {}
            }
        }
        merged[slot] = target;
    }

    merged.extend(unmergeable);
    StageOutput {
        entries: merged,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unions_fields() {
        let entries = vec![
            Entry::new("article", "a").with_field("doi", "X"),
            Entry::new("article", "a").with_field("journal", "Y"),
        ];

        let output = merge_entries(entries, "ID");

        assert!(output.is_valid());
        assert_eq!(output.entries.len(), 1);
        let merged = &output.entries[0];
        assert_eq!(merged.id(), "a");
        assert_eq!(merged.get("doi"), Some("X"));
        assert_eq!(merged.get("journal"), Some("Y"));
    }

    #[test]
    fn test_merge_conflict_keeps_first_value() {
        let entries = vec![
            Entry::new("article", "a").with_field("year", "2000"),
            Entry::new("article", "a").with_field("year", "2001"),
        ];

        let output = merge_entries(entries, "ID");

        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.entries[0].get("year"), Some("2000"));
        assert_eq!(
            output.violations,
            vec![Violation::MergeConflict {
                key: "ID".to_string(),
                value: "a".to_string(),
                field: "year".to_string(),
                kept: "2000".to_string(),
                discarded: "2001".to_string(),
            }]
        );
    }

    #[test]
    fn test_merge_by_doi_reports_differing_ids() {
        let entries = vec![
            Entry::new("article", "a").with_field("doi", "10.1/x"),
            Entry::new("article", "b").with_field("doi", "10.1/x"),
        ];

        let output = merge_entries(entries, "doi");

        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.entries[0].id(), "a");
        assert!(matches!(
            &output.violations[..],
            [Violation::MergeConflict { field, .. }] if field == "ID"
        ));
    }

    #[test]
    fn test_entries_without_field_go_last() {
        let entries = vec![
            Entry::new("article", "nodoi1"),
            Entry::new("article", "a").with_field("doi", "10.1/a"),
            Entry::new("article", "nodoi2"),
            Entry::new("article", "b").with_field("doi", "10.1/b"),
        ];

        let output = merge_entries(entries, "doi");

        let ids: Vec<&str> = output.entries.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["a", "b", "nodoi1", "nodoi2"]);
        assert!(output.is_valid());
    }

    #[test]
    fn test_group_order_follows_first_appearance() {
        let entries = vec![
            Entry::new("article", "b"),
            Entry::new("article", "a"),
            Entry::new("article", "b").with_field("note", "n"),
        ];

        let output = merge_entries(entries, "ID");

        let ids: Vec<&str> = output.entries.iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(output.entries[0].get("note"), Some("n"));
    }
}
