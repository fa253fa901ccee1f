use std::collections::HashMap;

use tracing::warn;

use crate::models::{Entry, Violation};

/// Fields whose braces protect capitalization and must be left alone
const BRACE_PROTECTED_FIELDS: [&str; 3] = ["author", "editor", "title"];

/// Strip grouping braces from every field except author, editor and title
pub fn fix_bad_practices(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .map(|entry| {
            entry.map_values(|field, value| {
                if BRACE_PROTECTED_FIELDS.contains(&field) {
                    value.to_string()
                } else {
                    value.replace(['{', '}'], "")
                }
            })
        })
        .collect()
}

/// Report IDs that only differ by case. Entries are not touched.
pub fn detect_case_collisions(entries: &[Entry]) -> Vec<Violation> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();

    for entry in entries {
        let folded = entry.id().to_lowercase();
        let group = groups.entry(folded.clone()).or_insert_with(|| {
            order.push(folded);
            Vec::new()
        });
        if !group.iter().any(|id| id == entry.id()) {
            group.push(entry.id().to_string());
        }
    }

    order
        .into_iter()
        .filter_map(|folded| groups.remove(&folded))
        .filter(|ids| ids.len() > 1)
        .map(|ids| {
            let violation = Violation::CaseCollision { ids };
            warn!("{}", violation);
            violation
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braces_stripped_except_protected_fields() {
        let entry = Entry::new("article", "a")
            .with_field("title", "The {DNA} story")
            .with_field("author", "{van der Berg}, Jan")
            .with_field("editor", "{ACME}")
            .with_field("journal", "{Nature}")
            .with_field("pages", "{1}--{2}");

        let fixed = fix_bad_practices(&[entry]);

        let entry = &fixed[0];
        assert_eq!(entry.get("title"), Some("The {DNA} story"));
        assert_eq!(entry.get("author"), Some("{van der Berg}, Jan"));
        assert_eq!(entry.get("editor"), Some("{ACME}"));
        assert_eq!(entry.get("journal"), Some("Nature"));
        assert_eq!(entry.get("pages"), Some("1--2"));
    }

    #[test]
    fn test_braces_stripped_from_citation_key() {
        let fixed = fix_bad_practices(&[Entry::new("article", "{Smith}2020")]);
        assert_eq!(fixed[0].id(), "Smith2020");
    }

    #[test]
    fn test_case_collision_detected() {
        let entries = vec![
            Entry::new("article", "Smith2020"),
            Entry::new("article", "other"),
            Entry::new("article", "smith2020"),
        ];

        let violations = detect_case_collisions(&entries);

        assert_eq!(
            violations,
            vec![Violation::CaseCollision {
                ids: vec!["Smith2020".to_string(), "smith2020".to_string()]
            }]
        );
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_exact_duplicates_are_not_case_collisions() {
        let entries = vec![Entry::new("article", "a"), Entry::new("book", "a")];
        assert!(detect_case_collisions(&entries).is_empty());
    }
}
